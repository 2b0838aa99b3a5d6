use thiserror::Error;

use crate::hunk::error::HunkError;
use crate::output::error::RenderError;

/// Unified error type for the ipsnect library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("patch error: {0}")]
    Hunk(#[from] HunkError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_component_errors() {
        let err: Error = HunkError::Truncated {
            offset: 5,
            context: "hunk offset",
        }
        .into();
        assert_eq!(
            err.to_string(),
            "patch error: patch truncated at offset 0x5 while reading hunk offset"
        );

        let err: Error = RenderError::StreamUnavailable {
            reason: "gone".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Render(_)));
    }
}
