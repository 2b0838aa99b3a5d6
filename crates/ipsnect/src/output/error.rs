use std::io;

use thiserror::Error;

/// Fatal errors while producing a report.
///
/// Read failures against the original binary are not listed here: they are
/// annotated inline in the report and rendering carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The original binary could not be opened or sized.
    #[error("original binary unavailable: {reason}")]
    StreamUnavailable { reason: String },
    /// The output sink rejected a write.
    #[error("failed to write report: {0}")]
    Output(io::ErrorKind),
}

impl From<io::Error> for RenderError {
    fn from(e: io::Error) -> Self {
        RenderError::Output(e.kind())
    }
}
