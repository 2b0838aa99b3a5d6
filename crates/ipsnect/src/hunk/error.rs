use std::io;

use thiserror::Error;

/// Errors that can occur while reading or writing an IPS patch.
///
/// Stream failures are recorded by `io::ErrorKind` rather than the
/// `io::Error` itself so the error stays cheap to clone and compare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HunkError {
    /// The stream does not start with `PATCH` (or is shorter than 5 bytes).
    #[error("not an IPS patch: expected magic \"PATCH\", found {}", describe_magic(.found))]
    BadMagic { found: Vec<u8> },
    /// The stream ended in the middle of a record.
    #[error("patch truncated at offset 0x{offset:X} while reading {context}")]
    Truncated { offset: u64, context: &'static str },
    /// The stream failed for a reason other than running out of data.
    #[error("read failed at offset 0x{offset:X}: {kind}")]
    Io { offset: u64, kind: io::ErrorKind },
    /// The sink rejected an encoded patch.
    #[error("failed to write patch: {kind}")]
    Write { kind: io::ErrorKind },
    /// A hunk cannot be represented in the IPS wire format.
    #[error("invalid {context}: 0x{value:X}")]
    InvalidValue { context: &'static str, value: u64 },
}

fn describe_magic(found: &[u8]) -> String {
    if found.is_empty() {
        return "an empty stream".to_string();
    }
    let hex = found
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{hex} ({:?})", String::from_utf8_lossy(found))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_magic_message_shows_bytes() {
        let err = HunkError::BadMagic {
            found: b"PATCX".to_vec(),
        };
        assert_eq!(
            err.to_string(),
            "not an IPS patch: expected magic \"PATCH\", found 50 41 54 43 58 (\"PATCX\")"
        );
    }

    #[test]
    fn truncated_message_names_field() {
        let err = HunkError::Truncated {
            offset: 8,
            context: "hunk length",
        };
        assert_eq!(
            err.to_string(),
            "patch truncated at offset 0x8 while reading hunk length"
        );
    }
}
