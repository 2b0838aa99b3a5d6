pub mod error;
pub mod hunk;
pub mod output;

pub use error::{Error, Result};
pub use hunk::error::HunkError;
pub use hunk::parser::{parse_patch, parse_patch_bytes};
pub use hunk::types::{Hunk, PatchFile, Payload, EOF_SENTINEL, PATCH_MAGIC};
pub use hunk::writer::{encode_patch, write_patch};
pub use output::error::RenderError;
pub use output::report::{render_report, render_to_string, BinarySource, ReportOptions};
