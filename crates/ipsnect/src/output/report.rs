use std::io::{Read, Seek, SeekFrom, Write};

use log::{debug, trace, warn};

use crate::hunk::types::{Hunk, PatchFile, Payload};

use super::error::RenderError;
use super::hexdump::{format_address, format_total, hex_lines, rle_preview};

const EXCEEDS_BINARY: &str = "(exceeds binary length)";
const READ_FAILED: &str = "(error reading binary)";

/// Anything the report can read original bytes from.
pub trait BinarySource: Read + Seek {}

impl<T: Read + Seek> BinarySource for T {}

/// Options controlling how much of the original binary is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Bytes of original data shown before each hunk.
    pub pre_context: usize,
    /// Bytes of original data shown after each hunk.
    pub post_context: usize,
}

/// The original binary together with its length, measured once up front.
struct Original<'a> {
    stream: &'a mut dyn BinarySource,
    len: u64,
}

impl<'a> Original<'a> {
    fn open(stream: &'a mut dyn BinarySource) -> Result<Self, RenderError> {
        let len = stream
            .seek(SeekFrom::End(0))
            .map_err(|e| RenderError::StreamUnavailable {
                reason: e.to_string(),
            })?;
        debug!("original binary is {len} bytes");
        Ok(Original { stream, len })
    }

    /// Read `count` bytes at `start`, clipped to the end of the binary.
    fn read_clipped(&mut self, start: u64, count: usize) -> std::io::Result<Vec<u8>> {
        let available = self.len.saturating_sub(start);
        let take = (count as u64).min(available) as usize;
        trace!("reading {take} of {count} bytes at 0x{start:X}");
        let mut buf = vec![0u8; take];
        if take > 0 {
            self.stream.seek(SeekFrom::Start(start))?;
            self.stream.read_exact(&mut buf)?;
        }
        Ok(buf)
    }
}

/// Write a diff-style report of `patch` to `out`.
///
/// The report opens with summary statistics, then one block per hunk in
/// file order. When `original` is given, each block also shows the bytes the
/// hunk overwrites, the bytes it writes, and the context windows requested
/// in `options`. Reads past the end of the original are annotated rather
/// than treated as errors; only an unusable original stream or a failing
/// output sink aborts the report.
///
/// # Example
///
/// ```
/// use ipsnect::{parse_patch_bytes, render_report, ReportOptions};
///
/// let patch = parse_patch_bytes(b"PATCH\x00\x00\x02\x00\x02\xAB\xCD\xFF\xFF\xFF").unwrap();
/// let mut original = std::io::Cursor::new(vec![0u8; 8]);
/// let mut out = Vec::new();
/// render_report(&patch, &mut out, Some(&mut original), &ReportOptions::default()).unwrap();
/// assert!(String::from_utf8(out).unwrap().contains("AB CD"));
/// ```
pub fn render_report<W: Write>(
    patch: &PatchFile,
    out: &mut W,
    original: Option<&mut dyn BinarySource>,
    options: &ReportOptions,
) -> Result<(), RenderError> {
    // Probe the original before anything is written
    let mut original = original.map(Original::open).transpose()?;

    write_summary(patch, out)?;

    for (index, hunk) in patch.hunks.iter().enumerate() {
        debug!(
            "rendering hunk {index}: {} at 0x{:06X}",
            hunk.kind(),
            hunk.offset
        );
        writeln!(out)?;
        write_hunk(index, hunk, out, original.as_mut(), options)?;
    }

    Ok(())
}

/// Render a report into a `String`.
pub fn render_to_string(
    patch: &PatchFile,
    original: Option<&mut dyn BinarySource>,
    options: &ReportOptions,
) -> Result<String, RenderError> {
    let mut out = Vec::new();
    render_report(patch, &mut out, original, options)?;
    // Everything written above is ASCII
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn write_summary<W: Write>(patch: &PatchFile, out: &mut W) -> Result<(), RenderError> {
    let total = patch.total_length();
    writeln!(
        out,
        "{} hunks ({} rle, {} regular)",
        patch.hunks.len(),
        patch.rle_count(),
        patch.regular_count()
    )?;
    writeln!(out, "total length: {} ({total} bytes)", format_total(total))?;
    if let Some(size) = patch.truncate_to {
        writeln!(
            out,
            "truncates binary to {} ({size} bytes)",
            format_address(size as u64)
        )?;
    }
    Ok(())
}

fn write_hunk<W: Write>(
    index: usize,
    hunk: &Hunk,
    out: &mut W,
    original: Option<&mut Original<'_>>,
    options: &ReportOptions,
) -> Result<(), RenderError> {
    let Some(end) = hunk.end_offset() else {
        writeln!(
            out,
            "hunk {index}: empty hunk at offset {}",
            format_address(hunk.offset as u64)
        )?;
        return Ok(());
    };

    writeln!(
        out,
        "hunk {index}: {} {}-{} ({} bytes)",
        hunk.kind(),
        format_address(hunk.offset as u64),
        format_address(end),
        hunk.len()
    )?;

    let Some(original) = original else {
        return Ok(());
    };

    let offset = hunk.offset as u64;

    if options.pre_context > 0 {
        writeln!(out, "  before:")?;
        match offset.checked_sub(options.pre_context as u64) {
            Some(start) => write_original(out, original, start, options.pre_context)?,
            None => {
                // Window begins before the first byte of the binary
                writeln!(out, "    {EXCEEDS_BINARY}")?;
                write_original(out, original, 0, offset as usize)?;
            }
        }
    }

    writeln!(out, "  unpatched:")?;
    write_original(out, original, offset, hunk.len())?;

    writeln!(out, "  patched:")?;
    match &hunk.payload {
        Payload::Regular(bytes) => {
            for line in hex_lines(bytes) {
                writeln!(out, "    {line}")?;
            }
        }
        Payload::Rle { length, fill } => {
            writeln!(out, "    {}", rle_preview(*fill, *length as usize))?;
        }
    }

    if options.post_context > 0 {
        writeln!(out, "  after:")?;
        write_original(out, original, offset + hunk.len() as u64, options.post_context)?;
    }

    Ok(())
}

/// Dump `count` original bytes starting at `start`, annotating whatever
/// could not be read.
fn write_original<W: Write>(
    out: &mut W,
    original: &mut Original<'_>,
    start: u64,
    count: usize,
) -> Result<(), RenderError> {
    if count == 0 {
        return Ok(());
    }

    let bytes = match original.read_clipped(start, count) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("failed to read {count} bytes at 0x{start:X} from original binary: {e}");
            writeln!(out, "    {READ_FAILED}")?;
            return Ok(());
        }
    };

    for line in hex_lines(&bytes) {
        writeln!(out, "    {line}")?;
    }
    if bytes.len() < count {
        writeln!(out, "    {EXCEEDS_BINARY}")?;
    }
    Ok(())
}
