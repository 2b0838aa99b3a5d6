use std::io::{self, Read};

use log::{debug, trace, warn};

use super::error::HunkError;
use super::types::*;

/// A position-tracking reader for big-endian IPS fields.
///
/// IPS integers are stored most-significant byte first regardless of the
/// host, so every field is assembled byte by byte. The reader remembers how
/// far into the stream it is so truncation errors can point at the field
/// that broke off.
struct StreamReader<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> StreamReader<R> {
    fn new(inner: R) -> Self {
        StreamReader { inner, pos: 0 }
    }

    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), HunkError> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(HunkError::Truncated {
                offset: self.pos,
                context,
            }),
            Err(e) => Err(HunkError::Io {
                offset: self.pos,
                kind: e.kind(),
            }),
        }
    }

    fn read_u8(&mut self, context: &'static str) -> Result<u8, HunkError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf, context)?;
        Ok(buf[0])
    }

    fn read_u16_be(&mut self, context: &'static str) -> Result<u16, HunkError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf, context)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_u24_be(&mut self, context: &'static str) -> Result<u32, HunkError> {
        let mut buf = [0u8; 3];
        self.read_exact(&mut buf, context)?;
        Ok((buf[0] as u32) << 16 | (buf[1] as u32) << 8 | buf[2] as u32)
    }

    /// Read up to `limit` bytes, stopping early at end of stream.
    fn read_up_to(&mut self, limit: u64) -> Result<Vec<u8>, HunkError> {
        let mut out = Vec::new();
        let n = (&mut self.inner)
            .take(limit)
            .read_to_end(&mut out)
            .map_err(|e| HunkError::Io {
                offset: self.pos,
                kind: e.kind(),
            })?;
        self.pos += n as u64;
        Ok(out)
    }
}

/// Parse an IPS patch from a byte stream.
///
/// Reads the `PATCH` header, then hunk records until the `0xFFFFFF`
/// sentinel. At most four bytes past the sentinel are consumed, enough to
/// recognize a 3-byte truncation size; anything else there is logged and
/// ignored, including a failed read.
///
/// # Example
///
/// ```no_run
/// use ipsnect::hunk::parser::parse_patch;
///
/// let file = std::fs::File::open("fix.ips").unwrap();
/// let patch = parse_patch(file).unwrap();
/// for hunk in &patch.hunks {
///     println!("{} hunk at 0x{:06X} ({} bytes)", hunk.kind(), hunk.offset, hunk.len());
/// }
/// ```
pub fn parse_patch<R: Read>(stream: R) -> Result<PatchFile, HunkError> {
    let mut reader = StreamReader::new(stream);

    // --- Header ---
    let found = reader.read_up_to(PATCH_MAGIC.len() as u64)?;
    if found.as_slice() != &PATCH_MAGIC[..] {
        return Err(HunkError::BadMagic { found });
    }

    // --- Records ---
    let mut hunks = Vec::new();
    loop {
        let record_start = reader.pos;
        let offset = reader.read_u24_be("hunk offset")?;
        if offset == EOF_SENTINEL {
            trace!("end of patch marker at 0x{record_start:X}");
            break;
        }

        let length = reader.read_u16_be("hunk length")?;
        let hunk = if length != 0 {
            let mut bytes = vec![0u8; length as usize];
            reader.read_exact(&mut bytes, "hunk payload")?;
            Hunk::regular(offset, bytes)
        } else {
            // A zero length field switches the record to RLE; the real
            // length follows and may itself be zero.
            let run_length = reader.read_u16_be("rle length")?;
            let fill = reader.read_u8("rle fill byte")?;
            Hunk::rle(offset, run_length, fill)
        };

        debug!(
            "hunk {}: {} at 0x{:06X}, {} bytes (record at 0x{record_start:X})",
            hunks.len(),
            hunk.kind(),
            hunk.offset,
            hunk.len()
        );
        hunks.push(hunk);
    }

    // --- Trailer ---
    let truncate_to = match reader.read_up_to(4) {
        Ok(trailing) => match trailing.len() {
            0 => None,
            3 => {
                let size =
                    (trailing[0] as u32) << 16 | (trailing[1] as u32) << 8 | trailing[2] as u32;
                debug!("truncation extension: 0x{size:06X}");
                Some(size)
            }
            _ => {
                warn!("ignoring unrecognized data after end of patch marker");
                None
            }
        },
        Err(e) => {
            warn!("ignoring data after end of patch marker: {e}");
            None
        }
    };

    Ok(PatchFile { hunks, truncate_to })
}

/// Parse an IPS patch already held in memory.
pub fn parse_patch_bytes(data: &[u8]) -> Result<PatchFile, HunkError> {
    parse_patch(data)
}
