use std::io::Write;

use super::error::HunkError;
use super::types::*;

fn put_u24_be(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes()[1..]);
}

/// Encode a patch in IPS wire format.
///
/// Each hunk is written in the record form it was parsed from, so
/// `parse_patch_bytes(&encode_patch(&p)?)` yields `p` again.
pub fn encode_patch(patch: &PatchFile) -> Result<Vec<u8>, HunkError> {
    let mut out = Vec::new();
    out.extend_from_slice(PATCH_MAGIC);

    for hunk in &patch.hunks {
        if hunk.offset > MAX_OFFSET {
            return Err(HunkError::InvalidValue {
                context: "hunk offset",
                value: hunk.offset as u64,
            });
        }
        put_u24_be(&mut out, hunk.offset);

        match &hunk.payload {
            Payload::Regular(bytes) => {
                // Zero would read back as an RLE record
                if bytes.is_empty() || bytes.len() > u16::MAX as usize {
                    return Err(HunkError::InvalidValue {
                        context: "regular hunk length",
                        value: bytes.len() as u64,
                    });
                }
                out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                out.extend_from_slice(bytes);
            }
            Payload::Rle { length, fill } => {
                out.extend_from_slice(&[0x00, 0x00]);
                out.extend_from_slice(&length.to_be_bytes());
                out.push(*fill);
            }
        }
    }

    put_u24_be(&mut out, EOF_SENTINEL);

    if let Some(size) = patch.truncate_to {
        if size > 0xFF_FFFF {
            return Err(HunkError::InvalidValue {
                context: "truncation size",
                value: size as u64,
            });
        }
        put_u24_be(&mut out, size);
    }

    Ok(out)
}

/// Encode a patch and write it to `sink`.
pub fn write_patch<W: Write>(patch: &PatchFile, mut sink: W) -> Result<(), HunkError> {
    let bytes = encode_patch(patch)?;
    sink.write_all(&bytes).map_err(|e| HunkError::Write { kind: e.kind() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hunk::parser::parse_patch_bytes;
    use std::io;

    #[test]
    fn encode_empty_patch() {
        let bytes = encode_patch(&PatchFile::default()).unwrap();
        assert_eq!(bytes, b"PATCH\xFF\xFF\xFF");
    }

    #[test]
    fn encode_mixed_hunks() {
        let patch = PatchFile {
            hunks: vec![
                Hunk::regular(0x10, vec![0xDE, 0xAD, 0xBE, 0xEF]),
                Hunk::rle(0x000200, 0x20, 0xFF),
            ],
            truncate_to: Some(0x4000),
        };
        let bytes = encode_patch(&patch).unwrap();
        let mut expected = b"PATCH".to_vec();
        expected.extend_from_slice(&[0x00, 0x00, 0x10, 0x00, 0x04, 0xDE, 0xAD, 0xBE, 0xEF]);
        expected.extend_from_slice(&[0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x20, 0xFF]);
        expected.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x00, 0x40, 0x00]);
        assert_eq!(bytes, expected);
        assert_eq!(parse_patch_bytes(&bytes).unwrap(), patch);
    }

    #[test]
    fn reject_sentinel_offset() {
        let patch = PatchFile {
            hunks: vec![Hunk::regular(EOF_SENTINEL, vec![0x00])],
            truncate_to: None,
        };
        assert!(matches!(
            encode_patch(&patch),
            Err(HunkError::InvalidValue {
                context: "hunk offset",
                ..
            })
        ));
    }

    #[test]
    fn reject_empty_regular_hunk() {
        let patch = PatchFile {
            hunks: vec![Hunk::regular(0, Vec::new())],
            truncate_to: None,
        };
        assert_eq!(
            encode_patch(&patch),
            Err(HunkError::InvalidValue {
                context: "regular hunk length",
                value: 0
            })
        );
    }

    #[test]
    fn write_to_sink() {
        let patch = PatchFile {
            hunks: vec![Hunk::rle(0, 0, 0x55)],
            truncate_to: None,
        };
        let mut sink = Vec::new();
        write_patch(&patch, &mut sink).unwrap();
        assert_eq!(sink, b"PATCH\x00\x00\x00\x00\x00\x00\x00\x55\xFF\xFF\xFF");
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failure_has_no_offset() {
        let result = write_patch(&PatchFile::default(), FullDisk);
        assert_eq!(
            result,
            Err(HunkError::Write {
                kind: io::ErrorKind::WriteZero
            })
        );
    }
}
