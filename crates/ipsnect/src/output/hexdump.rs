//! Hex formatting shared by the report renderer.

use crate::hunk::types::RLE_INLINE_LIMIT;

/// Bytes shown per dump line.
pub const BYTES_PER_LINE: usize = 16;

/// Format a file address as `x` + 3-byte hex, widening to 4 bytes when the
/// value no longer fits in 24 bits.
pub fn format_address(addr: u64) -> String {
    if addr > 0xFF_FFFF {
        format!("x{addr:08X}")
    } else {
        format!("x{addr:06X}")
    }
}

/// Format a byte total as `x` + 4-byte hex.
pub fn format_total(total: u64) -> String {
    format!("x{total:08X}")
}

/// Space-separated uppercase hex, no prefix.
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split `bytes` into dump lines of [`BYTES_PER_LINE`] each.
pub fn hex_lines(bytes: &[u8]) -> Vec<String> {
    bytes.chunks(BYTES_PER_LINE).map(hex_bytes).collect()
}

/// Render an RLE run without expanding it.
///
/// Short runs are spelled out; longer ones show four copies of the fill
/// byte and state the full length.
pub fn rle_preview(fill: u8, length: usize) -> String {
    if length <= RLE_INLINE_LIMIT {
        hex_bytes(&[fill; RLE_INLINE_LIMIT][..length])
    } else {
        format!("{} ... (repeats for {length} bytes)", hex_bytes(&[fill; 4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_stays_three_bytes() {
        assert_eq!(format_address(0x10), "x000010");
        assert_eq!(format_address(0xFF_FFFF), "xFFFFFF");
    }

    #[test]
    fn address_widens_past_24_bits() {
        assert_eq!(format_address(0x100_0000), "x01000000");
        assert_eq!(format_address(0x1_0000_0000), "x100000000");
    }

    #[test]
    fn total_is_four_bytes() {
        assert_eq!(format_total(36), "x00000024");
    }

    #[test]
    fn hex_is_uppercase_and_spaced() {
        assert_eq!(hex_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]), "DE AD BE EF");
        assert_eq!(hex_bytes(&[]), "");
    }

    #[test]
    fn lines_hold_sixteen_bytes() {
        let data: Vec<u8> = (0..20).collect();
        let lines = hex_lines(&data);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F"
        );
        assert_eq!(lines[1], "10 11 12 13");
    }

    #[test]
    fn short_run_is_spelled_out() {
        assert_eq!(rle_preview(0xFF, 8), "FF FF FF FF FF FF FF FF");
        assert_eq!(rle_preview(0x00, 16).split(' ').count(), 16);
    }

    #[test]
    fn long_run_is_abbreviated() {
        assert_eq!(rle_preview(0xFF, 32), "FF FF FF FF ... (repeats for 32 bytes)");
    }
}
