/// The five ASCII bytes every IPS patch starts with.
pub const PATCH_MAGIC: &[u8; 5] = b"PATCH";

/// Offset value reserved as the end-of-patch marker.
///
/// It occupies the offset field of what would otherwise be the next record,
/// so no real hunk can ever start at this address.
pub const EOF_SENTINEL: u32 = 0xFF_FFFF;

/// Highest offset a hunk may carry.
pub const MAX_OFFSET: u32 = EOF_SENTINEL - 1;

/// RLE runs longer than this are abbreviated in reports.
pub const RLE_INLINE_LIMIT: usize = 16;

/// What a hunk writes at its offset.
///
/// An IPS record either carries its bytes literally or describes a run of a
/// single repeated byte. RLE runs keep only the fill byte; the run is never
/// expanded in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Literal bytes, written verbatim. Never empty when produced by the parser.
    Regular(Vec<u8>),
    /// `fill` repeated `length` times. `length` may be 0 (an empty hunk).
    Rle { length: u16, fill: u8 },
}

/// A single patch record: a contiguous write into the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Position in the original file where writing begins (24-bit).
    pub offset: u32,
    pub payload: Payload,
}

impl Hunk {
    pub fn regular(offset: u32, bytes: Vec<u8>) -> Self {
        Hunk {
            offset,
            payload: Payload::Regular(bytes),
        }
    }

    pub fn rle(offset: u32, length: u16, fill: u8) -> Self {
        Hunk {
            offset,
            payload: Payload::Rle { length, fill },
        }
    }

    pub fn is_rle(&self) -> bool {
        matches!(self.payload, Payload::Rle { .. })
    }

    /// Number of bytes this hunk writes.
    pub fn len(&self) -> usize {
        match &self.payload {
            Payload::Regular(bytes) => bytes.len(),
            Payload::Rle { length, .. } => *length as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last byte address written, `offset + len - 1`.
    ///
    /// Can exceed the 24-bit range when a hunk near the top of the address
    /// space runs past 16 MiB. Returns `None` for empty hunks.
    pub fn end_offset(&self) -> Option<u64> {
        if self.is_empty() {
            None
        } else {
            Some(self.offset as u64 + self.len() as u64 - 1)
        }
    }

    /// Short human-readable kind, as used in reports.
    pub fn kind(&self) -> &'static str {
        match self.payload {
            Payload::Regular(_) => "regular",
            Payload::Rle { .. } => "rle",
        }
    }
}

/// A fully parsed IPS patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchFile {
    /// Hunks in file order.
    pub hunks: Vec<Hunk>,
    /// Size from the truncation extension (3 bytes after the sentinel), if any.
    pub truncate_to: Option<u32>,
}

impl PatchFile {
    pub fn rle_count(&self) -> usize {
        self.hunks.iter().filter(|h| h.is_rle()).count()
    }

    pub fn regular_count(&self) -> usize {
        self.hunks.len() - self.rle_count()
    }

    /// Sum of all hunk lengths.
    pub fn total_length(&self) -> u64 {
        self.hunks.iter().map(|h| h.len() as u64).sum()
    }
}
