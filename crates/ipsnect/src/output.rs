//! Human-readable rendering of parsed patches.

pub mod error;
pub mod hexdump;
pub mod report;
