//! IPS patch records: types, parsing, and serialization.

pub mod error;
pub mod parser;
pub mod types;
pub mod writer;
