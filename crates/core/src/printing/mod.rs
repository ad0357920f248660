//! Human-readable chunk report: a summary table and per-chunk body listings.

mod options;
mod report;

pub use options::{CharMappingType, GlyphSet, OutputOptions, TextEncoding};
pub use report::{write_chunk_body_info, write_chunk_summary};
