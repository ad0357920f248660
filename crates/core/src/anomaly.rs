use log::warn;
use std::fmt;

use crate::format::ChunkType;

/// Malformed but parseable input found while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// A chunk other than end-of-file declared `length <= 0`.
    NonPositiveLength { chunk_type: ChunkType, length: i32 },
    /// A chunk other than end-of-file declared `entry <= 0`.
    NonPositiveEntry { chunk_type: ChunkType, entry: i32 },
    /// Fewer than 12 header bytes were left in the stream; the rest were zero filled.
    TruncatedHeader { available: usize },
    /// A recognized chunk type carried bytes beyond its structured fields.
    UnexpectedOtherData { chunk_type: ChunkType, size: usize },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::NonPositiveLength { chunk_type, length } => {
                write!(f, "{} chunk with non-positive length {}", chunk_type, length)
            }
            Anomaly::NonPositiveEntry { chunk_type, entry } => {
                write!(f, "{} chunk with non-positive entry count {}", chunk_type, entry)
            }
            Anomaly::TruncatedHeader { available } => {
                write!(f, "truncated header, only {} byte(s) available", available)
            }
            Anomaly::UnexpectedOtherData { chunk_type, size } => {
                write!(f, "{} chunk has {} unknown trailing byte(s)", chunk_type, size)
            }
        }
    }
}

/// Receives anomaly notifications from a reader.
pub trait AnomalySink {
    fn report(&mut self, offset: u64, anomaly: &Anomaly);
}

/// Default sink: forwards every anomaly to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAnomalies;

impl AnomalySink for LogAnomalies {
    fn report(&mut self, offset: u64, anomaly: &Anomaly) {
        warn!("Chunk at offset {:#X}: {}", offset, anomaly);
    }
}

/// Collects anomalies together with the offset of the chunk that raised them.
impl AnomalySink for Vec<(u64, Anomaly)> {
    fn report(&mut self, offset: u64, anomaly: &Anomaly) {
        self.push((offset, anomaly.clone()));
    }
}

impl<S: AnomalySink + ?Sized> AnomalySink for &mut S {
    fn report(&mut self, offset: u64, anomaly: &Anomaly) {
        (**self).report(offset, anomaly);
    }
}
