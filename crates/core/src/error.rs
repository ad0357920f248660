use crate::anomaly::Anomaly;
use crate::format::ChunkType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SsqError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Structural anomaly at offset {offset:#X}: {anomaly}")]
    Anomaly { offset: u64, anomaly: Anomaly },

    #[error("Chunk at offset {offset:#X} overruns its length: {consumed} bytes needed, header length is {length}")]
    SizeInvariant {
        offset: u64,
        consumed: i64,
        length: i32,
    },

    #[error("Short read at offset {offset:#X}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported combination: {body} body for chunk type {chunk_type}")]
    UnsupportedBody {
        chunk_type: ChunkType,
        body: &'static str,
    },

    #[error("Header entry count {entry} does not match body ({time_offsets} time offsets, {values} values)")]
    EntryMismatch {
        entry: i32,
        time_offsets: usize,
        values: usize,
    },

    #[error("Header length {length} does not match encoded size {expected}")]
    LengthMismatch { length: i32, expected: i64 },
}

pub type Result<T> = std::result::Result<T, SsqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SsqError::SizeInvariant {
            offset: 0x20,
            consumed: 40,
            length: 28,
        };
        assert_eq!(
            err.to_string(),
            "Chunk at offset 0x20 overruns its length: 40 bytes needed, header length is 28"
        );

        let err = SsqError::UnsupportedBody {
            chunk_type: ChunkType::StepData,
            body: "TempoTFPSConfig",
        };
        assert_eq!(
            err.to_string(),
            "Unsupported combination: TempoTFPSConfig body for chunk type Step Data.(3)"
        );
    }

    #[test]
    fn test_io_source_is_kept() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: SsqError = io.into();
        assert!(matches!(err, SsqError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }
}
