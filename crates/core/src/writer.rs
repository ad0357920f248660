use log::debug;
use std::io::Write;

use crate::Result;
use crate::body::Body;
use crate::codec::encode_chunk;
use crate::header::ChunkHeader;
use crate::model::Chunk;

/// Encodes chunks into a byte sink.
///
/// Every chunk is assembled in memory first and handed to the sink with a
/// single `write_all`, so a rejected chunk writes nothing.
pub struct ChunkWriter<W> {
    writer: W,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_chunk(&mut self, header: &ChunkHeader, body: &Body) -> Result<()> {
        let buf = encode_chunk(header, body)?;
        debug!("write {} ({} bytes)", header, buf.len());
        self.writer.write_all(&buf)?;
        Ok(())
    }

    /// Write chunks in order. Stops at the first failure.
    pub fn write_to_end<'a, I>(&mut self, chunks: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Chunk>,
    {
        for chunk in chunks {
            self.write_chunk(&chunk.header, &chunk.body)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{EmptyBody, TempoTfpsConfigBody};
    use crate::error::SsqError;
    use crate::format::ChunkType;

    #[test]
    fn test_write_chunk_layout() {
        let header = ChunkHeader::new(28, ChunkType::TempoTfpsConfig, 0x96, 2);
        let body = Body::TempoTfpsConfig(TempoTfpsConfigBody {
            time_offsets: vec![0, 0x35000],
            values: vec![0, 0x373C],
            other_data: vec![],
        });
        let mut writer = ChunkWriter::new(Vec::new());
        writer.write_chunk(&header, &body).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 28);
        assert_eq!(&bytes[..12], &header.to_bytes());
        assert_eq!(&bytes[12..20], &[0, 0, 0, 0, 0x00, 0x50, 0x03, 0x00]);
        assert_eq!(&bytes[20..28], &[0, 0, 0, 0, 0x3C, 0x37, 0, 0]);
    }

    #[test]
    fn test_rejected_chunk_writes_nothing() {
        let header = ChunkHeader::new(13, ChunkType::StepData, 0, 1);
        let body = Body::Empty(EmptyBody { other_data: vec![1] });
        let mut writer = ChunkWriter::new(Vec::new());
        let err = writer.write_chunk(&header, &body).unwrap_err();
        assert!(matches!(err, SsqError::UnsupportedBody { .. }));
        assert!(writer.get_mut().is_empty());
    }

    #[test]
    fn test_write_to_end_keeps_order() {
        let chunks = vec![
            Chunk::new(
                0,
                ChunkHeader::new(13, ChunkType::Other(5), 0, 1),
                Body::Other(crate::body::OtherBody { values: vec![0xEE] }),
            ),
            Chunk::default(),
        ];
        let mut writer = ChunkWriter::new(Vec::new());
        writer.write_to_end(&chunks).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 13 + 4);
        assert_eq!(bytes[12], 0xEE);
        assert_eq!(&bytes[13..], &[0, 0, 0, 0]);
    }
}
