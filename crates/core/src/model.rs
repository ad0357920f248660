use crate::body::Body;
use crate::format::EOF_MARKER_SIZE;
use crate::header::ChunkHeader;

/// One decoded chunk together with where it started in the source stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    /// Absolute byte offset of the header. Used to patch a chunk in place.
    pub offset: u64,
    pub header: ChunkHeader,
    pub body: Body,
}

impl Chunk {
    pub fn new(offset: u64, header: ChunkHeader, body: Body) -> Self {
        Self {
            offset,
            header,
            body,
        }
    }

    /// Offset of the byte right after this chunk, as laid out by the reader.
    pub fn end_offset(&self) -> u64 {
        match self.header.length {
            0 => self.offset + EOF_MARKER_SIZE as u64,
            length => self.offset + length.max(0) as u64,
        }
    }
}
