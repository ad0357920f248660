use log::debug;
use serde::Deserialize;
use std::io::{Read, Seek, SeekFrom};
use std::iter::FusedIterator;

use crate::Result;
use crate::anomaly::{Anomaly, AnomalySink, LogAnomalies};
use crate::body::Body;
use crate::codec::{BodyLayout, log_read};
use crate::error::SsqError;
use crate::format::{EOF_MARKER_SIZE, HEADER_SIZE};
use crate::header::ChunkHeader;
use crate::model::Chunk;

/// How a reader treats malformed but parseable input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Turn every structural anomaly into [`SsqError::Anomaly`].
    pub strict: bool,
    /// Stop `read_to_end` at the first empty body, not only at end of file.
    pub stop_on_empty_body: bool,
}

/// Decodes chunks from a seekable byte stream, one at a time.
pub struct ChunkReader<R, A = LogAnomalies> {
    reader: R,
    options: ReaderOptions,
    sink: A,
}

impl<R: Read + Seek> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReaderOptions::default())
    }

    pub fn with_options(reader: R, options: ReaderOptions) -> Self {
        Self::with_sink(reader, options, LogAnomalies)
    }
}

impl<R: Read + Seek, A: AnomalySink> ChunkReader<R, A> {
    pub fn with_sink(reader: R, options: ReaderOptions, sink: A) -> Self {
        Self {
            reader,
            options,
            sink,
        }
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Read the next 12 header bytes. Missing trailing bytes count as zero.
    pub fn read_header(&mut self) -> Result<ChunkHeader> {
        let offset = self.reader.stream_position()?;
        self.read_header_at(offset).map(|(header, _)| header)
    }

    /// Read the body described by a header that was just read.
    pub fn read_body(&mut self, header: &ChunkHeader) -> Result<Body> {
        let position = self.reader.stream_position()?;
        let offset = position.saturating_sub(HEADER_SIZE as u64);
        self.read_body_at(offset, header)
    }

    pub fn read_chunk(&mut self) -> Result<Chunk> {
        let offset = self.reader.stream_position()?;
        let (header, skip_body) = self.read_header_at(offset)?;
        let body = if skip_body {
            Body::default()
        } else {
            self.read_body_at(offset, &header)?
        };
        Ok(Chunk::new(offset, header, body))
    }

    /// Lazily decode chunks until end of file.
    ///
    /// The terminal end-of-file chunk is yielded, then the iterator stops even
    /// when more bytes follow. It also stops after the first error.
    pub fn read_to_end(&mut self) -> Chunks<'_, R, A> {
        Chunks {
            reader: self,
            length: None,
            done: false,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Returns the header and whether its body must be skipped, either because
    /// it is the end-of-file marker or because the header was cut short.
    fn read_header_at(&mut self, offset: u64) -> Result<(ChunkHeader, bool)> {
        debug!("read header at {:#X}", offset);
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        (&mut self.reader)
            .take(HEADER_SIZE as u64)
            .read_to_end(&mut bytes)?;
        log_read("header", offset + bytes.len() as u64, &bytes);

        let available = bytes.len();
        let mut raw = [0u8; HEADER_SIZE];
        raw[..available].copy_from_slice(&bytes);
        let header = ChunkHeader::from_bytes(&raw);

        // Zero length is the end-of-file marker, which is only 4 bytes long.
        if header.length == 0 {
            if available > EOF_MARKER_SIZE {
                self.reader
                    .seek(SeekFrom::Start(offset + EOF_MARKER_SIZE as u64))?;
            }
            let header = ChunkHeader::default();
            debug!(" -> {}", header);
            return Ok((header, true));
        }
        debug!(" -> {}", header);

        let truncated = available < HEADER_SIZE;
        if truncated {
            self.raise(offset, Anomaly::TruncatedHeader { available })?;
        }
        Ok((header, truncated))
    }

    fn read_body_at(&mut self, offset: u64, header: &ChunkHeader) -> Result<Body> {
        let (layout, anomalies) = BodyLayout::plan(offset, header)?;
        for anomaly in anomalies {
            self.raise(offset, anomaly)?;
        }

        let size = layout.size();
        if size == 0 {
            return layout.decode(offset, &[]);
        }
        let mut bytes = Vec::new();
        (&mut self.reader).take(size as u64).read_to_end(&mut bytes)?;
        log_read("body", self.reader.stream_position()?, &bytes);
        if bytes.len() < size {
            return Err(SsqError::ShortRead {
                offset,
                expected: size,
                actual: bytes.len(),
            });
        }
        layout.decode(offset, &bytes)
    }

    fn raise(&mut self, offset: u64, anomaly: Anomaly) -> Result<()> {
        self.sink.report(offset, &anomaly);
        if self.options.strict {
            return Err(SsqError::Anomaly { offset, anomaly });
        }
        Ok(())
    }

    fn stream_len(&mut self) -> Result<u64> {
        let position = self.reader.stream_position()?;
        let length = self.reader.seek(SeekFrom::End(0))?;
        if length != position {
            self.reader.seek(SeekFrom::Start(position))?;
        }
        Ok(length)
    }
}

/// Iterator returned by [`ChunkReader::read_to_end`].
pub struct Chunks<'a, R, A> {
    reader: &'a mut ChunkReader<R, A>,
    length: Option<u64>,
    done: bool,
}

impl<R: Read + Seek, A: AnomalySink> Chunks<'_, R, A> {
    fn advance(&mut self) -> Result<Option<Chunk>> {
        let length = match self.length {
            Some(length) => length,
            None => {
                let length = self.reader.stream_len()?;
                self.length = Some(length);
                length
            }
        };
        if self.reader.reader.stream_position()? >= length {
            return Ok(None);
        }
        self.reader.read_chunk().map(Some)
    }

    fn is_terminal(&self, chunk: &Chunk) -> bool {
        chunk.header.is_end_of_file()
            || (self.reader.options.stop_on_empty_body && chunk.body.is_empty_body())
    }
}

impl<R: Read + Seek, A: AnomalySink> Iterator for Chunks<'_, R, A> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(chunk)) => {
                self.done = self.is_terminal(&chunk);
                Some(Ok(chunk))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek, A: AnomalySink> FusedIterator for Chunks<'_, R, A> {}
