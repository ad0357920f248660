//! Tokio counterparts of [`ChunkReader`](crate::ChunkReader) and
//! [`ChunkWriter`](crate::ChunkWriter).
//!
//! Reads and writes only suspend on the underlying I/O. Dropping a pending
//! future abandons the chunk being read; nothing partial is ever returned.

use log::debug;
use std::io::SeekFrom;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};

use crate::Result;
use crate::anomaly::{Anomaly, AnomalySink, LogAnomalies};
use crate::body::Body;
use crate::codec::{BodyLayout, encode_chunk, log_read};
use crate::error::SsqError;
use crate::format::{EOF_MARKER_SIZE, HEADER_SIZE};
use crate::header::ChunkHeader;
use crate::model::Chunk;
use crate::reader::ReaderOptions;

pub struct AsyncChunkReader<R, A = LogAnomalies> {
    reader: R,
    options: ReaderOptions,
    sink: A,
    length: Option<u64>,
    done: bool,
}

impl<R: AsyncRead + AsyncSeek + Unpin> AsyncChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReaderOptions::default())
    }

    pub fn with_options(reader: R, options: ReaderOptions) -> Self {
        Self::with_sink(reader, options, LogAnomalies)
    }
}

impl<R: AsyncRead + AsyncSeek + Unpin, A: AnomalySink> AsyncChunkReader<R, A> {
    pub fn with_sink(reader: R, options: ReaderOptions, sink: A) -> Self {
        Self {
            reader,
            options,
            sink,
            length: None,
            done: false,
        }
    }

    pub async fn read_header(&mut self) -> Result<ChunkHeader> {
        let offset = self.reader.stream_position().await?;
        let (header, _) = self.read_header_at(offset).await?;
        Ok(header)
    }

    pub async fn read_body(&mut self, header: &ChunkHeader) -> Result<Body> {
        let position = self.reader.stream_position().await?;
        self.read_body_at(position.saturating_sub(HEADER_SIZE as u64), header)
            .await
    }

    pub async fn read_chunk(&mut self) -> Result<Chunk> {
        let offset = self.reader.stream_position().await?;
        let (header, skip_body) = self.read_header_at(offset).await?;
        let body = if skip_body {
            Body::default()
        } else {
            self.read_body_at(offset, &header).await?
        };
        Ok(Chunk::new(offset, header, body))
    }

    /// Pull the next chunk of the sequence `read_to_end` would yield.
    ///
    /// Returns `Ok(None)` once the terminal chunk has been returned, the
    /// stream is exhausted, or an earlier call failed.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.done {
            return Ok(None);
        }
        match self.advance().await {
            Ok(Some(chunk)) => {
                self.done = chunk.header.is_end_of_file()
                    || (self.options.stop_on_empty_body && chunk.body.is_empty_body());
                Ok(Some(chunk))
            }
            Ok(None) => {
                self.done = true;
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }

    pub async fn read_all(&mut self) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            chunks.push(chunk);
        }
        Ok(chunks)
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

    async fn advance(&mut self) -> Result<Option<Chunk>> {
        let length = match self.length {
            Some(length) => length,
            None => {
                let position = self.reader.stream_position().await?;
                let length = self.reader.seek(SeekFrom::End(0)).await?;
                self.reader.seek(SeekFrom::Start(position)).await?;
                self.length = Some(length);
                length
            }
        };
        if self.reader.stream_position().await? >= length {
            return Ok(None);
        }
        self.read_chunk().await.map(Some)
    }

    async fn read_header_at(&mut self, offset: u64) -> Result<(ChunkHeader, bool)> {
        debug!("read header at {:#X}", offset);
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        (&mut self.reader)
            .take(HEADER_SIZE as u64)
            .read_to_end(&mut bytes)
            .await?;
        log_read("header", offset + bytes.len() as u64, &bytes);

        let available = bytes.len();
        let mut raw = [0u8; HEADER_SIZE];
        raw[..available].copy_from_slice(&bytes);
        let header = ChunkHeader::from_bytes(&raw);

        // Zero length is the end-of-file marker, which is only 4 bytes long.
        if header.length == 0 {
            if available > EOF_MARKER_SIZE {
                self.reader
                    .seek(SeekFrom::Start(offset + EOF_MARKER_SIZE as u64))
                    .await?;
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

    async fn read_body_at(&mut self, offset: u64, header: &ChunkHeader) -> Result<Body> {
        let (layout, anomalies) = BodyLayout::plan(offset, header)?;
        for anomaly in anomalies {
            self.raise(offset, anomaly)?;
        }

        let size = layout.size();
        let mut bytes = Vec::new();
        if size > 0 {
            (&mut self.reader)
                .take(size as u64)
                .read_to_end(&mut bytes)
                .await?;
            log_read("body", offset + (HEADER_SIZE + bytes.len()) as u64, &bytes);
        }
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
}

pub struct AsyncChunkWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> AsyncChunkWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn write_chunk(&mut self, header: &ChunkHeader, body: &Body) -> Result<()> {
        let buf = encode_chunk(header, body)?;
        debug!("write {} ({} bytes)", header, buf.len());
        self.writer.write_all(&buf).await?;
        Ok(())
    }

    pub async fn write_to_end<'a, I>(&mut self, chunks: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Chunk>,
    {
        for chunk in chunks {
            self.write_chunk(&chunk.header, &chunk.body).await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
