//! Pure chunk encoding and decoding, shared by the blocking and async readers
//! and writers. Nothing here touches a stream.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, log_enabled, trace};

use crate::Result;
use crate::anomaly::Anomaly;
use crate::body::{
    BiginFinishConfigBody, Body, EmptyBody, OtherBody, StepDataBody, TIME_OFFSET_WIDTH,
    TempoTfpsConfigBody,
};
use crate::error::SsqError;
use crate::format::{BiginFinishConfigType, ChunkType, EOF_MARKER_SIZE, HEADER_SIZE};
use crate::header::ChunkHeader;

/// Body variant selected by a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Empty,
    TempoTfpsConfig,
    BiginFinishConfig,
    StepData,
    Other,
}

impl BodyKind {
    fn for_type(chunk_type: ChunkType) -> Self {
        match chunk_type {
            ChunkType::EndOfFile => BodyKind::Empty,
            ChunkType::TempoTfpsConfig => BodyKind::TempoTfpsConfig,
            ChunkType::BiginFinishConfig => BodyKind::BiginFinishConfig,
            ChunkType::StepData => BodyKind::StepData,
            ChunkType::Other(_) => BodyKind::Other,
        }
    }

    /// Per-entry widths of the time offset and value sections.
    fn widths(self) -> (usize, usize) {
        match self {
            BodyKind::TempoTfpsConfig => (TIME_OFFSET_WIDTH, TempoTfpsConfigBody::VALUE_WIDTH),
            BodyKind::BiginFinishConfig => {
                (TIME_OFFSET_WIDTH, BiginFinishConfigBody::VALUE_WIDTH)
            }
            BodyKind::StepData => (TIME_OFFSET_WIDTH, StepDataBody::VALUE_WIDTH),
            BodyKind::Empty | BodyKind::Other => (0, 0),
        }
    }

    fn is_structured(self) -> bool {
        matches!(
            self,
            BodyKind::TempoTfpsConfig | BodyKind::BiginFinishConfig | BodyKind::StepData
        )
    }
}

/// Byte sizes of the sections that follow a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLayout {
    pub kind: BodyKind,
    pub entry: usize,
    pub time_offsets: usize,
    pub values: usize,
    pub other_data: usize,
}

impl BodyLayout {
    const EMPTY: BodyLayout = BodyLayout {
        kind: BodyKind::Empty,
        entry: 0,
        time_offsets: 0,
        values: 0,
        other_data: 0,
    };

    /// Work out how many bytes each section takes, before anything is read.
    ///
    /// Returns the anomalies the header implies; a section that would overrun
    /// `header.length` is an error.
    pub fn plan(offset: u64, header: &ChunkHeader) -> Result<(Self, Vec<Anomaly>)> {
        let length = header.length;
        let chunk_type = header.chunk_type;

        if chunk_type == ChunkType::EndOfFile {
            return Ok((Self::EMPTY, Vec::new()));
        }
        if length <= 0 {
            return Ok((
                Self::EMPTY,
                vec![Anomaly::NonPositiveLength { chunk_type, length }],
            ));
        }
        if (length as i64) < HEADER_SIZE as i64 {
            return Err(SsqError::SizeInvariant {
                offset,
                consumed: HEADER_SIZE as i64,
                length,
            });
        }
        let body_size = length as usize - HEADER_SIZE;
        if header.entry <= 0 {
            let layout = BodyLayout {
                other_data: body_size,
                ..Self::EMPTY
            };
            return Ok((
                layout,
                vec![Anomaly::NonPositiveEntry {
                    chunk_type,
                    entry: header.entry,
                }],
            ));
        }

        let kind = BodyKind::for_type(chunk_type);
        let entry = header.entry as usize;
        let (time_width, value_width) = kind.widths();

        let mut consumed = HEADER_SIZE as i64;
        let mut section = |width: usize| -> Result<usize> {
            let size = entry as i64 * width as i64;
            let before = consumed;
            consumed += size;
            debug!(
                "{} + {} * {} -> {} Length:{}",
                before, entry, width, consumed, length
            );
            if consumed > length as i64 {
                return Err(SsqError::SizeInvariant {
                    offset,
                    consumed,
                    length,
                });
            }
            Ok(size as usize)
        };
        let time_offsets = section(time_width)?;
        let values = section(value_width)?;
        let other_data = (length as i64 - consumed) as usize;

        let mut anomalies = Vec::new();
        if kind.is_structured() && other_data > 0 {
            anomalies.push(Anomaly::UnexpectedOtherData {
                chunk_type,
                size: other_data,
            });
        }

        Ok((
            BodyLayout {
                kind,
                entry,
                time_offsets,
                values,
                other_data,
            },
            anomalies,
        ))
    }

    /// Total bytes following the header.
    pub fn size(&self) -> usize {
        self.time_offsets + self.values + self.other_data
    }

    /// Decode a body from exactly [`size`](Self::size) bytes.
    pub fn decode(&self, offset: u64, bytes: &[u8]) -> Result<Body> {
        if bytes.len() != self.size() {
            return Err(SsqError::ShortRead {
                offset,
                expected: self.size(),
                actual: bytes.len(),
            });
        }
        let (time_bytes, rest) = bytes.split_at(self.time_offsets);
        let (value_bytes, other_bytes) = rest.split_at(self.values);
        let other_data = other_bytes.to_vec();

        let time_offsets = || {
            let mut dst = vec![0i32; self.entry];
            LittleEndian::read_i32_into(time_bytes, &mut dst);
            dst
        };

        let body = match self.kind {
            BodyKind::Empty => Body::Empty(EmptyBody { other_data }),
            BodyKind::Other => Body::Other(OtherBody { values: other_data }),
            BodyKind::TempoTfpsConfig => {
                let mut values = vec![0i32; self.entry];
                LittleEndian::read_i32_into(value_bytes, &mut values);
                Body::TempoTfpsConfig(TempoTfpsConfigBody {
                    time_offsets: time_offsets(),
                    values,
                    other_data,
                })
            }
            BodyKind::BiginFinishConfig => {
                let mut raw = vec![0i16; self.entry];
                LittleEndian::read_i16_into(value_bytes, &mut raw);
                Body::BiginFinishConfig(BiginFinishConfigBody {
                    time_offsets: time_offsets(),
                    values: raw.into_iter().map(BiginFinishConfigType::from_raw).collect(),
                    other_data,
                })
            }
            BodyKind::StepData => Body::StepData(StepDataBody {
                time_offsets: time_offsets(),
                values: value_bytes.to_vec(),
                other_data,
            }),
        };
        Ok(body)
    }
}

/// Encode one chunk into a single contiguous buffer.
///
/// The buffer is `header.length` bytes long, or the 4-byte zero marker when an
/// end-of-file header has `length == 0`.
pub fn encode_chunk(header: &ChunkHeader, body: &Body) -> Result<Vec<u8>> {
    let expected = HEADER_SIZE as i64 + body.size() as i64;
    let is_eof_marker = header.is_end_of_file() && header.length == 0;
    if !is_eof_marker && header.length as i64 != expected {
        return Err(SsqError::LengthMismatch {
            length: header.length,
            expected,
        });
    }
    check_entry_count(header, body)?;

    let length = (header.length.max(0) as usize).max(EOF_MARKER_SIZE);
    let mut buf = Vec::with_capacity(length);

    match (header.chunk_type, body) {
        (ChunkType::EndOfFile, _) => buf.resize(length, 0),
        (ChunkType::TempoTfpsConfig, Body::TempoTfpsConfig(b)) => {
            buf.extend_from_slice(&header.to_bytes());
            write_time_offsets(&mut buf, &b.time_offsets)?;
            for &value in &b.values {
                buf.write_i32::<LittleEndian>(value)?;
            }
            buf.extend_from_slice(&b.other_data);
        }
        (ChunkType::BiginFinishConfig, Body::BiginFinishConfig(b)) => {
            buf.extend_from_slice(&header.to_bytes());
            write_time_offsets(&mut buf, &b.time_offsets)?;
            for &value in &b.values {
                buf.write_i16::<LittleEndian>(value.to_raw())?;
            }
            buf.extend_from_slice(&b.other_data);
        }
        (ChunkType::StepData, Body::StepData(b)) => {
            buf.extend_from_slice(&header.to_bytes());
            write_time_offsets(&mut buf, &b.time_offsets)?;
            buf.extend_from_slice(&b.values);
            buf.extend_from_slice(&b.other_data);
        }
        (_, Body::Other(b)) => {
            buf.extend_from_slice(&header.to_bytes());
            buf.extend_from_slice(&b.values);
        }
        // Chunks the reader tolerated as anomalies (`entry <= 0`).
        (_, Body::Empty(b)) if header.entry <= 0 => {
            buf.extend_from_slice(&header.to_bytes());
            buf.extend_from_slice(&b.other_data);
        }
        (chunk_type, body) => {
            return Err(SsqError::UnsupportedBody {
                chunk_type,
                body: body.kind_name(),
            });
        }
    }

    debug_assert_eq!(buf.len(), length);
    Ok(buf)
}

/// Trace the raw bytes of one read, the way they sit in the file.
pub(crate) fn log_read(what: &str, position: u64, bytes: &[u8]) {
    if log_enabled!(log::Level::Trace) {
        let dump: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        trace!("{} [{}]", what, dump.join(" "));
    }
    debug!(" -> {} read:{} Position:{}", what, bytes.len(), position);
}

fn write_time_offsets(buf: &mut Vec<u8>, time_offsets: &[i32]) -> Result<()> {
    for &time_offset in time_offsets {
        buf.write_i32::<LittleEndian>(time_offset)?;
    }
    Ok(())
}

/// Structured bodies must hold exactly `header.entry` entries, otherwise the
/// reader would split the sections differently.
fn check_entry_count(header: &ChunkHeader, body: &Body) -> Result<()> {
    if header.is_end_of_file() {
        return Ok(());
    }
    let counts = match body {
        Body::TempoTfpsConfig(b) => Some((b.time_offsets.len(), b.values.len())),
        Body::BiginFinishConfig(b) => Some((b.time_offsets.len(), b.values.len())),
        Body::StepData(b) => Some((b.time_offsets.len(), b.values.len())),
        Body::Empty(_) | Body::Other(_) => None,
    };
    match counts {
        Some((time_offsets, values))
            if time_offsets != values || time_offsets as i64 != header.entry as i64 =>
        {
            Err(SsqError::EntryMismatch {
                entry: header.entry,
                time_offsets,
                values,
            })
        }
        _ => Ok(()),
    }
}
