pub mod adjust;
pub mod anomaly;
#[cfg(feature = "async")]
pub mod async_io;
pub mod body;
pub mod codec;
pub mod error;
pub mod format;
pub mod header;
pub mod model;
pub mod printing;
pub mod reader;
pub mod writer;

pub use anomaly::{Anomaly, AnomalySink, LogAnomalies};
#[cfg(feature = "async")]
pub use async_io::{AsyncChunkReader, AsyncChunkWriter};
pub use body::{
    BiginFinishConfigBody, BiginFinishConfigEntry, Body, EmptyBody, OtherBody, StepDataBody,
    StepDataEntry, TempoTfpsConfigBody, TempoTfpsConfigEntry,
};
pub use error::{Result, SsqError};
pub use format::{
    BiginFinishConfigType, ChunkType, PlayDifficulty, PlayStyle, SoloStepType, StepArrows,
    StepPlayers, StepType,
};
pub use header::{ChunkHeader, StepPlayType};
pub use model::Chunk;
pub use reader::{ChunkReader, Chunks, ReaderOptions};
pub use writer::ChunkWriter;
