use crate::format::{BiginFinishConfigType, MEASURE_LENGTH};

/// Byte width of one time offset.
pub const TIME_OFFSET_WIDTH: usize = 4;

/// Chunk payload following the header.
///
/// Every variant may carry trailing bytes that the structured fields do not
/// account for (`other_data`); they are written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty(EmptyBody),
    TempoTfpsConfig(TempoTfpsConfigBody),
    BiginFinishConfig(BiginFinishConfigBody),
    StepData(StepDataBody),
    Other(OtherBody),
}

impl Default for Body {
    fn default() -> Self {
        Body::Empty(EmptyBody::default())
    }
}

impl Body {
    /// Encoded size of the body in bytes, excluding the header.
    pub fn size(&self) -> usize {
        match self {
            Body::Empty(b) => b.size(),
            Body::TempoTfpsConfig(b) => b.size(),
            Body::BiginFinishConfig(b) => b.size(),
            Body::StepData(b) => b.size(),
            Body::Other(b) => b.size(),
        }
    }

    pub fn time_offsets(&self) -> Option<&[i32]> {
        match self {
            Body::TempoTfpsConfig(b) => Some(&b.time_offsets),
            Body::BiginFinishConfig(b) => Some(&b.time_offsets),
            Body::StepData(b) => Some(&b.time_offsets),
            Body::Empty(_) | Body::Other(_) => None,
        }
    }

    pub fn time_offsets_mut(&mut self) -> Option<&mut Vec<i32>> {
        match self {
            Body::TempoTfpsConfig(b) => Some(&mut b.time_offsets),
            Body::BiginFinishConfig(b) => Some(&mut b.time_offsets),
            Body::StepData(b) => Some(&mut b.time_offsets),
            Body::Empty(_) | Body::Other(_) => None,
        }
    }

    /// Trailing bytes beyond the structured fields.
    pub fn other_data(&self) -> &[u8] {
        match self {
            Body::Empty(b) => &b.other_data,
            Body::TempoTfpsConfig(b) => &b.other_data,
            Body::BiginFinishConfig(b) => &b.other_data,
            Body::StepData(b) => &b.other_data,
            Body::Other(b) => &b.values,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Body::Empty(_) => "Empty",
            Body::TempoTfpsConfig(_) => "TempoTFPSConfig",
            Body::BiginFinishConfig(_) => "BiginFinishConfig",
            Body::StepData(_) => "StepData",
            Body::Other(_) => "Other",
        }
    }

    pub fn is_empty_body(&self) -> bool {
        matches!(self, Body::Empty(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyBody {
    pub other_data: Vec<u8>,
}

impl EmptyBody {
    pub fn size(&self) -> usize {
        self.other_data.len()
    }
}

/// Raw payload of an unrecognized chunk type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherBody {
    pub values: Vec<u8>,
}

impl OtherBody {
    pub fn size(&self) -> usize {
        self.values.len()
    }
}

// --- Tempo / TfPS ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TempoTfpsConfigBody {
    pub time_offsets: Vec<i32>,
    pub values: Vec<i32>,
    pub other_data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoTfpsConfigEntry {
    pub time_offset: i32,
    pub value: i32,
}

impl TempoTfpsConfigBody {
    pub const VALUE_WIDTH: usize = 4;

    pub fn size(&self) -> usize {
        self.time_offsets.len() * TIME_OFFSET_WIDTH
            + self.values.len() * Self::VALUE_WIDTH
            + self.other_data.len()
    }

    pub fn entries(&self) -> Vec<TempoTfpsConfigEntry> {
        self.time_offsets
            .iter()
            .zip(&self.values)
            .map(|(&time_offset, &value)| TempoTfpsConfigEntry { time_offset, value })
            .collect()
    }

    pub fn set_entries(&mut self, entries: &[TempoTfpsConfigEntry]) {
        self.time_offsets = entries.iter().map(|e| e.time_offset).collect();
        self.values = entries.iter().map(|e| e.value).collect();
    }

    /// BPM of the segment ending at `index`; `None` for the first entry.
    pub fn bpm(&self, index: usize, tfps: i16) -> Option<f64> {
        if index == 0 || index >= self.time_offsets.len().min(self.values.len()) {
            return None;
        }
        let delta_offset = self.time_offsets[index].wrapping_sub(self.time_offsets[index - 1]);
        let delta_ticks = self.values[index].wrapping_sub(self.values[index - 1]);
        Some(bpm(delta_offset, delta_ticks, tfps))
    }
}

/// Tempo of a segment spanning `delta_offset` ticks of chart time and
/// `delta_ticks` ticks of the `tfps` clock.
pub fn bpm(delta_offset: i32, delta_ticks: i32, tfps: i16) -> f64 {
    let measures = delta_offset as f64 / MEASURE_LENGTH as f64;
    let minutes = (delta_ticks as f64 / tfps as f64) / 240.0;
    measures / minutes
}

// --- Begin / Finish ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiginFinishConfigBody {
    pub time_offsets: Vec<i32>,
    pub values: Vec<BiginFinishConfigType>,
    pub other_data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiginFinishConfigEntry {
    pub time_offset: i32,
    pub value: BiginFinishConfigType,
}

impl BiginFinishConfigBody {
    pub const VALUE_WIDTH: usize = 2;

    pub fn size(&self) -> usize {
        self.time_offsets.len() * TIME_OFFSET_WIDTH
            + self.values.len() * Self::VALUE_WIDTH
            + self.other_data.len()
    }

    pub fn entries(&self) -> Vec<BiginFinishConfigEntry> {
        self.time_offsets
            .iter()
            .zip(&self.values)
            .map(|(&time_offset, &value)| BiginFinishConfigEntry { time_offset, value })
            .collect()
    }

    pub fn set_entries(&mut self, entries: &[BiginFinishConfigEntry]) {
        self.time_offsets = entries.iter().map(|e| e.time_offset).collect();
        self.values = entries.iter().map(|e| e.value).collect();
    }
}

// --- Step Data ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepDataBody {
    pub time_offsets: Vec<i32>,
    /// One packed step bitmask per entry.
    pub values: Vec<u8>,
    pub other_data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDataEntry {
    pub time_offset: i32,
    pub value: u8,
}

impl StepDataBody {
    pub const VALUE_WIDTH: usize = 1;

    pub fn size(&self) -> usize {
        self.time_offsets.len() * TIME_OFFSET_WIDTH
            + self.values.len() * Self::VALUE_WIDTH
            + self.other_data.len()
    }

    pub fn entries(&self) -> Vec<StepDataEntry> {
        self.time_offsets
            .iter()
            .zip(&self.values)
            .map(|(&time_offset, &value)| StepDataEntry { time_offset, value })
            .collect()
    }

    pub fn set_entries(&mut self, entries: &[StepDataEntry]) {
        self.time_offsets = entries.iter().map(|e| e.time_offset).collect();
        self.values = entries.iter().map(|e| e.value).collect();
    }
}
