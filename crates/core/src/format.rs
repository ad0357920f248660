use bitflags::bitflags;
use std::fmt;

pub const HEADER_SIZE: usize = 12;
/// Ticks per measure used by time offsets.
pub const MEASURE_LENGTH: i32 = 4096;

/// Size of the legacy end-of-file marker written when `length == 0`.
pub const EOF_MARKER_SIZE: usize = 4;

pub const UNKNOWN_NAME: &str = "Unknown";

// --- Chunk Type ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    EndOfFile,
    TempoTfpsConfig,
    BiginFinishConfig,
    StepData,
    Other(i16),
}

pub const CHUNK_TYPE_NAMES: &[(ChunkType, &str)] = &[
    (ChunkType::EndOfFile, "End of File."),
    (ChunkType::TempoTfpsConfig, "Tempo/TfPS Config."),
    (ChunkType::BiginFinishConfig, "Begin/Finish Config."),
    (ChunkType::StepData, "Step Data."),
];

impl ChunkType {
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            0 => Self::EndOfFile,
            1 => Self::TempoTfpsConfig,
            2 => Self::BiginFinishConfig,
            3 => Self::StepData,
            other => Self::Other(other),
        }
    }

    pub fn to_raw(self) -> i16 {
        match self {
            Self::EndOfFile => 0,
            Self::TempoTfpsConfig => 1,
            Self::BiginFinishConfig => 2,
            Self::StepData => 3,
            Self::Other(raw) => raw,
        }
    }

    pub fn name(self) -> &'static str {
        lookup_name(CHUNK_TYPE_NAMES, self).unwrap_or("Unknown Data.")
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.to_raw())
    }
}

// --- Begin/Finish Config Type ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiginFinishConfigType {
    StartGameMode,
    StartMusic,
    DelayTimeOffset,
    Unknown5th,
    FinishGameMode,
    BufferLength,
    Other(i16),
}

pub const BIGIN_FINISH_CONFIG_NAMES: &[(BiginFinishConfigType, &str)] = &[
    (BiginFinishConfigType::StartGameMode, "Start  GameMode  ?"),
    (BiginFinishConfigType::StartMusic, "Start  Music     ?"),
    (BiginFinishConfigType::DelayTimeOffset, "Delay  TimeOffset?"),
    (BiginFinishConfigType::Unknown5th, "Unknown(5th-)    ?"),
    (BiginFinishConfigType::FinishGameMode, "Finish GameMode"),
    (BiginFinishConfigType::BufferLength, "Buffer length    ?"),
];

impl BiginFinishConfigType {
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            0x401 => Self::StartGameMode,
            0x102 => Self::StartMusic,
            0x202 => Self::DelayTimeOffset,
            0x502 => Self::Unknown5th,
            0x302 => Self::FinishGameMode,
            0x402 => Self::BufferLength,
            other => Self::Other(other),
        }
    }

    pub fn to_raw(self) -> i16 {
        match self {
            Self::StartGameMode => 0x401,
            Self::StartMusic => 0x102,
            Self::DelayTimeOffset => 0x202,
            Self::Unknown5th => 0x502,
            Self::FinishGameMode => 0x302,
            Self::BufferLength => 0x402,
            Self::Other(raw) => raw,
        }
    }

    pub fn name(self) -> &'static str {
        lookup_name(BIGIN_FINISH_CONFIG_NAMES, self).unwrap_or(UNKNOWN_NAME)
    }
}

// --- Play Style / Play Difficulty ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayStyle {
    Single,
    Solo,
    Double,
    Battle,
    Other(u8),
}

pub const PLAY_STYLE_NAMES: &[(PlayStyle, &str)] = &[
    (PlayStyle::Single, "Single"),
    (PlayStyle::Solo, "Solo"),
    (PlayStyle::Double, "Double"),
    (PlayStyle::Battle, "Battle"),
];

impl PlayStyle {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x14 => Self::Single,
            0x16 => Self::Solo,
            0x18 => Self::Double,
            0x24 => Self::Battle,
            other => Self::Other(other),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            Self::Single => 0x14,
            Self::Solo => 0x16,
            Self::Double => 0x18,
            Self::Battle => 0x24,
            Self::Other(raw) => raw,
        }
    }

    pub fn name(self) -> &'static str {
        lookup_name(PLAY_STYLE_NAMES, self).unwrap_or(UNKNOWN_NAME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayDifficulty {
    Basic,
    Standard,
    Heavy,
    Beginner,
    Challenge,
    Battle,
    Other(u8),
}

pub const PLAY_DIFFICULTY_NAMES: &[(PlayDifficulty, &str)] = &[
    (PlayDifficulty::Basic, "Basic"),
    (PlayDifficulty::Standard, "Standard"),
    (PlayDifficulty::Heavy, "Heavy"),
    (PlayDifficulty::Beginner, "Beginner"),
    (PlayDifficulty::Challenge, "Challenge"),
    (PlayDifficulty::Battle, "Battle"),
];

impl PlayDifficulty {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x01 => Self::Basic,
            0x02 => Self::Standard,
            0x03 => Self::Heavy,
            0x04 => Self::Beginner,
            0x06 => Self::Challenge,
            0x10 => Self::Battle,
            other => Self::Other(other),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            Self::Basic => 0x01,
            Self::Standard => 0x02,
            Self::Heavy => 0x03,
            Self::Beginner => 0x04,
            Self::Challenge => 0x06,
            Self::Battle => 0x10,
            Self::Other(raw) => raw,
        }
    }

    pub fn name(self) -> &'static str {
        lookup_name(PLAY_DIFFICULTY_NAMES, self).unwrap_or(UNKNOWN_NAME)
    }
}

fn lookup_name<T: PartialEq + Copy>(table: &[(T, &'static str)], value: T) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == value)
        .map(|(_, name)| *name)
}

// --- Step bit masks ---

bitflags! {
    /// One step entry of a single/double/battle chart.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StepType: u8 {
        const PLAYER1_LEFT    = 0b0000_0001;
        const PLAYER1_DOWN    = 0b0000_0010;
        const PLAYER1_UP      = 0b0000_0100;
        const PLAYER1_RIGHT   = 0b0000_1000;
        const PLAYER1_SPECIAL = 0b0000_1111;
        const PLAYER2_LEFT    = 0b0001_0000;
        const PLAYER2_DOWN    = 0b0010_0000;
        const PLAYER2_UP      = 0b0100_0000;
        const PLAYER2_RIGHT   = 0b1000_0000;
        const PLAYER2_SPECIAL = 0b1111_0000;
    }
}

bitflags! {
    /// One step entry of a solo chart (six panels).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SoloStepType: u8 {
        const LEFT       = 0b0000_0001;
        const DOWN       = 0b0000_0010;
        const UP         = 0b0000_0100;
        const RIGHT      = 0b0000_1000;
        const NORTH_WEST = 0b0001_0000;
        const NORTH_EAST = 0b0100_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StepArrows: u8 {
        const LEFT  = 0b0001_0001;
        const DOWN  = 0b0010_0010;
        const UP    = 0b0100_0100;
        const RIGHT = 0b1000_1000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StepPlayers: u8 {
        const PLAYER1 = 0b0000_1111;
        const PLAYER2 = 0b1111_0000;
    }
}

impl StepType {
    /// Which players and which arrow directions a step touches.
    pub fn split(self) -> (StepPlayers, StepArrows) {
        let bits = self.bits();
        let mut players = StepPlayers::empty();
        for player in [StepPlayers::PLAYER1, StepPlayers::PLAYER2] {
            if bits & player.bits() != 0 {
                players |= player;
            }
        }
        let mut arrows = StepArrows::empty();
        for arrow in [
            StepArrows::LEFT,
            StepArrows::DOWN,
            StepArrows::UP,
            StepArrows::RIGHT,
        ] {
            if bits & arrow.bits() != 0 {
                arrows |= arrow;
            }
        }
        (players, arrows)
    }

    /// A shock arrow sets every direction bit of the player.
    pub fn is_shock(self, player: StepPlayers) -> bool {
        let mask = StepType::from_bits_retain(player.bits());
        !mask.is_empty() && self.contains(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_type_raw_roundtrip() {
        for raw in [0i16, 1, 2, 3, 4, -1, 0x7FFF] {
            assert_eq!(ChunkType::from_raw(raw).to_raw(), raw);
        }
        assert_eq!(ChunkType::from_raw(9), ChunkType::Other(9));
        assert_eq!(ChunkType::from_raw(9).name(), "Unknown Data.");
        assert_eq!(ChunkType::TempoTfpsConfig.name(), "Tempo/TfPS Config.");
    }

    #[test]
    fn test_config_type_names() {
        assert_eq!(
            BiginFinishConfigType::from_raw(0x402),
            BiginFinishConfigType::BufferLength
        );
        assert_eq!(BiginFinishConfigType::FinishGameMode.name(), "Finish GameMode");
        assert_eq!(BiginFinishConfigType::Other(0x7).name(), UNKNOWN_NAME);
        assert_eq!(BiginFinishConfigType::Other(0x7).to_raw(), 0x7);
    }

    #[test]
    fn test_play_enums() {
        assert_eq!(PlayStyle::from_raw(0x18), PlayStyle::Double);
        assert_eq!(PlayStyle::from_raw(0x99), PlayStyle::Other(0x99));
        assert_eq!(PlayDifficulty::from_raw(0x06).name(), "Challenge");
        assert_eq!(PlayDifficulty::Other(0x42).to_raw(), 0x42);
    }

    #[test]
    fn test_step_split() {
        let (players, arrows) = StepType::from_bits_retain(0x10).split();
        assert_eq!(players, StepPlayers::PLAYER2);
        assert_eq!(arrows, StepArrows::LEFT);

        let (players, arrows) = StepType::from_bits_retain(0x81).split();
        assert_eq!(players, StepPlayers::PLAYER1 | StepPlayers::PLAYER2);
        assert_eq!(arrows, StepArrows::LEFT | StepArrows::RIGHT);
    }

    #[test]
    fn test_shock_detection() {
        assert!(StepType::PLAYER1_SPECIAL.is_shock(StepPlayers::PLAYER1));
        assert!(!StepType::PLAYER1_SPECIAL.is_shock(StepPlayers::PLAYER2));
        assert!(!StepType::from_bits_retain(0x07).is_shock(StepPlayers::PLAYER1));
        assert!(StepType::from_bits_retain(0xFF).is_shock(StepPlayers::PLAYER2));
    }
}
