use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

use crate::format::{ChunkType, HEADER_SIZE, PlayDifficulty, PlayStyle};

/// Fixed 12-byte chunk header.
///
/// Layout (little endian, packed):
/// `i32 length | i16 type | i16 param | i32 entry`.
/// For step data chunks the two bytes of `param` are `{style, difficulty}`,
/// see [`StepPlayType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkHeader {
    /// Total chunk size including this header. `0` marks end of file.
    pub length: i32,
    pub chunk_type: ChunkType,
    pub param: i16,
    /// Number of entries in the body.
    pub entry: i32,
}

impl Default for ChunkHeader {
    fn default() -> Self {
        Self {
            length: 0,
            chunk_type: ChunkType::EndOfFile,
            param: 0,
            entry: 0,
        }
    }
}

impl ChunkHeader {
    pub fn new(length: i32, chunk_type: ChunkType, param: i16, entry: i32) -> Self {
        Self {
            length,
            chunk_type,
            param,
            entry,
        }
    }

    pub fn step_data(length: i32, play: StepPlayType, entry: i32) -> Self {
        Self::new(length, ChunkType::StepData, play.to_param(), entry)
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            length: LittleEndian::read_i32(&bytes[0..4]),
            chunk_type: ChunkType::from_raw(LittleEndian::read_i16(&bytes[4..6])),
            param: LittleEndian::read_i16(&bytes[6..8]),
            entry: LittleEndian::read_i32(&bytes[8..12]),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        LittleEndian::write_i32(&mut bytes[0..4], self.length);
        LittleEndian::write_i16(&mut bytes[4..6], self.chunk_type.to_raw());
        LittleEndian::write_i16(&mut bytes[6..8], self.param);
        LittleEndian::write_i32(&mut bytes[8..12], self.entry);
        bytes
    }

    pub fn is_end_of_file(&self) -> bool {
        self.chunk_type == ChunkType::EndOfFile
    }

    /// `length` reinterpreted as unsigned.
    pub fn unsigned_length(&self) -> u32 {
        self.length as u32
    }

    pub fn play_type(&self) -> StepPlayType {
        StepPlayType::from_param(self.param)
    }

    pub fn set_play_type(&mut self, play: StepPlayType) {
        self.param = play.to_param();
    }

    pub fn play_style(&self) -> PlayStyle {
        self.play_type().style
    }

    pub fn play_difficulty(&self) -> PlayDifficulty {
        self.play_type().difficulty
    }
}

impl fmt::Display for ChunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut members = Vec::with_capacity(6);
        if self.length > 0 {
            members.push(format!("Length:{}", self.length));
        } else if self.length < 0 {
            members.push(format!("LongLength:{}", self.unsigned_length()));
        }
        members.push(format!("Type:{}", self.chunk_type));
        members.push(format!("Param:0x{:04X}", self.param));
        members.push(format!("Entry:0x{:08X}", self.entry));
        if self.chunk_type == ChunkType::StepData {
            let play = self.play_type();
            members.push(format!(
                "Play.Difficulty:{}(0x{:02X})",
                play.difficulty.name(),
                play.difficulty.to_raw()
            ));
            members.push(format!(
                "Play.Style:{}(0x{:02X})",
                play.style.name(),
                play.style.to_raw()
            ));
        }
        write!(f, "ChunkHeader{{{}}}", members.join(", "))
    }
}

/// Typed view of [`ChunkHeader::param`] for step data chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepPlayType {
    pub style: PlayStyle,
    pub difficulty: PlayDifficulty,
}

impl StepPlayType {
    pub fn new(style: PlayStyle, difficulty: PlayDifficulty) -> Self {
        Self { style, difficulty }
    }

    pub fn from_param(param: i16) -> Self {
        let raw = param as u16;
        Self {
            style: PlayStyle::from_raw((raw & 0x00FF) as u8),
            difficulty: PlayDifficulty::from_raw((raw >> 8) as u8),
        }
    }

    pub fn to_param(self) -> i16 {
        (((self.difficulty.to_raw() as u16) << 8) | self.style.to_raw() as u16) as i16
    }
}

impl From<i16> for StepPlayType {
    fn from(param: i16) -> Self {
        Self::from_param(param)
    }
}

impl From<StepPlayType> for i16 {
    fn from(play: StepPlayType) -> Self {
        play.to_param()
    }
}

impl fmt::Display for StepPlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut members = Vec::with_capacity(2);
        if self.style.to_raw() != 0 {
            members.push(format!("Style:{}", self.style.name()));
        }
        if self.difficulty.to_raw() != 0 {
            members.push(format!("Difficulty:{}", self.difficulty.name()));
        }
        write!(f, "StepPlayType{{{}}}", members.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_type_to_param() {
        let play = StepPlayType::new(PlayStyle::Double, PlayDifficulty::Battle);
        assert_eq!(play.to_param(), 4120);
        assert_eq!(i16::from(play), 4120);
    }

    #[test]
    fn test_play_type_from_param() {
        let play = StepPlayType::from_param(4120);
        assert_eq!(play, StepPlayType::new(PlayStyle::Double, PlayDifficulty::Battle));
    }

    #[test]
    fn test_play_type_high_bit_difficulty() {
        // Difficulty bytes >= 0x80 make the raw param negative.
        let play = StepPlayType::new(PlayStyle::Single, PlayDifficulty::Other(0x80));
        let param = play.to_param();
        assert!(param < 0);
        assert_eq!(StepPlayType::from_param(param), play);
    }

    #[test]
    fn test_header_bytes_layout() {
        let header = ChunkHeader::step_data(
            0x20,
            StepPlayType::new(PlayStyle::Single, PlayDifficulty::Heavy),
            3,
        );
        let bytes = header.to_bytes();
        assert_eq!(
            bytes,
            [0x20, 0, 0, 0, 0x03, 0x00, 0x14, 0x03, 0x03, 0, 0, 0]
        );
        assert_eq!(ChunkHeader::from_bytes(&bytes), header);
        assert_eq!(header.play_style(), PlayStyle::Single);
        assert_eq!(header.play_difficulty(), PlayDifficulty::Heavy);
    }

    #[test]
    fn test_header_bytes_signed_fields() {
        let header = ChunkHeader::new(-2, ChunkType::Other(-1), -0x100, i32::MIN);
        let bytes = header.to_bytes();
        assert_eq!(
            bytes,
            [0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0xFF, 0, 0, 0, 0x80]
        );
        assert_eq!(ChunkHeader::from_bytes(&bytes), header);
    }

    #[test]
    fn test_header_default_is_eof() {
        let header = ChunkHeader::from_bytes(&[0u8; HEADER_SIZE]);
        assert_eq!(header, ChunkHeader::default());
        assert!(header.is_end_of_file());
    }

    #[test]
    fn test_header_display() {
        let header = ChunkHeader::new(-1, ChunkType::Other(7), 0x96, 2);
        assert_eq!(
            header.to_string(),
            "ChunkHeader{LongLength:4294967295, Type:Unknown Data.(7), Param:0x0096, Entry:0x00000002}"
        );
    }
}
