use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// How step glyphs are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharMappingType {
    /// Pick a glyph set the output encoding can represent.
    #[default]
    Auto,
    /// Use the glyph strings from [`OutputOptions`] as given.
    Custom,
    Unicode,
    Ansi,
    Ascii,
}

/// Character repertoire of the report destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Any Unicode scalar value is representable.
    #[default]
    Utf8,
    /// Legacy double-byte code pages: full-width forms but no diagonal arrows.
    Ansi,
    Ascii,
}

impl TextEncoding {
    /// Glyph set an `auto` mapping resolves to.
    pub fn auto_mapping(self) -> CharMappingType {
        match self {
            TextEncoding::Utf8 => CharMappingType::Unicode,
            TextEncoding::Ansi => CharMappingType::Ansi,
            TextEncoding::Ascii => CharMappingType::Ascii,
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" | "unicode" => Ok(TextEncoding::Utf8),
            "ansi" | "shift_jis" | "sjis" | "cp932" => Ok(TextEncoding::Ansi),
            "ascii" | "us-ascii" => Ok(TextEncoding::Ascii),
            other => Err(format!("unknown encoding: {}", other)),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Ansi => "ansi",
            TextEncoding::Ascii => "ascii",
        };
        f.write_str(name)
    }
}

/// Strings used to draw one step line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphSet {
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub north_east: String,
    pub north_west: String,
    pub shock: String,
    pub freeze_sign: String,
    pub freeze_word: String,
    pub freeze_char: String,
    pub shock_word: String,
    /// Panel without a step.
    pub empty: String,
    /// Column that is not a panel in the current play style.
    pub none: String,
}

impl GlyphSet {
    /// Built-in glyphs. `None` for `auto` and `custom`, which need more context.
    pub fn for_mapping(mapping: CharMappingType) -> Option<GlyphSet> {
        let glyphs: [&str; 13] = match mapping {
            CharMappingType::Unicode => [
                "←", "→", "↑", "↓", "↗", "↖", "◆", "＃", "長", "L", "衝", "…", "　",
            ],
            CharMappingType::Ansi => [
                "←", "→", "↑", "↓", "／", "＼", "◆", "＃", "長", "L", "衝", "…", "　",
            ],
            CharMappingType::Ascii => [
                "<", ">", "^", "_", "/", "\\", "*", "#", "F", "L", "S", ".", " ",
            ],
            CharMappingType::Auto | CharMappingType::Custom => return None,
        };
        let [
            left,
            right,
            up,
            down,
            north_east,
            north_west,
            shock,
            freeze_sign,
            freeze_word,
            freeze_char,
            shock_word,
            empty,
            none,
        ] = glyphs.map(String::from);
        Some(GlyphSet {
            left,
            right,
            up,
            down,
            north_east,
            north_west,
            shock,
            freeze_sign,
            freeze_word,
            freeze_char,
            shock_word,
            empty,
            none,
        })
    }
}

/// Report settings, usually read from the `[output]` table of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Dump trailing bytes of every chunk as hex.
    pub view_other_binary: bool,
    pub mapping_type: CharMappingType,
    pub left_arrow: String,
    pub right_arrow: String,
    pub up_arrow: String,
    pub down_arrow: String,
    pub north_east_arrow: String,
    pub north_west_arrow: String,
    pub shock_arrow: String,
    pub freeze_arrow_sign: String,
    pub freeze_arrow_word: String,
    pub freeze_arrow_char: String,
    pub shock_arrow_word: String,
    pub empty_arrow: String,
    pub no_arrow: String,
}

impl OutputOptions {
    /// The mapping actually used for `encoding`; never `auto`.
    pub fn effective_mapping(&self, encoding: TextEncoding) -> CharMappingType {
        match self.mapping_type {
            CharMappingType::Auto => encoding.auto_mapping(),
            other => other,
        }
    }

    pub fn resolve(&self, encoding: TextEncoding) -> GlyphSet {
        GlyphSet::for_mapping(self.effective_mapping(encoding)).unwrap_or_else(|| GlyphSet {
            left: self.left_arrow.clone(),
            right: self.right_arrow.clone(),
            up: self.up_arrow.clone(),
            down: self.down_arrow.clone(),
            north_east: self.north_east_arrow.clone(),
            north_west: self.north_west_arrow.clone(),
            shock: self.shock_arrow.clone(),
            freeze_sign: self.freeze_arrow_sign.clone(),
            freeze_word: self.freeze_arrow_word.clone(),
            freeze_char: self.freeze_arrow_char.clone(),
            shock_word: self.shock_arrow_word.clone(),
            empty: self.empty_arrow.clone(),
            none: self.no_arrow.clone(),
        })
    }
}
