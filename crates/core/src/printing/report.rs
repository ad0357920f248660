use std::collections::VecDeque;
use std::io::Write;

use super::options::{GlyphSet, OutputOptions, TextEncoding};
use crate::Result;
use crate::body::{BiginFinishConfigBody, Body, StepDataBody, TempoTfpsConfigBody, bpm};
use crate::format::{ChunkType, PlayStyle, SoloStepType, StepType};
use crate::header::ChunkHeader;
use crate::model::Chunk;

const BORDER: &str = "+----+------+--------------+-------------------------+-----------------------------------+------------------+";
const HEADER: &str = "|#   |Addr: |Length:( HEX )|Chunk type:              |Values                             |Entry             |";

/// Number of glyph columns in a step line, before the raw value column.
const STEP_COLUMNS: usize = 12;

/// One table row per chunk, up to and including the end-of-file chunk.
pub fn write_chunk_summary<W: Write>(w: &mut W, chunks: &[Chunk]) -> Result<()> {
    let mut out = String::new();
    out.push_str(&format!("{}\n{}\n{}\n", BORDER, HEADER, BORDER));
    for (index, chunk) in chunks.iter().enumerate() {
        let header = &chunk.header;
        out.push_str(&format!("[{:3}]", index + 1));
        out.push_str(&format!(
            "[{:5X}][{:6} ({:5X})]",
            chunk.offset, header.length, header.length
        ));
        out.push_str(&type_column(header.chunk_type));
        out.push_str(&param_column(header));
        out.push_str(&format!("[Entry: {:4} ({:4X})]", header.entry, header.entry));
        out.push('\n');
        if header.is_end_of_file() {
            break;
        }
    }
    out.push_str(BORDER);
    writeln!(w, "{}", out)?;
    w.flush()?;
    Ok(())
}

/// Title line plus one line per entry for the chunk's body.
pub fn write_chunk_body_info<W: Write>(
    w: &mut W,
    chunk: &Chunk,
    options: &OutputOptions,
    encoding: TextEncoding,
) -> Result<()> {
    let header = &chunk.header;
    let glyphs = options.resolve(encoding);

    let mut lines = Vec::new();
    let title = format!("[[{}]]", type_column(header.chunk_type));
    if header.chunk_type == ChunkType::StepData {
        lines.push(format!("{} {}", title, level_column(header)));
    } else {
        lines.push(title);
    }

    match (header.chunk_type, &chunk.body) {
        (ChunkType::TempoTfpsConfig, Body::TempoTfpsConfig(body)) => {
            lines.extend(tempo_lines(header, body))
        }
        (ChunkType::BiginFinishConfig, Body::BiginFinishConfig(body)) => {
            lines.extend(bigin_finish_lines(body))
        }
        (ChunkType::StepData, Body::StepData(body)) => {
            lines.extend(step_lines(header, body, &glyphs))
        }
        _ => {}
    }

    let other_data = chunk.body.other_data();
    if options.view_other_binary && !other_data.is_empty() {
        lines.push(format!("[binary: length: {}]", other_data.len()));
        let dump: Vec<String> = other_data.iter().map(|b| format!("{:02X}", b)).collect();
        lines.push(format!("[{}]", dump.join(" ")));
    }

    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    writeln!(w, "{}", out)?;
    w.flush()?;
    Ok(())
}

fn type_column(chunk_type: ChunkType) -> String {
    format!("[{:02X}:{:<20}]", chunk_type.to_raw(), chunk_type.name())
}

fn level_column(header: &ChunkHeader) -> String {
    format!(
        "[level : ({:04X}) {:<8} {:<10}]",
        header.param,
        header.play_style().name(),
        header.play_difficulty().name()
    )
}

fn param_column(header: &ChunkHeader) -> String {
    match header.chunk_type {
        ChunkType::TempoTfpsConfig => {
            format!("[TfPS  : ({:4X}) {:4}] {:14}", header.param, header.param, "")
        }
        ChunkType::StepData => level_column(header),
        _ => format!("[param : ({:4X}) {:4}] {:14}", header.param, header.param, ""),
    }
}

fn tempo_lines(header: &ChunkHeader, body: &TempoTfpsConfigBody) -> Vec<String> {
    let entries = body.time_offsets.len().min(body.values.len());
    (1..entries)
        .map(|i| {
            let last_time_offset = body.time_offsets[i - 1];
            let time_offset = body.time_offsets[i];
            let delta_offset = time_offset.wrapping_sub(last_time_offset);
            let delta_ticks = body.values[i].wrapping_sub(body.values[i - 1]);
            let bpm = bpm(delta_offset, delta_ticks, header.param);
            format!(
                "[01:BPM][({:8X}:{:8X}) {:8}:{:8}][BPM:{:.5}] Delta> Offset:({:6X}){:7} / Ticks:({:5X}){:7} ",
                last_time_offset,
                time_offset,
                last_time_offset,
                time_offset,
                bpm,
                delta_offset,
                delta_offset,
                delta_ticks,
                delta_ticks
            )
        })
        .collect()
}

fn bigin_finish_lines(body: &BiginFinishConfigBody) -> Vec<String> {
    body.entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let last_time_offset = if i == 0 { 0 } else { body.time_offsets[i - 1] };
            let delta_offset = entry.time_offset.wrapping_sub(last_time_offset);
            format!(
                "[02:BFC][({:6X}) {:8}][func.{:4X}: {:<18} ] Delta> Offset:({:6X}){:7} ",
                entry.time_offset,
                entry.time_offset,
                entry.value.to_raw(),
                entry.value.name(),
                delta_offset,
                delta_offset
            )
        })
        .collect()
}

/// Panel columns of each play style; everything else is drawn as `none`.
fn panel_columns(style: PlayStyle) -> &'static [usize] {
    match style {
        PlayStyle::Single => &[1, 2, 3, 4],
        PlayStyle::Solo => &[0, 1, 2, 3, 4, 5],
        PlayStyle::Double | PlayStyle::Battle => &[1, 2, 3, 4, 7, 8, 9, 10],
        PlayStyle::Other(_) => &[],
    }
}

fn step_lines(header: &ChunkHeader, body: &StepDataBody, glyphs: &GlyphSet) -> Vec<String> {
    let style = header.play_style();
    let has_player1 = matches!(
        style,
        PlayStyle::Single | PlayStyle::Double | PlayStyle::Battle
    );
    let has_player2 = matches!(style, PlayStyle::Double | PlayStyle::Battle);

    // Columns of the last stepped arrows; a zero step after them is the tail
    // of a freeze arrow.
    let mut last_steps: VecDeque<usize> = VecDeque::new();
    let mut last_count = 0usize;

    let entries = body.time_offsets.len().min(body.values.len());
    let mut lines = Vec::with_capacity(entries);
    for i in 0..entries {
        let time_offset = body.time_offsets[i];
        let last_time_offset = if i == 0 { 0 } else { body.time_offsets[i - 1] };
        let delta_offset = time_offset.wrapping_sub(last_time_offset);

        let mut columns: Vec<String> = vec![glyphs.none.clone(); STEP_COLUMNS];
        for &column in panel_columns(style) {
            columns[column] = glyphs.empty.clone();
        }

        let value = body.values[i];
        let next_is_freeze = body.values.get(i + 1).is_some_and(|&next| next == 0) && i + 1 < entries;

        if value == 0 {
            let column = last_steps.pop_front().unwrap_or(0);
            columns[column] = glyphs.freeze_sign.clone();
            let word_column = if (7..=10).contains(&column) { 6 } else { 5 };
            columns[word_column] = format!(
                "{}{}",
                glyphs.freeze_char,
                last_count.saturating_sub(last_steps.len())
            );
        } else {
            last_steps.clear();
            last_count = 0;
            let step = StepType::from_bits_retain(value);

            if has_player1 {
                let arrows = [
                    (StepType::PLAYER1_LEFT, 1, &glyphs.left),
                    (StepType::PLAYER1_DOWN, 2, &glyphs.down),
                    (StepType::PLAYER1_UP, 3, &glyphs.up),
                    (StepType::PLAYER1_RIGHT, 4, &glyphs.right),
                ];
                for (flag, column, glyph) in arrows {
                    if step.intersects(flag) {
                        columns[column] = glyph.clone();
                        last_steps.push_back(column);
                        last_count += 1;
                    }
                }
                if step.contains(StepType::PLAYER1_SPECIAL) {
                    for column in 1..=4 {
                        columns[column] = glyphs.shock.clone();
                    }
                    columns[5] = glyphs.shock_word.clone();
                }
                if step.intersects(StepType::PLAYER1_SPECIAL) && next_is_freeze {
                    columns[5] = glyphs.freeze_word.clone();
                }
            }

            if style == PlayStyle::Solo {
                let solo = SoloStepType::from_bits_retain(value);
                let arrows = [
                    (SoloStepType::LEFT, 0, &glyphs.left),
                    (SoloStepType::NORTH_WEST, 1, &glyphs.north_west),
                    (SoloStepType::DOWN, 2, &glyphs.down),
                    (SoloStepType::UP, 3, &glyphs.up),
                    (SoloStepType::NORTH_EAST, 4, &glyphs.north_east),
                    (SoloStepType::RIGHT, 5, &glyphs.right),
                ];
                for (flag, column, glyph) in arrows {
                    if solo.intersects(flag) {
                        columns[column] = glyph.clone();
                    }
                }
            }

            if has_player2 {
                let arrows = [
                    (StepType::PLAYER2_LEFT, 7, &glyphs.left),
                    (StepType::PLAYER2_DOWN, 8, &glyphs.down),
                    (StepType::PLAYER2_UP, 9, &glyphs.up),
                    (StepType::PLAYER2_RIGHT, 10, &glyphs.right),
                ];
                for (flag, column, glyph) in arrows {
                    if step.intersects(flag) {
                        columns[column] = glyph.clone();
                        last_steps.push_back(column);
                        last_count += 1;
                    }
                }
                if step.contains(StepType::PLAYER2_SPECIAL) {
                    for column in 7..=10 {
                        columns[column] = glyphs.shock.clone();
                    }
                    columns[6] = glyphs.shock_word.clone();
                }
                if step.intersects(StepType::PLAYER2_SPECIAL) && next_is_freeze {
                    columns[6] = glyphs.freeze_word.clone();
                }
            }
        }

        lines.push(format!(
            "[03:STP][({:6X}) {:8}][{}:{:02X}] Delta> Offset:({:6X}){:7} ",
            time_offset,
            time_offset,
            columns.concat(),
            value,
            delta_offset,
            delta_offset
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::OtherBody;
    use crate::format::{BiginFinishConfigType, PlayDifficulty};
    use crate::header::StepPlayType;

    fn render_body(chunk: &Chunk, options: &OutputOptions) -> Vec<String> {
        let mut out = Vec::new();
        write_chunk_body_info(&mut out, chunk, options, TextEncoding::Ascii).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn step_chunk(style: PlayStyle, time_offsets: Vec<i32>, values: Vec<u8>) -> Chunk {
        let entry = values.len() as i32;
        let header = ChunkHeader::step_data(
            12 + entry * 5,
            StepPlayType::new(style, PlayDifficulty::Basic),
            entry,
        );
        let body = StepDataBody {
            time_offsets,
            values,
            other_data: vec![],
        };
        Chunk::new(0, header, Body::StepData(body))
    }

    #[test]
    fn test_summary_stops_after_eof() {
        let chunks = vec![
            Chunk::new(
                0,
                ChunkHeader::new(28, ChunkType::TempoTfpsConfig, 0x96, 2),
                Body::TempoTfpsConfig(TempoTfpsConfigBody {
                    time_offsets: vec![0, 0x35000],
                    values: vec![0, 0x373C],
                    other_data: vec![],
                }),
            ),
            Chunk::new(28, ChunkHeader::default(), Body::default()),
            Chunk::new(32, ChunkHeader::default(), Body::default()),
        ];
        let mut out = Vec::new();
        write_chunk_summary(&mut out, &chunks).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], BORDER);
        assert_eq!(lines[1], HEADER);
        assert_eq!(
            lines[3],
            "[  1][    0][    28 (   1C)][01:Tempo/TfPS Config.  ][TfPS  : (  96)  150]               [Entry:    2 (   2)]"
        );
        assert!(lines[4].starts_with("[  2][   1C][     0 (    0)][00:End of File.        ]"));
        assert_eq!(lines[5], BORDER);
    }

    #[test]
    fn test_tempo_lines() {
        let header = ChunkHeader::new(28, ChunkType::TempoTfpsConfig, 0x96, 2);
        let body = TempoTfpsConfigBody {
            time_offsets: vec![0, 0x35000],
            values: vec![0, 0x373C],
            other_data: vec![],
        };
        let lines = tempo_lines(&header, &body);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[01:BPM][(       0:   35000)        0:  217088][BPM:"));
        assert!(lines[0].contains("Ticks:( 373C)  14140 "));
    }

    #[test]
    fn test_bigin_finish_lines() {
        let body = BiginFinishConfigBody {
            time_offsets: vec![-0x100, 0x35000],
            values: vec![
                BiginFinishConfigType::StartMusic,
                BiginFinishConfigType::FinishGameMode,
            ],
            other_data: vec![],
        };
        let lines = bigin_finish_lines(&body);
        assert_eq!(
            lines[0],
            "[02:BFC][(FFFFFF00)     -256][func. 102: Start  Music     ? ] Delta> Offset:(FFFFFF00)   -256 "
        );
        assert!(lines[1].contains("func. 302: Finish GameMode    ]"));
    }

    #[test]
    fn test_double_step_player2_left() {
        let chunk = step_chunk(PlayStyle::Double, vec![0x9800], vec![0x10]);
        let lines = render_body(&chunk, &OutputOptions::default());
        assert_eq!(
            lines[0],
            "[[[03:Step Data.          ]]] [level : (0118) Double   Basic     ]"
        );
        assert_eq!(
            lines[1],
            "[03:STP][(  9800)    38912][ ....  <... :10] Delta> Offset:(  9800)  38912 "
        );
    }

    #[test]
    fn test_shock_and_freeze() {
        let chunk = step_chunk(
            PlayStyle::Single,
            vec![0x100, 0x200, 0x300],
            vec![0x0F, 0x01, 0x00],
        );
        let lines = render_body(&chunk, &OutputOptions::default());
        assert!(lines[1].contains("[ ****S      :0F]"));
        // Left arrow followed by a zero step is held.
        assert!(lines[2].contains("[ <...F      :01]"));
        assert!(lines[3].contains("[ #...L1      :00]"));
    }

    #[test]
    fn test_solo_columns() {
        let chunk = step_chunk(PlayStyle::Solo, vec![0], vec![0x51]);
        let lines = render_body(&chunk, &OutputOptions::default());
        assert!(lines[1].contains("[<\\../.      :51]"));
    }

    #[test]
    fn test_other_binary_dump() {
        let chunk = Chunk::new(
            0,
            ChunkHeader::new(15, ChunkType::Other(9), 0, 1),
            Body::Other(OtherBody {
                values: vec![0x01, 0xAB, 0xFF],
            }),
        );
        let hidden = render_body(&chunk, &OutputOptions::default());
        assert_eq!(hidden, vec!["[[[09:Unknown Data.       ]]]".to_string(), String::new()]);

        let options = OutputOptions {
            view_other_binary: true,
            ..Default::default()
        };
        let shown = render_body(&chunk, &options);
        assert_eq!(shown[1], "[binary: length: 3]");
        assert_eq!(shown[2], "[01 AB FF]");
    }
}
