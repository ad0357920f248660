use log::{info, warn};

use crate::body::{BiginFinishConfigBody, Body};
use crate::model::Chunk;

/// Move negative begin/finish time offsets up to zero.
///
/// Whenever an entry is negative, its magnitude is added to it and to every
/// later entry, so the spacing between events is kept. Returns how many
/// entries changed; an already adjusted body returns 0.
///
/// If a shifted offset no longer fits in 32 bits the body is left untouched
/// and 0 is returned.
pub fn clamp_negative_offsets(body: &mut BiginFinishConfigBody) -> usize {
    let mut entries = body.entries();
    let mut shifted: Vec<i64> = entries.iter().map(|e| e.time_offset as i64).collect();
    let mut first_changed = None;

    for i in 0..shifted.len() {
        let time_offset = shifted[i];
        if time_offset >= 0 {
            continue;
        }
        info!("adjust file: TimeOffset:{} -> 0", time_offset);
        first_changed.get_or_insert(i);
        for offset in &mut shifted[i..] {
            *offset -= time_offset;
        }
    }

    let Some(first) = first_changed else {
        return 0;
    };
    for (entry, &offset) in entries.iter_mut().zip(&shifted) {
        match i32::try_from(offset) {
            Ok(offset) => entry.time_offset = offset,
            Err(_) => {
                warn!(
                    "adjust file: TimeOffset:{} overflows after shifting, chunk left unchanged",
                    offset
                );
                return 0;
            }
        }
    }
    body.set_entries(&entries);
    entries.len() - first
}

/// Adjust every begin/finish chunk. Returns the indices of chunks that changed.
pub fn adjust_chunks(chunks: &mut [Chunk]) -> Vec<usize> {
    chunks
        .iter_mut()
        .enumerate()
        .filter_map(|(index, chunk)| match &mut chunk.body {
            Body::BiginFinishConfig(body) => (clamp_negative_offsets(body) > 0).then_some(index),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{BiginFinishConfigType, ChunkType};
    use crate::header::ChunkHeader;

    fn body(time_offsets: Vec<i32>) -> BiginFinishConfigBody {
        let values = vec![BiginFinishConfigType::StartMusic; time_offsets.len()];
        BiginFinishConfigBody {
            time_offsets,
            values,
            other_data: vec![0x7F],
        }
    }

    #[test]
    fn test_clamp_shifts_following_entries() {
        let mut b = body(vec![-0x100, 0, 0x4000]);
        assert_eq!(clamp_negative_offsets(&mut b), 3);
        assert_eq!(b.time_offsets, vec![0, 0x100, 0x4100]);
        assert_eq!(b.other_data, vec![0x7F]);
    }

    #[test]
    fn test_clamp_only_touches_later_entries() {
        let mut b = body(vec![0x10, -0x20, 0x30]);
        assert_eq!(clamp_negative_offsets(&mut b), 2);
        assert_eq!(b.time_offsets, vec![0x10, 0, 0x50]);
    }

    #[test]
    fn test_clamp_nested_negatives() {
        let mut b = body(vec![-4, -12, 8]);
        clamp_negative_offsets(&mut b);
        assert_eq!(b.time_offsets, vec![0, 0, 20]);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let mut b = body(vec![-0x35000, -0x1000, 0x2000]);
        assert!(clamp_negative_offsets(&mut b) > 0);
        let once = b.clone();
        assert_eq!(clamp_negative_offsets(&mut b), 0);
        assert_eq!(b, once);
    }

    #[test]
    fn test_clamp_lowest_offset() {
        let mut b = body(vec![i32::MIN, -5]);
        assert_eq!(clamp_negative_offsets(&mut b), 2);
        assert_eq!(b.time_offsets, vec![0, i32::MAX - 4]);
        assert_eq!(clamp_negative_offsets(&mut b), 0);
    }

    #[test]
    fn test_clamp_leaves_overflowing_body_untouched() {
        let mut b = body(vec![i32::MIN, 0x10]);
        assert_eq!(clamp_negative_offsets(&mut b), 0);
        assert_eq!(b.time_offsets, vec![i32::MIN, 0x10]);
        assert_eq!(clamp_negative_offsets(&mut b), 0);

        let mut b = body(vec![-1, i32::MAX]);
        assert_eq!(clamp_negative_offsets(&mut b), 0);
        assert_eq!(b.time_offsets, vec![-1, i32::MAX]);
    }

    #[test]
    fn test_adjust_chunks_reports_indices() {
        let mut chunks = vec![
            Chunk::new(
                0,
                ChunkHeader::new(23, ChunkType::BiginFinishConfig, 1, 1),
                Body::BiginFinishConfig(body(vec![5])),
            ),
            Chunk::new(
                23,
                ChunkHeader::new(23, ChunkType::BiginFinishConfig, 1, 1),
                Body::BiginFinishConfig(body(vec![-5])),
            ),
            Chunk::new(46, ChunkHeader::default(), Body::default()),
        ];
        assert_eq!(adjust_chunks(&mut chunks), vec![1]);
        assert!(adjust_chunks(&mut chunks).is_empty());
    }
}
