use ssq_core::{
    BiginFinishConfigBody, BiginFinishConfigType, Body, ChunkHeader, ChunkReader, ChunkType,
    ChunkWriter, StepDataBody, TempoTfpsConfigBody,
};
use std::io::Cursor;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn ssq(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ssq"))
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("failed to run ssq")
}

fn sample_file(bigin_offsets: &[i32]) -> Vec<u8> {
    let mut writer = ChunkWriter::new(Vec::new());
    writer
        .write_chunk(
            &ChunkHeader::new(28, ChunkType::TempoTfpsConfig, 0x96, 2),
            &Body::TempoTfpsConfig(TempoTfpsConfigBody {
                time_offsets: vec![0, 0x35000],
                values: vec![0, 0x373C],
                other_data: vec![],
            }),
        )
        .unwrap();
    let entry = bigin_offsets.len() as i32;
    writer
        .write_chunk(
            &ChunkHeader::new(12 + entry * 6, ChunkType::BiginFinishConfig, 1, entry),
            &Body::BiginFinishConfig(BiginFinishConfigBody {
                time_offsets: bigin_offsets.to_vec(),
                values: vec![BiginFinishConfigType::StartMusic; bigin_offsets.len()],
                other_data: vec![],
            }),
        )
        .unwrap();
    writer
        .write_chunk(
            &ChunkHeader::new(22, ChunkType::StepData, 0x0118, 2),
            &Body::StepData(StepDataBody {
                time_offsets: vec![0x9800, 0x9C00],
                values: vec![0x10, 0x88],
                other_data: vec![],
            }),
        )
        .unwrap();
    writer
        .write_chunk(&ChunkHeader::default(), &Body::default())
        .unwrap();
    writer.into_inner()
}

fn corrupt_file() -> Vec<u8> {
    vec![0x08, 0, 0, 0, 0x03, 0, 0, 0, 0x01, 0, 0, 0, 0xFF, 0xFF]
}

fn setup(files: &[(&str, Vec<u8>)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, bytes) in files {
        std::fs::write(dir.path().join(name), bytes).unwrap();
    }
    dir
}

#[test]
fn test_read_prints_report() {
    let dir = setup(&[("song.ssq", sample_file(&[0, 0x1000]))]);
    let out = ssq(
        dir.path(),
        &["read", "-i", "song.ssq", "--nologo", "--encoding", "ascii"],
    );
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("###[ song.ssq , Length: (78) Byte(s) ]###"));
    assert!(stdout.contains("[01:Tempo/TfPS Config.  ]"));
    assert!(stdout.contains("[02:BFC]"));
    assert!(stdout.contains("[ ....  <... :10]"));
    assert!(!stdout.contains("####"));
}

#[test]
fn test_read_missing_file() {
    let dir = setup(&[]);
    let out = ssq(dir.path(), &["read", "-i", "missing.ssq", "--nologo"]);
    assert_eq!(out.status.code(), Some(9));
    assert!(String::from_utf8_lossy(&out.stderr).contains("file not found"));
}

#[test]
fn test_read_corrupt_file() {
    let dir = setup(&[("bad.ssq", corrupt_file())]);
    let out = ssq(dir.path(), &["read", "-i", "bad.ssq", "--nologo"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("read error"));
}

#[test]
fn test_read_writes_output_file() {
    let dir = setup(&[("song.ssq", sample_file(&[0]))]);
    let out = ssq(
        dir.path(),
        &["read", "-i", "song.ssq", "-o", "reports/song.txt", "--nologo"],
    );
    assert!(out.status.success());
    let report = std::fs::read_to_string(dir.path().join("reports/song.txt")).unwrap();
    assert!(report.contains("[03:STP]"));
    // Unicode glyphs by default.
    assert!(report.contains("←"));
}

#[test]
fn test_read_with_config_file() {
    let mut bytes = sample_file(&[0]);
    // An unknown chunk with trailing bytes, before the end-of-file marker.
    let eof = bytes.split_off(bytes.len() - 4);
    bytes.extend_from_slice(&[0x0F, 0, 0, 0, 0x09, 0, 0, 0, 0x01, 0, 0, 0, 0xAB, 0xCD, 0xEF]);
    bytes.extend(eof);
    let dir = setup(&[("song.ssq", bytes)]);
    std::fs::write(
        dir.path().join("ssq.toml"),
        "[output]\nview_other_binary = true\nmapping_type = \"ascii\"\n",
    )
    .unwrap();

    let out = ssq(dir.path(), &["read", "-i", "song.ssq", "--nologo"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("[binary: length: 3]"));
    assert!(stdout.contains("[AB CD EF]"));
    assert!(stdout.contains("<"));
}

#[test]
fn test_adjust_shifts_negative_offsets() {
    let original = sample_file(&[-0x100, 0x200]);
    let dir = setup(&[("in.ssq", original.clone())]);
    let out = ssq(dir.path(), &["adjust", "-i", "in.ssq", "-o", "out/adjusted.ssq"]);
    assert!(out.status.success());

    let adjusted = std::fs::read(dir.path().join("out/adjusted.ssq")).unwrap();
    assert_eq!(adjusted.len(), original.len());
    // Only the begin/finish chunk (bytes 28..52) differs.
    assert_eq!(&adjusted[..28], &original[..28]);
    assert_eq!(&adjusted[52..], &original[52..]);

    let mut reader = ChunkReader::new(Cursor::new(adjusted));
    let chunks = reader
        .read_to_end()
        .collect::<ssq_core::Result<Vec<_>>>()
        .unwrap();
    match &chunks[1].body {
        Body::BiginFinishConfig(body) => assert_eq!(body.time_offsets, vec![0, 0x300]),
        other => panic!("unexpected body {:?}", other),
    }
    // The input is left alone.
    assert_eq!(std::fs::read(dir.path().join("in.ssq")).unwrap(), original);
}

#[test]
fn test_adjust_in_place_without_changes() {
    let original = sample_file(&[0, 0x200]);
    let dir = setup(&[("song.ssq", original.clone())]);
    let out = ssq(dir.path(), &["adjust", "-i", "song.ssq", "-o", "song.ssq"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("no changed."));
    assert_eq!(std::fs::read(dir.path().join("song.ssq")).unwrap(), original);
}

#[test]
fn test_adjust_missing_input() {
    let dir = setup(&[]);
    let out = ssq(dir.path(), &["adjust", "-i", "nope.ssq", "-o", "out.ssq"]);
    assert_eq!(out.status.code(), Some(9));
}

#[test]
fn test_read_dir_writes_reports() {
    let dir = setup(&[
        ("a.ssq", sample_file(&[0])),
        ("b.ssq", sample_file(&[0x10])),
        ("notes.txt", b"hello".to_vec()),
    ]);
    let out = ssq(
        dir.path(),
        &["read-dir", "-i", "*.ssq", "-o", "reports", "--nologo"],
    );
    assert!(out.status.success());
    assert!(dir.path().join("reports/a.txt").is_file());
    assert!(dir.path().join("reports/b.txt").is_file());
    assert!(!dir.path().join("reports/notes.txt").exists());
}

#[test]
fn test_read_dir_stops_at_first_failure_unless_skipping() {
    let files = [("a.ssq", corrupt_file()), ("b.ssq", sample_file(&[0]))];

    let dir = setup(&files);
    let out = ssq(
        dir.path(),
        &["read-dir", "-i", "*.ssq", "-o", "reports", "--nologo"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("reports/b.txt").exists());

    let dir = setup(&files);
    let out = ssq(
        dir.path(),
        &["read-dir", "-i", "*.ssq", "-o", "reports", "-s", "--nologo"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(dir.path().join("reports/b.txt").is_file());
}
