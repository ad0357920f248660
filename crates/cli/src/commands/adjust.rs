use crate::commands::{EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_OK};
use crate::config::SsqConfig;
use anyhow::{Context, Result};
use log::{debug, error, info};
use ssq_core::adjust::adjust_chunks;
use ssq_core::{ChunkReader, ChunkWriter};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

pub fn adjust(input: &Path, output: &Path, config: &SsqConfig) -> u8 {
    if !input.is_file() {
        eprintln!("input file not found: {}", input.display());
        return EXIT_NOT_FOUND;
    }
    match adjust_file(input, output, config) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            eprintln!("adjust error : {:#}", e);
            error!("Failed to adjust {}: {:#}", input.display(), e);
            EXIT_FAILURE
        }
    }
}

fn adjust_file(input: &Path, output: &Path, config: &SsqConfig) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let mut reader = ChunkReader::with_options(BufReader::new(file), config.reader);
    let mut chunks = reader
        .read_to_end()
        .collect::<ssq_core::Result<Vec<_>>>()
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    drop(reader);

    let changed = adjust_chunks(&mut chunks);
    let in_place = same_file(input, output);
    if in_place && changed.is_empty() {
        println!("no changed.");
        return Ok(());
    }

    if !in_place {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(input, output).with_context(|| {
            format!("Failed to copy {} to {}", input.display(), output.display())
        })?;
    }

    let file = OpenOptions::new()
        .write(true)
        .open(output)
        .with_context(|| format!("Failed to open {}", output.display()))?;
    let mut writer = ChunkWriter::new(file);
    for &index in &changed {
        let chunk = &chunks[index];
        debug!("Patching chunk {} at {:#X}", index + 1, chunk.offset);
        writer.get_mut().seek(SeekFrom::Start(chunk.offset))?;
        writer.write_chunk(&chunk.header, &chunk.body)?;
    }
    writer.get_mut().sync_all()?;
    info!("{} chunk(s) adjusted, written to {}", changed.len(), output.display());
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
