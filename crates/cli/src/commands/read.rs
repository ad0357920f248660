use crate::commands::{EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_OK};
use crate::config::SsqConfig;
use anyhow::{Context, Result};
use log::{debug, error};
use ssq_core::ChunkReader;
use ssq_core::printing::{TextEncoding, write_chunk_body_info, write_chunk_summary};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

pub fn read_info(
    input: &Path,
    output: Option<&Path>,
    encoding: TextEncoding,
    config: &SsqConfig,
) -> u8 {
    debug!("input: {}", input.display());
    if !input.is_file() {
        eprintln!("file not found: {}", input.display());
        return EXIT_NOT_FOUND;
    }

    let result = render_report(input, encoding, config)
        .and_then(|report| write_report(output, &report));
    match result {
        Ok(()) => {
            if let Some(output) = output {
                debug!("output: {}", output.display());
            }
            EXIT_OK
        }
        Err(e) => {
            eprintln!("input: {}", input.display());
            eprintln!("read error : {:#}", e);
            error!("Failed to read {}: {:#}", input.display(), e);
            EXIT_FAILURE
        }
    }
}

/// Decode a chunk file and render its full text report.
pub fn render_report(input: &Path, encoding: TextEncoding, config: &SsqConfig) -> Result<Vec<u8>> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let length = file.metadata()?.len();

    let mut reader = ChunkReader::with_options(BufReader::new(file), config.reader);
    let chunks = reader
        .read_to_end()
        .collect::<ssq_core::Result<Vec<_>>>()
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    debug!("{} chunk(s) in {}", chunks.len(), input.display());

    let mut out = Vec::new();
    writeln!(out)?;
    writeln!(
        out,
        "###[ {} , Length: ({}) Byte(s) ]###",
        input.display(),
        length
    )?;
    write_chunk_summary(&mut out, &chunks)?;
    for chunk in &chunks {
        write_chunk_body_info(&mut out, chunk, &config.output, encoding)?;
    }
    Ok(out)
}

/// Write a report to `output`, creating its directory, or to stdout.
pub fn write_report(output: Option<&Path>, report: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, report)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
