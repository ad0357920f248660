use crate::commands::read::{render_report, write_report};
use crate::commands::{EXIT_FAILURE, EXIT_OK};
use crate::config::SsqConfig;
use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use rayon::prelude::*;
use ssq_core::printing::TextEncoding;
use std::path::{Path, PathBuf};

pub struct ReadDirArgs {
    pub pattern: String,
    pub dir: PathBuf,
    pub outext: String,
    pub outdir: Option<PathBuf>,
    pub skip: bool,
    pub encoding: TextEncoding,
}

pub fn read_info_dir(args: &ReadDirArgs, config: &SsqConfig) -> u8 {
    debug!("inputdir: {}", args.dir.display());
    if let Some(outdir) = &args.outdir {
        debug!("outputdir: {}", outdir.display());
    }

    let files = match list_files(&args.dir, &args.pattern) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("read error : {:#}", e);
            return EXIT_FAILURE;
        }
    };
    info!("{} file(s) match '{}'", files.len(), args.pattern);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    // Render in parallel, report in directory order.
    let reports: Vec<Result<Vec<u8>>> = files
        .par_iter()
        .map(|path| {
            let report = render_report(path, args.encoding, config);
            pb.inc(1);
            report
        })
        .collect();
    pb.finish_and_clear();

    let mut code = EXIT_OK;
    for (path, report) in files.iter().zip(reports) {
        let output = args
            .outdir
            .as_ref()
            .map(|outdir| outdir.join(report_name(path, &args.outext)));
        let result = match report {
            Ok(report) => write_report(output.as_deref(), &report).map(|_| EXIT_OK),
            Err(e) => {
                eprintln!("input: {}", path.display());
                eprintln!("read error : {:#}", e);
                error!("Failed to read {}: {:#}", path.display(), e);
                Ok(EXIT_FAILURE)
            }
        };
        let result = result.unwrap_or_else(|e| {
            eprintln!("write error : {:#}", e);
            EXIT_FAILURE
        });
        debug!("Result: {}", result);
        if result == EXIT_OK {
            continue;
        }
        if !args.skip {
            return result;
        }
        code = result;
    }
    code
}

fn report_name(path: &Path, outext: &str) -> String {
    let stem = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    format!("{}{}", stem, outext)
}

/// Regular files in `dir` whose name matches `pattern`, sorted by name.
///
/// `pattern` is a shell wildcard; case is ignored.
fn list_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern =
        Pattern::new(pattern).with_context(|| format!("Invalid file pattern '{}'", pattern))?;
    let mut files = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name_matches(&pattern, &name.to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn name_matches(pattern: &Pattern, name: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    pattern.matches_with(name, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, name: &str) -> bool {
        name_matches(&Pattern::new(pattern).unwrap(), name)
    }

    #[test]
    fn test_name_matches() {
        assert!(matches("*.ssq", "song.ssq"));
        assert!(matches("*.ssq", "SONG.SSQ"));
        assert!(matches("s?ng*", "song_all.csq"));
        assert!(matches("*", ""));
        assert!(matches("a*b*c", "a_x_b_y_c"));
        assert!(!matches("*.ssq", "song.csq"));
        assert!(!matches("?", ""));
        assert!(!matches("a*b", "a_x_c"));
    }

    #[test]
    fn test_list_files_rejects_bad_pattern() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(dir.path(), "[*.ssq").is_err());
    }

    #[test]
    fn test_report_name() {
        assert_eq!(report_name(Path::new("dir/song.ssq"), ".txt"), "song.txt");
    }

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.ssq", "a.ssq", "c.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.ssq")).unwrap();
        let files = list_files(dir.path(), "*.ssq").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.ssq", "b.ssq"]);
    }
}
