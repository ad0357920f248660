use clap::{Parser, Subcommand};
use log::error;
use ssq_core::printing::TextEncoding;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging/output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (toml). Defaults to ./ssq.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read SSQ/CSQ information
    Read {
        /// Input chunk file
        #[arg(short, long)]
        input: PathBuf,
        /// Output file. Prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not print the banner
        #[arg(long)]
        nologo: bool,
        /// Encoding of the report, selects the step glyphs (utf-8, ansi, ascii)
        #[arg(long, default_value = "utf-8")]
        encoding: TextEncoding,
    },
    /// Read SSQ/CSQ information of every matching file in a directory
    ReadDir {
        /// File name pattern, `*` and `?` wildcards
        #[arg(short, long)]
        input: String,
        /// Input directory
        #[arg(short, long, default_value = "./")]
        dir: PathBuf,
        /// Extension of the report files
        #[arg(short = 'e', long, default_value = ".txt")]
        outext: String,
        /// Output directory. Prints to stdout when omitted
        #[arg(short, long)]
        outdir: Option<PathBuf>,
        /// Keep going after a file fails
        #[arg(short, long)]
        skip: bool,
        /// Do not print the banner
        #[arg(long)]
        nologo: bool,
        /// Encoding of the reports, selects the step glyphs (utf-8, ansi, ascii)
        #[arg(long, default_value = "utf-8")]
        encoding: TextEncoding,
    },
    /// Shift negative begin/finish time offsets to zero
    Adjust {
        /// Input chunk file
        #[arg(short, long)]
        input: PathBuf,
        /// Output chunk file, may be the input itself
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(commands::EXIT_FAILURE);
        }
    };

    let code = match cli.command {
        Commands::Read {
            input,
            output,
            nologo,
            encoding,
        } => {
            commands::print_logo(nologo);
            commands::read::read_info(&input, output.as_deref(), encoding, &config)
        }
        Commands::ReadDir {
            input,
            dir,
            outext,
            outdir,
            skip,
            nologo,
            encoding,
        } => {
            commands::print_logo(nologo);
            let args = commands::read_dir::ReadDirArgs {
                pattern: input,
                dir,
                outext,
                outdir,
                skip,
                encoding,
            };
            commands::read_dir::read_info_dir(&args, &config)
        }
        Commands::Adjust { input, output } => commands::adjust::adjust(&input, &output, &config),
    };

    ExitCode::from(code)
}
