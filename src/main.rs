#![forbid(unsafe_code)]
//! # Lexistat CLI
//!
//! Command-line interface for the `lexistat` crate. It reads a `.txt` file,
//! a directory of `.txt` files (each analyzed independently), or stdin, and
//! prints lexical statistics: word frequencies, keywords, a naive sentiment
//! score, and capitalized-term spotting.
//!
//! ## Features
//! - Analyze each file individually, or a single document from stdin.
//! - Export results in multiple formats with timestamped filenames.
//! - Print the full result bundle as JSON for piping or copying.
//!
//! ## Example
//! ```bash
//! cargo run --release -- path/to/notes.txt --export-format json
//! echo "Alice met Bob in Paris" | cargo run --release -- --json
//! ```
//!
//! See `--help` for all available options.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{debug, error};
use rayon::prelude::*;

use lexistat::{ExportFormat, analyze, collect_files, render_report, result_to_json, save_result};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// File or directory to analyze (reads stdin if omitted)
    path: Option<String>,

    /// Output format for file export (txt, csv, tsv, json); no file is
    /// written when unset
    #[arg(long)]
    export_format: Option<ExportFormat>,

    /// Print the full result as pretty JSON instead of the text report
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Artificial latency in milliseconds before each analysis
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.path {
        // Stdin mode: one document, stem "stdin"
        None => {
            let mut input = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut input) {
                error!("Failed to read stdin: {e}");
                process::exit(1);
            }
            match run_document(&input, "stdin", &cli) {
                Ok(output) => println!("{output}"),
                Err(e) => {
                    error!("{e}");
                    process::exit(1);
                }
            }
        }
        // File/directory mode: analyze each collected file independently
        Some(path) => {
            let root = Path::new(path);
            if !root.exists() {
                error!("Path not found: {path}");
                process::exit(1);
            }
            let files = collect_files(root);
            if files.is_empty() {
                error!("No .txt files found under {path}");
                process::exit(1);
            }

            let outcomes: Vec<Result<String, String>> = files
                .par_iter()
                .map(|file| run_file(file, &cli))
                .collect();

            let mut any_errors = false;
            for outcome in outcomes {
                match outcome {
                    Ok(output) => println!("{output}"),
                    Err(e) => {
                        error!("{e}");
                        any_errors = true;
                    }
                }
            }
            if any_errors {
                process::exit(1);
            }
        }
    }
}

fn run_file(file: &PathBuf, cli: &Cli) -> Result<String, String> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("Error reading {}: {e}", file.display()))?;
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    run_document(&text, stem, cli).map_err(|e| format!("{}: {e}", file.display()))
}

/// Validate, analyze and render one document. Empty or whitespace-only text
/// is rejected before the engine runs.
fn run_document(text: &str, stem: &str, cli: &Cli) -> Result<String, String> {
    if text.trim().is_empty() {
        return Err("Input is empty or whitespace-only; nothing to analyze".to_string());
    }

    if cli.delay_ms > 0 {
        thread::sleep(Duration::from_millis(cli.delay_ms));
    }

    let started = Instant::now();
    let result = analyze(text);
    debug!("analyzed {stem} in {:?}", started.elapsed());

    if let Some(format) = cli.export_format {
        let path = save_result(&result, stem, Path::new("."), format)
            .map_err(|e| format!("Export failed: {e}"))?;
        debug!("exported {}", path.display());
    }

    if cli.json {
        result_to_json(&result).map_err(|e| format!("Serialization failed: {e}"))
    } else {
        Ok(render_report(&result, stem))
    }
}
