//! Golden trace verifier CLI.
//!
//! Loads a JSONL span log, runs the structural checks, prints the
//! transcript, and exits 0 only if every check passed.
//!
//! # Usage
//!
//! ```bash
//! # Verify a trace
//! goldentrace trace.jsonl
//!
//! # Use a custom naming convention and keep the verdict as JSON
//! goldentrace trace.jsonl --vocabulary vocab.json --report verdict.json
//! ```

use clap::error::ErrorKind;
use clap::Parser;
use goldentrace::loader::TraceLog;
use goldentrace::report::{save_verdict_json, ReportError, Reporter};
use goldentrace::verifier::TraceVerifier;
use goldentrace::vocabulary::{Vocabulary, VocabularyError};
use log::{debug, info};
use snafu::Snafu;
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI errors for the verifier binary.
#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("Vocabulary error: {source}"), context(false))]
    Vocabulary { source: VocabularyError },
    #[snafu(display("Report error: {source}"), context(false))]
    Report { source: ReportError },
    #[snafu(display("I/O error: {source}"), context(false))]
    Io { source: std::io::Error },
}

#[derive(Parser)]
#[command(name = "goldentrace")]
#[command(about = "Verify that a trace log proves real routing, timer, receipt and output effects")]
#[command(version)]
struct Cli {
    /// Path to the trace file (newline-delimited JSON spans).
    trace: PathBuf,

    /// JSON file overriding span-name markers and attribute keys.
    #[arg(long)]
    vocabulary: Option<PathBuf>,

    /// Write the verdict as JSON to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Run the four checks on separate threads.
    #[arg(long)]
    parallel: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                eprintln!("{}", e);
            }
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, CliError> {
    let vocabulary = match cli.vocabulary {
        Some(ref path) => {
            info!("Using vocabulary from {}", path.display());
            Vocabulary::load(path)?
        }
        None => Vocabulary::default(),
    };
    let verifier = TraceVerifier::new(vocabulary);

    let (trace, load_error) = TraceLog::load_or_empty(&cli.trace);
    for (operation, count) in trace.summary() {
        debug!("{:>25} {:>10}", operation, count);
    }
    let verdict = if cli.parallel {
        verifier.verify_parallel(&trace.spans)
    } else {
        verifier.verify(&trace)
    };

    let mut reporter = Reporter::new(std::io::stdout().lock());
    reporter.transcript(&trace, load_error.as_ref(), &verdict)?;

    if let Some(ref path) = cli.report {
        save_verdict_json(&verdict, path)?;
        info!("Saved verdict to {}", path.display());
    }

    Ok(verdict.passed())
}
