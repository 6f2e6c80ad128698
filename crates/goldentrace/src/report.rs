//! Human-readable progress output and JSON verdict export.

use crate::checks::CheckOutcome;
use crate::loader::{LoadError, TraceLog};
use crate::verifier::Verdict;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

const RULE_WIDTH: usize = 50;

/// Errors that can occur while writing a report file.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the verification transcript to any [`Write`] sink.
///
/// The binary points this at stdout; tests point it at a `Vec<u8>`.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Report how loading went.
    pub fn loaded(&mut self, trace: &TraceLog, error: Option<&LoadError>) -> io::Result<()> {
        match error {
            None => writeln!(
                self.out,
                "✅ Loaded {} spans from {}",
                trace.len(),
                trace.source
            ),
            Some(e @ LoadError::NotFound { .. }) => writeln!(self.out, "❌ {}", e),
            Some(e) => writeln!(self.out, "❌ Failed to load traces: {}", e),
        }
    }

    pub fn begin(&mut self) -> io::Result<()> {
        writeln!(self.out, "🔍 Running golden trace verification...")?;
        self.rule()
    }

    /// One progress line per passing check. Failing checks are reported
    /// with the verdict.
    pub fn check(&mut self, outcome: &CheckOutcome) -> io::Result<()> {
        match outcome.summary {
            Some(ref summary) if outcome.passed => writeln!(self.out, "✅ {}", summary),
            _ => Ok(()),
        }
    }

    /// Closing rule, verdict body, and the final one-line result.
    pub fn verdict(&mut self, verdict: &Verdict) -> io::Result<()> {
        self.rule()?;
        writeln!(self.out, "{}", verdict)?;
        let result = if verdict.passed() { "PASSED" } else { "FAILED" };
        writeln!(self.out, "🎯 Golden trace verification: {}", result)
    }

    /// Full transcript: load line, banner, per-check lines, verdict.
    pub fn transcript(
        &mut self,
        trace: &TraceLog,
        error: Option<&LoadError>,
        verdict: &Verdict,
    ) -> io::Result<()> {
        self.loaded(trace, error)?;
        self.begin()?;
        for outcome in &verdict.outcomes {
            self.check(outcome)?;
        }
        self.verdict(verdict)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }
}

/// Save a verdict as pretty-printed JSON.
pub fn save_verdict_json(verdict: &Verdict, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, verdict)?;
    Ok(())
}
