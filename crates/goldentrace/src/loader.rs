//! Trace loading from newline-delimited JSON.
//!
//! [`TraceLog::load`] reads a whole log into memory. Loading is
//! all-or-nothing: one malformed line aborts the load and every span parsed
//! before it is discarded. [`TraceLog::load_or_empty`] collapses any failure
//! into an empty trace, which the verifier then reports as missing evidence.

use crate::span::Span;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════
//  Error type
// ═══════════════════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Trace file {} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed span on line {line} of {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

// ═══════════════════════════════════════════════════════════════════════
//  Trace log
// ═══════════════════════════════════════════════════════════════════════

/// An ordered sequence of spans loaded from one log file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceLog {
    /// Where the spans came from (path as given by the caller).
    pub source: String,
    /// All spans in file order.
    pub spans: Vec<Span>,
}

impl TraceLog {
    pub fn new(source: impl Into<String>, spans: Vec<Span>) -> Self {
        Self {
            source: source.into(),
            spans,
        }
    }

    /// A trace with no spans, used when loading fails.
    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(source, Vec::new())
    }

    /// Load a trace from a JSONL file.
    ///
    /// Blank (or whitespace-only) lines are skipped. Every other line must
    /// deserialize as a [`Span`] object or the whole load fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let spans = parse_lines(BufReader::new(file), path)?;
        info!("Loaded {} spans from {}", spans.len(), path.display());
        Ok(Self::new(path.display().to_string(), spans))
    }

    /// Load a trace, collapsing any failure into an empty trace.
    ///
    /// The error is returned alongside so the caller can report it; the
    /// empty trace still flows through every check.
    pub fn load_or_empty(path: impl AsRef<Path>) -> (Self, Option<LoadError>) {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(log) => (log, None),
            Err(e) => {
                warn!("{}", e);
                (Self::empty(path.display().to_string()), Some(e))
            }
        }
    }

    /// Number of spans in the trace.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the trace has no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Span count per operation type (unnamed spans are skipped).
    pub fn summary(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for span in self.spans.iter().filter(|s| !s.name.is_empty()) {
            *counts.entry(span.operation_type().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

fn parse_lines<R: BufRead>(reader: R, path: &Path) -> Result<Vec<Span>, LoadError> {
    let mut spans = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let span: Span = serde_json::from_str(trimmed).map_err(|source| {
            debug!("Discarding {} spans parsed before line {}", spans.len(), idx + 1);
            LoadError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            }
        })?;
        spans.push(span);
    }
    Ok(spans)
}
