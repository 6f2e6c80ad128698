//! Offline golden-trace verification.
//!
//! This crate audits the span log emitted by an execution engine and proves
//! that the effects it claims actually happened: queries were really routed
//! to the kernel or DuckDB, timer hooks fired at different times, receipts
//! carry cryptographic proof, and operations do not answer every call with
//! the same canned result.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  trace.jsonl (one span per line)    │
//! └──────────────┬──────────────────────┘
//!                │ TraceLog::load_or_empty
//! ┌──────────────▼──────────────────────┐
//! │  TraceLog { spans: Vec<Span> }      │
//! └──────────────┬──────────────────────┘
//!                │ TraceVerifier::verify
//! ┌──────────────▼──────────────────────┐
//! │  checks (pure, independent):        │
//! │    execution_routing                │
//! │    timer_progression                │
//! │    transaction_integrity            │
//! │    constant_output                  │
//! └──────────────┬──────────────────────┘
//!                │ Verdict::from_outcomes
//! ┌──────────────▼──────────────────────┐
//! │  Verdict → Reporter → exit code     │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use goldentrace::loader::TraceLog;
//! use goldentrace::report::Reporter;
//! use goldentrace::verifier::TraceVerifier;
//!
//! let (trace, load_error) = TraceLog::load_or_empty("golden.jsonl");
//! let verdict = TraceVerifier::default().verify(&trace);
//!
//! let mut reporter = Reporter::new(std::io::stdout());
//! reporter.transcript(&trace, load_error.as_ref(), &verdict).unwrap();
//! std::process::exit(if verdict.passed() { 0 } else { 1 });
//! ```

pub mod attributes;
pub mod checks;
pub mod loader;
pub mod report;
pub mod span;
pub mod verifier;
pub mod vocabulary;

pub use checks::{CheckKind, CheckOutcome, CheckSummary, Violation, ViolationCategory};
pub use loader::{LoadError, TraceLog};
pub use span::Span;
pub use verifier::{TraceVerifier, Verdict};
pub use vocabulary::Vocabulary;
