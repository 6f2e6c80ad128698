//! Verdict aggregation over the four structural checks.
//!
//! The [`TraceVerifier`] runs every check in [`CheckKind::ALL`] order,
//! always all four, and folds their outcomes into a [`Verdict`]. A failing
//! check never prevents the later ones from running.
//!
//! This is the CI entry point: load a trace, verify it, fail the build if
//! the verdict did not pass.

use crate::checks::{CheckKind, CheckOutcome, Violation};
use crate::loader::TraceLog;
use crate::span::Span;
use crate::vocabulary::Vocabulary;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
//  Verdict
// ═══════════════════════════════════════════════════════════════════════

/// Outcome of one verification run.
///
/// `passed()` holds iff all four check flags are true, and `violations` is
/// non-empty iff at least one flag is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub execution_routing: bool,
    pub timer_progression: bool,
    pub transaction_integrity: bool,
    pub constant_output: bool,
    /// Violations from every failing check, in check-run order.
    pub violations: Vec<Violation>,
    /// Per-check outcomes, in check-run order.
    pub outcomes: Vec<CheckOutcome>,
    /// Number of spans the checks ran over.
    pub span_count: usize,
}

impl Verdict {
    /// Merge per-check outcomes (in run order) into a verdict.
    pub fn from_outcomes(outcomes: Vec<CheckOutcome>, span_count: usize) -> Self {
        let flag = |kind: CheckKind| {
            outcomes
                .iter()
                .find(|o| o.check == kind)
                .is_some_and(|o| o.passed)
        };

        let verdict = Self {
            execution_routing: flag(CheckKind::ExecutionRouting),
            timer_progression: flag(CheckKind::TimerProgression),
            transaction_integrity: flag(CheckKind::TransactionIntegrity),
            constant_output: flag(CheckKind::ConstantOutput),
            violations: outcomes
                .iter()
                .flat_map(|o| o.violations.iter().cloned())
                .collect(),
            outcomes,
            span_count,
        };

        debug_assert_eq!(
            verdict.passed(),
            verdict.violations.is_empty(),
            "verdict passes iff no violations were recorded"
        );
        verdict
    }

    /// Overall result: every check passed.
    pub fn passed(&self) -> bool {
        self.execution_routing
            && self.timer_progression
            && self.transaction_integrity
            && self.constant_output
    }

    /// Flag for a single check.
    pub fn check_passed(&self, kind: CheckKind) -> bool {
        match kind {
            CheckKind::ExecutionRouting => self.execution_routing,
            CheckKind::TimerProgression => self.timer_progression,
            CheckKind::TransactionIntegrity => self.transaction_integrity,
            CheckKind::ConstantOutput => self.constant_output,
        }
    }

    /// Violations rendered as human-readable messages.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            writeln!(f, "✅ All golden trace verifications PASSED")?;
            write!(f, "🎯 System proves real effects via trace spans")
        } else {
            write!(f, "❌ Golden trace verifications FAILED:")?;
            for violation in &self.violations {
                write!(f, "\n  ❌ {}", violation)?;
            }
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Verifier
// ═══════════════════════════════════════════════════════════════════════

/// Runs the structural checks against a loaded trace.
///
/// # Example
///
/// ```no_run
/// use goldentrace::loader::TraceLog;
/// use goldentrace::verifier::TraceVerifier;
///
/// let (trace, _load_error) = TraceLog::load_or_empty("golden.jsonl");
/// let verdict = TraceVerifier::default().verify(&trace);
/// println!("{}", verdict);
/// assert!(verdict.passed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TraceVerifier {
    vocabulary: Vocabulary,
}

impl TraceVerifier {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Verify a loaded trace.
    pub fn verify(&self, trace: &TraceLog) -> Verdict {
        self.verify_spans(&trace.spans)
    }

    /// Run the checks one after another on the current thread.
    pub fn verify_spans(&self, spans: &[Span]) -> Verdict {
        let outcomes = CheckKind::ALL
            .iter()
            .map(|kind| self.run_check(*kind, spans))
            .collect();
        Verdict::from_outcomes(outcomes, spans.len())
    }

    /// Run the four checks on scoped threads.
    ///
    /// The checks only read `spans`, so the merged verdict is identical to
    /// [`verify_spans`](Self::verify_spans).
    pub fn verify_parallel(&self, spans: &[Span]) -> Verdict {
        let outcomes = std::thread::scope(|scope| {
            let handles: Vec<_> = CheckKind::ALL
                .iter()
                .map(|&kind| scope.spawn(move || self.run_check(kind, spans)))
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(outcome) => outcome,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });
        Verdict::from_outcomes(outcomes, spans.len())
    }

    fn run_check(&self, kind: CheckKind, spans: &[Span]) -> CheckOutcome {
        let outcome = kind.run(spans, &self.vocabulary);
        debug!(
            "check {} over {} spans: passed={} violations={}",
            kind,
            spans.len(),
            outcome.passed,
            outcome.violations.len()
        );
        outcome
    }
}
