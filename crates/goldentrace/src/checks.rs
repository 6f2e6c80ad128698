//! The four structural checks.
//!
//! Every check is a pure function of the loaded span slice and the
//! [`Vocabulary`]: no I/O, no shared state, same inputs give the same
//! [`CheckOutcome`]. Checks stop at their first violation, so a failing
//! outcome carries exactly one [`Violation`].
//!
//! | Check                      | Passes when                                        |
//! |----------------------------|----------------------------------------------------|
//! | [`execution_routing`]      | kernel/duckdb spans exist and carry work indicators |
//! | [`timer_progression`]      | timer spans show ≥2 distinct timestamps             |
//! | [`transaction_integrity`]  | tx and receipt spans exist, receipts carry proofs   |
//! | [`constant_output`]        | no operation type repeats one result everywhere     |

use crate::attributes::{first_value, has_any};
use crate::span::Span;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
//  Check identity
// ═══════════════════════════════════════════════════════════════════════

/// Which structural check produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    ExecutionRouting,
    TimerProgression,
    TransactionIntegrity,
    ConstantOutput,
}

impl CheckKind {
    /// All checks, in the order the verifier runs them.
    pub const ALL: [CheckKind; 4] = [
        CheckKind::ExecutionRouting,
        CheckKind::TimerProgression,
        CheckKind::TransactionIntegrity,
        CheckKind::ConstantOutput,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecutionRouting => "execution_routing",
            Self::TimerProgression => "timer_hooks",
            Self::TransactionIntegrity => "transaction_integrity",
            Self::ConstantOutput => "constant_output",
        }
    }

    /// Run this check over `spans`.
    pub fn run(&self, spans: &[Span], vocabulary: &Vocabulary) -> CheckOutcome {
        match self {
            Self::ExecutionRouting => execution_routing(spans, vocabulary),
            Self::TimerProgression => timer_progression(spans, vocabulary),
            Self::TransactionIntegrity => transaction_integrity(spans, vocabulary),
            Self::ConstantOutput => constant_output(spans, vocabulary),
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Violations
// ═══════════════════════════════════════════════════════════════════════

/// Execution backend a span was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Kernel,
    DuckDb,
}

/// Coarse classification of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    /// A required span category is entirely missing.
    EvidenceAbsent,
    /// A span lacks a required attribute.
    IndicatorMissing,
    /// A receipt span carries no proof material.
    IntegrityViolation,
    /// One result value repeated across an operation type.
    ConstancyViolation,
}

/// A single reason a check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    NoRoutingEvidence,
    MissingExecutionIndicator { span: String, route: Route },
    NoTimerEvidence,
    NoTimeProgression,
    NoTransactionEvidence,
    NoReceiptEvidence,
    MissingCryptoIndicator { span: String },
    NoOperationEvidence,
    ConstantOutput { operation: String, value: String },
}

impl Violation {
    pub fn category(&self) -> ViolationCategory {
        match self {
            Self::NoRoutingEvidence
            | Self::NoTimerEvidence
            | Self::NoTransactionEvidence
            | Self::NoReceiptEvidence
            | Self::NoOperationEvidence => ViolationCategory::EvidenceAbsent,
            Self::MissingExecutionIndicator { .. } | Self::NoTimeProgression => {
                ViolationCategory::IndicatorMissing
            }
            Self::MissingCryptoIndicator { .. } => ViolationCategory::IntegrityViolation,
            Self::ConstantOutput { .. } => ViolationCategory::ConstancyViolation,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRoutingEvidence => write!(f, "No execution routing spans found"),
            Self::MissingExecutionIndicator {
                span,
                route: Route::Kernel,
            } => write!(f, "Kernel span missing row indicators: {}", span),
            Self::MissingExecutionIndicator {
                span,
                route: Route::DuckDb,
            } => write!(f, "DuckDB span missing query indicators: {}", span),
            Self::NoTimerEvidence => write!(f, "No timer hook spans found"),
            Self::NoTimeProgression => write!(f, "Timer hooks don't show time progression"),
            Self::NoTransactionEvidence => write!(f, "No transaction spans found"),
            Self::NoReceiptEvidence => write!(f, "No receipt verification spans found"),
            Self::MissingCryptoIndicator { span } => {
                write!(f, "Receipt span missing cryptographic indicators: {}", span)
            }
            Self::NoOperationEvidence => write!(f, "No operation spans found"),
            Self::ConstantOutput { operation, value } => {
                write!(f, "Constant output detected in {}: {}", operation, value)
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Outcomes
// ═══════════════════════════════════════════════════════════════════════

/// Evidence counts reported by a passing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckSummary {
    Routing {
        kernel_spans: usize,
        duckdb_spans: usize,
    },
    Timers {
        timer_spans: usize,
        distinct_timestamps: usize,
    },
    Transactions {
        transaction_spans: usize,
        receipt_spans: usize,
    },
    Outputs {
        operation_types: usize,
    },
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Routing {
                kernel_spans,
                duckdb_spans,
            } => write!(
                f,
                "Verified {} kernel + {} duckdb spans",
                kernel_spans, duckdb_spans
            ),
            Self::Timers {
                timer_spans,
                distinct_timestamps,
            } => write!(
                f,
                "Verified {} timer spans with {} unique timestamps",
                timer_spans, distinct_timestamps
            ),
            Self::Transactions {
                transaction_spans,
                receipt_spans,
            } => write!(
                f,
                "Verified {} tx + {} receipt spans",
                transaction_spans, receipt_spans
            ),
            Self::Outputs { operation_types } => write!(
                f,
                "Verified non-constant outputs across {} operation types",
                operation_types
            ),
        }
    }
}

/// Result of running one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: CheckKind,
    pub passed: bool,
    /// Empty iff `passed`.
    pub violations: Vec<Violation>,
    /// Present iff `passed`.
    pub summary: Option<CheckSummary>,
}

impl CheckOutcome {
    fn pass(check: CheckKind, summary: CheckSummary) -> Self {
        Self {
            check,
            passed: true,
            violations: Vec::new(),
            summary: Some(summary),
        }
    }

    fn fail(check: CheckKind, violation: Violation) -> Self {
        Self {
            check,
            passed: false,
            violations: vec![violation],
            summary: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Checks
// ═══════════════════════════════════════════════════════════════════════

/// Kernel vs DuckDB routing actually happened.
///
/// Spans are scanned in trace order. A span whose name matches both
/// markers is held to the kernel requirement.
pub fn execution_routing(spans: &[Span], vocabulary: &Vocabulary) -> CheckOutcome {
    let check = CheckKind::ExecutionRouting;
    let kernel_spans = spans
        .iter()
        .filter(|s| s.name_contains(&vocabulary.kernel_marker))
        .count();
    let duckdb_spans = spans
        .iter()
        .filter(|s| s.name_contains(&vocabulary.duckdb_marker))
        .count();

    if kernel_spans == 0 && duckdb_spans == 0 {
        return CheckOutcome::fail(check, Violation::NoRoutingEvidence);
    }

    for span in spans {
        let (route, required) = if span.name_contains(&vocabulary.kernel_marker) {
            (Route::Kernel, vocabulary.kernel_indicators.as_slice())
        } else if span.name_contains(&vocabulary.duckdb_marker) {
            (Route::DuckDb, vocabulary.duckdb_indicators.as_slice())
        } else {
            continue;
        };

        if !has_any(&span.attribute_map(), required) {
            return CheckOutcome::fail(
                check,
                Violation::MissingExecutionIndicator {
                    span: span.name.clone(),
                    route,
                },
            );
        }
    }

    CheckOutcome::pass(
        check,
        CheckSummary::Routing {
            kernel_spans,
            duckdb_spans,
        },
    )
}

/// Timer hooks fired at more than one distinct time.
pub fn timer_progression(spans: &[Span], vocabulary: &Vocabulary) -> CheckOutcome {
    let check = CheckKind::TimerProgression;
    let timers: Vec<&Span> = spans
        .iter()
        .filter(|s| s.name_contains(&vocabulary.timer_marker))
        .collect();

    if timers.is_empty() {
        return CheckOutcome::fail(check, Violation::NoTimerEvidence);
    }

    let mut timestamps = BTreeSet::new();
    for span in &timers {
        if let Some(ts) = span.attribute_map().remove(&vocabulary.timestamp_key) {
            timestamps.insert(ts);
        }
    }
    debug_assert!(timestamps.len() <= timers.len());

    if timestamps.len() <= 1 {
        return CheckOutcome::fail(check, Violation::NoTimeProgression);
    }

    CheckOutcome::pass(
        check,
        CheckSummary::Timers {
            timer_spans: timers.len(),
            distinct_timestamps: timestamps.len(),
        },
    )
}

/// Transactions happened and every receipt carries proof material.
pub fn transaction_integrity(spans: &[Span], vocabulary: &Vocabulary) -> CheckOutcome {
    let check = CheckKind::TransactionIntegrity;
    let transaction_spans = spans
        .iter()
        .filter(|s| s.name_contains(&vocabulary.transaction_marker))
        .count();

    if transaction_spans == 0 {
        return CheckOutcome::fail(check, Violation::NoTransactionEvidence);
    }

    let receipts: Vec<&Span> = spans
        .iter()
        .filter(|s| s.name_contains(&vocabulary.receipt_marker))
        .collect();

    if receipts.is_empty() {
        return CheckOutcome::fail(check, Violation::NoReceiptEvidence);
    }

    if let Some(span) = receipts
        .iter()
        .find(|s| !has_any(&s.attribute_map(), vocabulary.crypto_indicators.as_slice()))
    {
        return CheckOutcome::fail(
            check,
            Violation::MissingCryptoIndicator {
                span: span.name.clone(),
            },
        );
    }

    CheckOutcome::pass(
        check,
        CheckSummary::Transactions {
            transaction_spans,
            receipt_spans: receipts.len(),
        },
    )
}

/// No operation type answers every call with the same result.
///
/// Groups are visited in order of first appearance and the check stops at
/// the first constant group; later groups are not examined.
pub fn constant_output(spans: &[Span], vocabulary: &Vocabulary) -> CheckOutcome {
    let check = CheckKind::ConstantOutput;
    if spans.is_empty() {
        return CheckOutcome::fail(check, Violation::NoOperationEvidence);
    }

    let groups = group_by_operation(spans);

    for (operation, members) in &groups {
        if members.len() < 2 {
            continue;
        }

        let signals: Vec<String> = members
            .iter()
            .filter_map(|span| {
                let attrs = span.attribute_map();
                first_value(&attrs, vocabulary.result_keys.as_slice()).map(str::to_string)
            })
            .collect();

        if signals.len() >= 2 && signals.iter().all(|s| *s == signals[0]) {
            return CheckOutcome::fail(
                check,
                Violation::ConstantOutput {
                    operation: operation.to_string(),
                    value: signals[0].clone(),
                },
            );
        }
    }

    CheckOutcome::pass(
        check,
        CheckSummary::Outputs {
            operation_types: groups.len(),
        },
    )
}

/// Group named spans by operation type, preserving first-appearance order.
fn group_by_operation(spans: &[Span]) -> Vec<(&str, Vec<&Span>)> {
    let mut groups: Vec<(&str, Vec<&Span>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for span in spans.iter().filter(|s| !s.name.is_empty()) {
        let operation = span.operation_type();
        let slot = *index.entry(operation).or_insert_with(|| {
            groups.push((operation, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(span);
    }

    debug_assert_eq!(
        groups.iter().map(|(_, m)| m.len()).sum::<usize>(),
        spans.iter().filter(|s| !s.name.is_empty()).count(),
        "every named span lands in exactly one group"
    );
    groups
}
