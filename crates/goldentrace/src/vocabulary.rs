//! Naming convention shared with the traced engine.
//!
//! The checks never hard-code span names or attribute keys; they read them
//! from a [`Vocabulary`]. The default vocabulary is the convention the
//! engine emits today. A JSON file may override any subset of fields.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("Failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid vocabulary JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid vocabulary: {0}")]
    Invalid(String),
}

/// Span-name markers and attribute keys the checks match against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vocabulary {
    /// Substring marking a span routed to the native kernel.
    pub kernel_marker: String,
    /// Substring marking a span routed to DuckDB.
    pub duckdb_marker: String,
    /// Substring marking a timer hook span.
    pub timer_marker: String,
    /// Substring marking a transaction span.
    pub transaction_marker: String,
    /// Substring marking a receipt verification span.
    pub receipt_marker: String,
    /// A kernel span must carry one of these keys.
    pub kernel_indicators: Vec<String>,
    /// A DuckDB span must carry one of these keys.
    pub duckdb_indicators: Vec<String>,
    /// Key holding a timer span's firing time.
    pub timestamp_key: String,
    /// A receipt span must carry one of these keys.
    pub crypto_indicators: Vec<String>,
    /// Result signal keys, highest priority first.
    pub result_keys: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            kernel_marker: "kernel".to_string(),
            duckdb_marker: "duckdb".to_string(),
            timer_marker: "timer".to_string(),
            transaction_marker: "tx.".to_string(),
            receipt_marker: "receipt".to_string(),
            kernel_indicators: strings(&["kc.rows", "kc.count"]),
            duckdb_indicators: strings(&["kc.query", "kc.plan"]),
            timestamp_key: "kc.timestamp".to_string(),
            crypto_indicators: strings(&["merkle_root", "signature", "receipt_hash"]),
            result_keys: strings(&["result", "hash", "count"]),
        }
    }
}

impl Vocabulary {
    /// Load a vocabulary override from a JSON file.
    ///
    /// Fields absent from the file keep their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let file = File::open(path.as_ref())?;
        let vocabulary: Self = serde_json::from_reader(BufReader::new(file))?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Reject vocabularies that would make a check match everything or
    /// nothing.
    pub fn validate(&self) -> Result<(), VocabularyError> {
        let markers = [
            ("kernel_marker", &self.kernel_marker),
            ("duckdb_marker", &self.duckdb_marker),
            ("timer_marker", &self.timer_marker),
            ("transaction_marker", &self.transaction_marker),
            ("receipt_marker", &self.receipt_marker),
            ("timestamp_key", &self.timestamp_key),
        ];
        for (field, value) in markers {
            if value.is_empty() {
                return Err(VocabularyError::Invalid(format!("{field} must not be empty")));
            }
        }

        let key_lists = [
            ("kernel_indicators", &self.kernel_indicators),
            ("duckdb_indicators", &self.duckdb_indicators),
            ("crypto_indicators", &self.crypto_indicators),
            ("result_keys", &self.result_keys),
        ];
        for (field, keys) in key_lists {
            if keys.is_empty() {
                return Err(VocabularyError::Invalid(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn default_matches_engine_convention() {
        let v = Vocabulary::default();
        assert_eq!(v.transaction_marker, "tx.");
        assert_eq!(v.kernel_indicators, vec!["kc.rows", "kc.count"]);
        assert_eq!(v.result_keys, vec!["result", "hash", "count"]);
        assert!(v.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        let mut file = File::create(&path).unwrap();
        file.write_all(br#"{"timer_marker": "hook", "timestamp_key": "ts"}"#)
            .unwrap();

        let v = Vocabulary::load(&path).unwrap();
        assert_eq!(v.timer_marker, "hook");
        assert_eq!(v.timestamp_key, "ts");
        assert_eq!(v.kernel_marker, "kernel");
    }

    #[test]
    fn empty_marker_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        std::fs::write(&path, r#"{"receipt_marker": ""}"#).unwrap();

        let err = Vocabulary::load(&path).unwrap_err();
        assert!(matches!(err, VocabularyError::Invalid(_)));
        assert!(err.to_string().contains("receipt_marker"));
    }

    #[test]
    fn misspelled_field_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        std::fs::write(&path, r#"{"timer_markr": "hook"}"#).unwrap();

        let err = Vocabulary::load(&path).unwrap_err();
        assert!(matches!(err, VocabularyError::Json(_)));
        assert!(err.to_string().contains("timer_markr"));
    }

    #[test]
    fn empty_key_list_is_rejected() {
        let v = Vocabulary {
            crypto_indicators: Vec::new(),
            ..Vocabulary::default()
        };
        assert!(v.validate().is_err());
    }

    #[test]
    fn bad_json_and_missing_file_are_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(Vocabulary::load(&path), Err(VocabularyError::Json(_))));
        assert!(matches!(
            Vocabulary::load(dir.path().join("absent.json")),
            Err(VocabularyError::Io(_))
        ));
    }
}
