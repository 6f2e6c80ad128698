//! Span data model.
//!
//! A [`Span`] is one operation the traced engine claims to have performed:
//! a dot-hierarchical `name` (e.g. `kernel.scan`) and an ordered list of raw
//! `"key:value"` attribute strings. Spans are read once from the log and
//! never mutated afterwards.

use crate::attributes::{self, AttributeMap};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
//  Span
// ═══════════════════════════════════════════════════════════════════════

/// One logged operation event.
///
/// Missing `name` / `attributes` fields deserialize to their empty values;
/// any other fields on the JSON object are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Operation identifier, dot-delimited by convention. May be empty.
    #[serde(default)]
    pub name: String,
    /// Raw attribute strings, nominally `"key:value"`.
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl Span {
    pub fn new(name: impl Into<String>, attributes: &[&str]) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Decode this span's attributes into a key/value map.
    ///
    /// The map is rebuilt on every call; nothing is cached.
    pub fn attribute_map(&self) -> AttributeMap {
        attributes::decode(&self.attributes)
    }

    /// Operation type: the name up to its first `.`, or the whole name.
    pub fn operation_type(&self) -> &str {
        match self.name.split_once('.') {
            Some((prefix, _)) => prefix,
            None => &self.name,
        }
    }

    /// Whether the span name contains `marker` as a substring.
    pub fn name_contains(&self, marker: &str) -> bool {
        self.name.contains(marker)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<unnamed>")?;
        } else {
            write!(f, "{}", self.name)?;
        }
        if !self.attributes.is_empty() {
            write!(f, " [{}]", self.attributes.join(", "))?;
        }
        Ok(())
    }
}
