use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One record: property name → zero-or-more string values.
///
/// Fields may be multi-valued (several emails on one person). Empty values
/// are never stored: a property with no values is simply absent, and absent
/// properties contribute no evidence. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, Vec<String>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for single-valued fields.
    pub fn from_fields<N, V>(fields: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in fields {
            record.push_value(&name.into(), value.into());
        }
        record
    }

    /// Append a value to a field. Empty values are dropped.
    pub fn push_value(&mut self, name: &str, value: String) {
        if value.is_empty() {
            return;
        }
        self.fields.entry(name.to_string()).or_default().push(value);
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Human-readable label built from the given (identity) property names.
    pub fn label(&self, names: &[&str]) -> String {
        let parts: Vec<&str> = names.iter().filter_map(|n| self.first_value(n)).collect();
        if parts.is_empty() {
            "<unlabeled>".to_string()
        } else {
            parts.join(":")
        }
    }
}

// ---------------------------------------------------------------------------
// Evidence + Classification
// ---------------------------------------------------------------------------

/// Per-property similarity for one candidate pair. Transient: produced by
/// candidate retrieval, consumed by one classification decision.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    pub property: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    PossibleMatch,
    NonMatch,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::PossibleMatch => write!(f, "possible_match"),
            Self::NonMatch => write!(f, "non_match"),
        }
    }
}

/// One classified candidate pair, emitted downstream.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedPair {
    pub left: Record,
    pub right: Record,
    pub probability: f64,
    pub verdict: Verdict,
    pub evidence: Vec<Evidence>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchSummary {
    /// Candidate pairs actually compared (non-matches included).
    pub total_compared: usize,
    pub matches: usize,
    pub possible_matches: usize,
    pub non_matches: usize,
    /// Records dropped without classification (empty or malformed).
    pub skipped_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchMeta {
    pub config_name: String,
    pub mode: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub meta: MatchMeta,
    pub summary: MatchSummary,
    pub pairs: Vec<ClassifiedPair>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_drops_empty_values() {
        let mut r = Record::new();
        r.push_value("name", "Alice".into());
        r.push_value("name", String::new());
        r.push_value("email", String::new());
        assert_eq!(r.values("name"), ["Alice"]);
        assert!(r.values("email").is_empty());
        assert!(r.first_value("email").is_none());
    }

    #[test]
    fn record_multi_valued_fields() {
        let mut r = Record::new();
        r.push_value("email", "a@x.org".into());
        r.push_value("email", "a@y.org".into());
        assert_eq!(r.values("email").len(), 2);
        assert_eq!(r.first_value("email"), Some("a@x.org"));
    }

    #[test]
    fn record_label_from_identity_fields() {
        let r = Record::from_fields([("id", "42"), ("name", "Alice")]);
        assert_eq!(r.label(&["id"]), "42");
        assert_eq!(r.label(&["id", "name"]), "42:Alice");
        assert_eq!(Record::new().label(&["id"]), "<unlabeled>");
    }

    #[test]
    fn record_equality_ignores_insertion_order() {
        let a = Record::from_fields([("x", "1"), ("y", "2")]);
        let b = Record::from_fields([("y", "2"), ("x", "1")]);
        assert_eq!(a, b);
    }

    #[test]
    fn verdict_display() {
        assert_eq!(Verdict::Match.to_string(), "match");
        assert_eq!(Verdict::PossibleMatch.to_string(), "possible_match");
        assert_eq!(Verdict::NonMatch.to_string(), "non_match");
    }
}
