use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::compare::Comparator;
use crate::error::MatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyRole {
    /// Labels a record in output; never compared.
    Identity,
    /// Excluded from comparison and from the lookup-set search.
    Ignored,
    /// Participates in comparison and Bayesian combination.
    Matched,
}

impl Default for PropertyRole {
    fn default() -> Self {
        Self::Matched
    }
}

/// A named field binding a comparator to a low/high probability pair.
///
/// `low` is the probability that two records denote the same entity given
/// the lowest plausible similarity on this field; `high` the same for the
/// highest plausible similarity. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    comparator: Option<Arc<dyn Comparator>>,
    low: f64,
    high: f64,
    role: PropertyRole,
}

impl Property {
    pub fn matched(
        name: impl Into<String>,
        comparator: Arc<dyn Comparator>,
        low: f64,
        high: f64,
    ) -> Result<Self, MatchError> {
        let name = name.into();
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) {
            return Err(MatchError::ConfigValidation(format!(
                "property '{name}': probabilities must lie in [0, 1], got low={low} high={high}"
            )));
        }
        if low > high {
            return Err(MatchError::ConfigValidation(format!(
                "property '{name}': low probability {low} exceeds high probability {high}"
            )));
        }
        Ok(Self {
            name,
            comparator: Some(comparator),
            low,
            high,
            role: PropertyRole::Matched,
        })
    }

    pub fn identity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comparator: None,
            low: 0.0,
            high: 0.0,
            role: PropertyRole::Identity,
        }
    }

    pub fn ignored(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comparator: None,
            low: 0.0,
            high: 0.0,
            role: PropertyRole::Ignored,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn role(&self) -> PropertyRole {
        self.role
    }

    pub fn is_identity(&self) -> bool {
        self.role == PropertyRole::Identity
    }

    pub fn is_ignored(&self) -> bool {
        self.role == PropertyRole::Ignored
    }

    pub fn is_matched(&self) -> bool {
        self.role == PropertyRole::Matched
    }

    /// Similarity of two field values, `None` when this property carries no
    /// comparator (identity / ignored roles).
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        self.comparator.as_ref().map(|c| c.score(a, b))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            PropertyRole::Matched => write!(
                f,
                "{} [{}, low={}, high={}]",
                self.name,
                self.comparator.as_ref().map_or("-", |c| c.name()),
                self.low,
                self.high,
            ),
            PropertyRole::Identity => write!(f, "{} [identity]", self.name),
            PropertyRole::Ignored => write!(f, "{} [ignored]", self.name),
        }
    }
}
