use std::fmt;
use std::sync::Arc;

/// Field-level similarity function.
///
/// Implementations must be deterministic and stay inside `[0, 1]`; a score
/// outside that range is a programming error and corrupts the Bayesian
/// combination downstream, so the engine refuses it rather than clamping.
/// Missing values are the caller's concern: comparators only ever see two
/// present strings.
pub trait Comparator: fmt::Debug + Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;

    /// Stable name used by configuration files.
    fn name(&self) -> &'static str;
}

/// 1.0 on byte equality, 0.0 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Exact;

impl Comparator for Exact {
    fn score(&self, a: &str, b: &str) -> f64 {
        if a == b { 1.0 } else { 0.0 }
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

/// Jaro-Winkler similarity, suited to short person/organization names.
#[derive(Debug, Clone, Copy)]
pub struct JaroWinkler;

impl Comparator for JaroWinkler {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }

    fn name(&self) -> &'static str {
        "jaro_winkler"
    }
}

/// Normalized Levenshtein similarity (1 - distance / max_len).
#[derive(Debug, Clone, Copy)]
pub struct Levenshtein;

impl Comparator for Levenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }

    fn name(&self) -> &'static str {
        "levenshtein"
    }
}

/// Resolve a comparator by its config-file name.
pub fn by_name(name: &str) -> Option<Arc<dyn Comparator>> {
    match name {
        "exact" => Some(Arc::new(Exact)),
        "jaro_winkler" => Some(Arc::new(JaroWinkler)),
        "levenshtein" => Some(Arc::new(Levenshtein)),
        _ => None,
    }
}
