use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::model::{Evidence, Verdict};

/// Combine a prior probability with one more piece of evidence via
/// naive-Bayes odds multiplication.
///
/// Saturates at 0 and 1 so certain evidence never divides by zero.
/// Commutative and associative when folded over an evidence sequence, so
/// evidence order never changes the result.
pub fn bayes(prior: f64, evidence: f64) -> f64 {
    if evidence <= 0.0 || prior <= 0.0 {
        return 0.0;
    }
    if evidence >= 1.0 || prior >= 1.0 {
        return 1.0;
    }
    let combined = (prior / (1.0 - prior)) * (evidence / (1.0 - evidence));
    combined / (1.0 + combined)
}

/// Map a similarity score onto a property's probability range.
///
/// Linear between (similarity 0 → low) and (similarity 1 → high). This is
/// the seam between comparator output and Bayesian combination.
pub fn interpolate(similarity: f64, low: f64, high: f64) -> f64 {
    low + similarity * (high - low)
}

/// Prior seeding every evidence fold: maximum uncertainty about whether an
/// arbitrary pair denotes the same entity.
pub const PRIOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub probability: f64,
    pub verdict: Verdict,
}

/// Fold an evidence vector into one probability and band it into a verdict.
///
/// A similarity outside [0, 1] means a comparator broke its contract; that
/// is fatal, never clamped.
pub fn classify(config: &MatchConfig, evidence: &[Evidence]) -> Result<Classification, MatchError> {
    let mut probability = PRIOR;
    for item in evidence {
        if !(0.0..=1.0).contains(&item.similarity) {
            return Err(MatchError::Invariant(format!(
                "comparator for property '{}' returned similarity {} outside [0, 1]",
                item.property, item.similarity
            )));
        }
        let property = config.property(&item.property)?;
        probability = bayes(
            probability,
            interpolate(item.similarity, property.low(), property.high()),
        );
    }
    Ok(Classification {
        probability,
        verdict: verdict_for(probability, config.threshold(), config.maybe_threshold()),
    })
}

pub fn verdict_for(probability: f64, threshold: f64, maybe_threshold: f64) -> Verdict {
    if probability >= threshold {
        Verdict::Match
    } else if maybe_threshold > 0.0 && probability >= maybe_threshold {
        Verdict::PossibleMatch
    } else {
        Verdict::NonMatch
    }
}
