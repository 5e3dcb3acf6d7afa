use std::cmp::Ordering;

use crate::error::MatchError;
use crate::matcher::{bayes, PRIOR};
use crate::property::Property;

/// Select the lookup (blocking-key) properties: the subset a value-keyed
/// index must cover so that every pair able to reach the possible-match
/// band is retrievable through at least one indexed property.
///
/// Matched properties are ranked by `high` descending (name tiebreak) and
/// walked while folding `bayes` over each property's best-case evidence.
/// The boundary is the first rank at which the accumulated probability
/// reaches the possible-match band; the walk stops once the match band is
/// reached. The selected set is the slice from the boundary through the end
/// of the ranked list. Properties with `high == 0` can never contribute
/// positive evidence and are excluded outright.
///
/// Returns indices into `properties`. Fails with `UnreachableThreshold`
/// when even all properties combined at their best cannot reach the match
/// threshold: that configuration could never produce a match and is
/// rejected at setup time.
pub fn select_lookup_properties(
    properties: &[Property],
    threshold: f64,
    maybe_threshold: f64,
) -> Result<Vec<usize>, MatchError> {
    let mut ranked: Vec<usize> = properties
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_matched() && p.high() > 0.0)
        .map(|(i, _)| i)
        .collect();
    ranked.sort_by(|&a, &b| {
        properties[b]
            .high()
            .partial_cmp(&properties[a].high())
            .unwrap_or(Ordering::Equal)
            .then_with(|| properties[a].name().cmp(properties[b].name()))
    });

    let limit = if maybe_threshold > 0.0 { maybe_threshold } else { threshold };

    let mut probability = PRIOR;
    let mut boundary = None;
    let mut reached_threshold = false;
    for (rank, &i) in ranked.iter().enumerate() {
        probability = bayes(probability, properties[i].high());
        if boundary.is_none() && probability >= limit {
            boundary = Some(rank);
        }
        if probability >= threshold {
            reached_threshold = true;
            break;
        }
    }

    if !reached_threshold {
        return Err(MatchError::UnreachableThreshold { best: probability, threshold });
    }

    Ok(boundary.map(|b| ranked[b..].to_vec()).unwrap_or_default())
}
