//! Suggestion aggregation
//!
//! Merges the per-method candidate lists of one analysis run into a
//! single ranked, deduplicated suggestion list, then removes pairs the
//! board already has a persisted relationship for. Each step is a pure
//! function so the properties (idempotent dedup, non-increasing
//! confidence, bidirectional existence filtering) are testable in
//! isolation.

use super::{AnalysisOutcome, Suggestion};
use crate::graph::{AnalysisMethod, CardPair, Relationship};
use rustc_hash::FxHashSet;

/// Map every successful method's candidates into suggestions, in fixed
/// method order (embedding, tag similarity, derived). Failed methods
/// contribute nothing.
pub fn aggregate(outcome: AnalysisOutcome) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let AnalysisOutcome {
        embedding,
        tag_similarity,
        derived,
        ..
    } = outcome;

    for (method, result) in [
        (AnalysisMethod::Embedding, embedding),
        (AnalysisMethod::TagSimilarity, tag_similarity),
        (AnalysisMethod::Derived, derived),
    ] {
        if let Ok(candidates) = result {
            suggestions.extend(
                candidates
                    .into_iter()
                    .filter(|c| c.source_card_id != c.target_card_id)
                    .map(|c| Suggestion::from_candidate(method, c)),
            );
        }
    }
    suggestions
}

/// Collapse `(a, b)` and `(b, a)` to one entry via the canonical pair
/// key; the first occurrence wins. Idempotent.
pub fn dedupe(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut seen: FxHashSet<CardPair> = FxHashSet::default();
    suggestions
        .into_iter()
        .filter(|s| seen.insert(s.pair()))
        .collect()
}

/// Sort by descending confidence. Stable, so equal-confidence entries
/// keep their aggregation order.
pub fn rank(suggestions: &mut [Suggestion]) {
    suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// Drop suggestions whose pair already exists as a persisted
/// relationship, in either direction.
pub fn filter_existing(
    suggestions: Vec<Suggestion>,
    existing: &[Relationship],
) -> Vec<Suggestion> {
    let persisted: FxHashSet<CardPair> = existing.iter().map(Relationship::pair).collect();
    suggestions
        .into_iter()
        .filter(|s| !persisted.contains(&s.pair()))
        .collect()
}

/// Full pipeline: aggregate, dedupe, filter out persisted pairs, rank
pub fn assemble(outcome: AnalysisOutcome, existing: &[Relationship]) -> Vec<Suggestion> {
    let merged = dedupe(aggregate(outcome));
    let mut fresh = filter_existing(merged, existing);
    rank(&mut fresh);
    fresh
}
