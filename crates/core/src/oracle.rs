//! Correctness scoring of a strategy's output against the exact reference.
//!
//! The score is cardinality-based, not a set-equality check: it tolerates
//! different members as long as the counts roughly match, which is the
//! comparison the evaluation harness is defined against. The reference set
//! comes from the exhaustive strategy ([`crate::search::Strategy::Naive`]).

use crate::search::SearchMatch;

/// Score a candidate result set against the exact reference set.
///
/// Returns `min(|candidate|, |reference|) / |reference|`, capped at 1.0.
/// An empty reference scores 1.0 only for an empty candidate, 0.0 otherwise.
pub fn score(reference: &[SearchMatch], candidate: &[SearchMatch]) -> f64 {
    if reference.is_empty() {
        return if candidate.is_empty() { 1.0 } else { 0.0 };
    }
    candidate.len().min(reference.len()) as f64 / reference.len() as f64
}

/// Average a batch of per-query correctness scores. An empty batch scores
/// 0.0, matching the evaluation harness.
pub fn mean_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}
