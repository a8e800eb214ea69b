//! Weighted Euclidean distance between feature vectors.
//!
//! The weighted metric `d_w(u, v) = sqrt(Σ_k w_k * (u_k - v_k)^2)` is the
//! single distance function of the whole engine: the KNN backbone uses the
//! unweighted special case (all weights 1), query attachment and every search
//! strategy use a per-query weight vector. Plain f64 accumulation is
//! numerically adequate for the dimensions this engine targets (D up to a few
//! hundred).

use crate::error::{GraphError, GraphResult};

/// Compute the weighted Euclidean distance between `u` and `v` under `weights`.
///
/// All three slices must have the same length; a mismatch is a fatal
/// [`GraphError::DimensionMismatch`]. An all-zero weight vector is a
/// legitimate configuration and yields distance 0 for every pair.
pub fn weighted_distance(u: &[f64], v: &[f64], weights: &[f64]) -> GraphResult<f64> {
    if v.len() != u.len() {
        return Err(GraphError::DimensionMismatch {
            expected: u.len(),
            actual: v.len(),
        });
    }
    if weights.len() != u.len() {
        return Err(GraphError::DimensionMismatch {
            expected: u.len(),
            actual: weights.len(),
        });
    }
    Ok(weighted_distance_unchecked(u, v, weights))
}

/// Compute the plain (unweighted) Euclidean distance between `u` and `v`.
pub fn euclidean_distance(u: &[f64], v: &[f64]) -> GraphResult<f64> {
    if v.len() != u.len() {
        return Err(GraphError::DimensionMismatch {
            expected: u.len(),
            actual: v.len(),
        });
    }
    Ok(euclidean_distance_unchecked(u, v))
}

/// Weighted distance without length validation, for hot loops whose inputs
/// were validated at the call boundary.
#[inline]
pub(crate) fn weighted_distance_unchecked(u: &[f64], v: &[f64], weights: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len());
    debug_assert_eq!(u.len(), weights.len());
    let mut sum = 0.0;
    for k in 0..u.len() {
        let diff = u[k] - v[k];
        sum += weights[k] * diff * diff;
    }
    sum.sqrt()
}

/// Unweighted distance without length validation.
#[inline]
pub(crate) fn euclidean_distance_unchecked(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len());
    let mut sum = 0.0;
    for k in 0..u.len() {
        let diff = u[k] - v[k];
        sum += diff * diff;
    }
    sum.sqrt()
}
