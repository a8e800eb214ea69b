//! Exact nearest-neighbor index over regular points, used at build time only.
//!
//! [`FlatIndex`] is a brute-force index: every `nearest` call scans the full
//! point set. Exactness matters here — the KNN backbone's edges are a
//! build-time contract that the search strategies rely on — so no approximate
//! structure is used. The batch entry point parallelizes the per-point scans
//! with rayon, which is where the build spends its time.

use crate::graph::types::RegularPoint;
use crate::metric::euclidean_distance_unchecked;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Flat exact nearest-neighbor index borrowing the point set being indexed.
pub struct FlatIndex<'a> {
    points: &'a [RegularPoint],
}

impl<'a> FlatIndex<'a> {
    /// Create an index over `points`. All points must share one dimension;
    /// the caller (the graph builder) validates this before indexing.
    pub fn new(points: &'a [RegularPoint]) -> Self {
        Self { points }
    }

    /// Return the `k` nearest points to `points[target]` by plain Euclidean
    /// distance, excluding the target itself, sorted ascending by
    /// (distance, id). Ties among equidistant neighbors break by ascending
    /// point id so the backbone is deterministic. Returns fewer than `k`
    /// entries only when the point set has fewer than `k + 1` points.
    pub fn nearest(&self, target: usize, k: usize) -> Vec<(u32, f64)> {
        if k == 0 {
            return Vec::new();
        }
        let origin = &self.points[target].features;
        let mut candidates: Vec<(u32, f64)> = self
            .points
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != target)
            .map(|(j, p)| (j as u32, euclidean_distance_unchecked(origin, &p.features)))
            .collect();

        let cmp = |a: &(u32, f64), b: &(u32, f64)| -> Ordering {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.points[a.0 as usize].id.cmp(&self.points[b.0 as usize].id))
        };

        if candidates.len() > k {
            candidates.select_nth_unstable_by(k - 1, cmp);
            candidates.truncate(k);
        }
        candidates.sort_unstable_by(cmp);
        candidates
    }

    /// Compute the `k` nearest neighbors of every point, in parallel.
    pub fn nearest_batch(&self, k: usize) -> Vec<Vec<(u32, f64)>> {
        (0..self.points.len())
            .into_par_iter()
            .map(|i| self.nearest(i, k))
            .collect()
    }
}
