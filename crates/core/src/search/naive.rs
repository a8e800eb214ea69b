//! Exhaustive O(N) radius scan — the only exact strategy.

use crate::config::CANCEL_CHECK_INTERVAL;
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphStore;
use crate::metric::weighted_distance_unchecked;
use crate::search::CancelToken;

/// Score every regular point against the start's features under the live
/// weights and keep those within `radius_x`. Ignores the edge set entirely,
/// so the result is exact regardless of how the graph was built; this is the
/// reference the correctness oracle compares other strategies against.
pub(super) fn scan(
    store: &GraphStore,
    start: u32,
    weights: &[f64],
    radius_x: f64,
    cancel: &CancelToken,
) -> GraphResult<Vec<(u32, f64)>> {
    let origin = store.features(start);
    let mut found = Vec::new();
    for (i, point) in store.regular_points().iter().enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(GraphError::Cancelled);
        }
        let d = weighted_distance_unchecked(origin, &point.features, weights);
        if d <= radius_x {
            found.push((i as u32, d));
        }
    }
    Ok(found)
}
