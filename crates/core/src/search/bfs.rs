//! Graph-guided breadth-first radius search.

use crate::config::CANCEL_CHECK_INTERVAL;
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphStore;
use crate::metric::weighted_distance_unchecked;
use crate::search::visited::with_visited;
use crate::search::CancelToken;
use std::collections::VecDeque;

/// Breadth-first traversal over the edge set, ignoring edge weights for
/// ordering. Every reachable node — regular or query — is expanded exactly
/// once, and expansion is unconditional: a regular point outside `radius_x`
/// is still traversed through. Only regular points are scored, by their
/// direct weighted distance from the start under the live weights.
///
/// Completeness is bounded by reachability: points with no edge path from
/// the start are never found, which systematically under-reports once
/// `radius_x` outgrows the radii the reachable edges were built with. That
/// trade-off is intentional (latency over completeness).
pub(super) fn traverse(
    store: &GraphStore,
    start: u32,
    weights: &[f64],
    radius_x: f64,
    cancel: &CancelToken,
) -> GraphResult<Vec<(u32, f64)>> {
    let origin = store.features(start);
    with_visited(store.arena_len(), |visited| {
        let mut queue = VecDeque::new();
        let mut found = Vec::new();
        visited.insert(start);
        queue.push_back(start);

        let mut expanded = 0usize;
        while let Some(current) = queue.pop_front() {
            if expanded % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(GraphError::Cancelled);
            }
            expanded += 1;

            if store.is_regular(current) {
                let d = weighted_distance_unchecked(origin, store.features(current), weights);
                if d <= radius_x {
                    found.push((current, d));
                }
            }
            for n in store.neighbors(current) {
                if visited.insert(n.node) {
                    queue.push_back(n.node);
                }
            }
        }
        Ok(found)
    })
}
