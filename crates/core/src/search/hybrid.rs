//! Automatic strategy selection.
//!
//! Routing is a performance heuristic, not a correctness guarantee: the
//! thresholds were tuned against observed behavior ([`crate::config`]) and
//! the routed strategy keeps its own completeness profile.

use crate::config::{HYBRID_LOCAL_RATIO, HYBRID_MODERATE_RATIO, SMALL_GRAPH_NODE_THRESHOLD};
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphStore;
use crate::search::Strategy;

/// Pick the concrete strategy a hybrid search will run. Never returns
/// [`Strategy::Hybrid`].
///
/// For a query start the decision is the ratio `radius_x / build_radius`:
/// well inside the built neighborhood (≤ 0.8) the priority traversal is
/// cheapest, the moderate zone (≤ 1.5) uses breadth-first, and beyond that
/// the graph topology can no longer be trusted to cover the radius, so the
/// exhaustive scan runs. A regular start has no build radius; it routes on
/// total node count instead.
pub(super) fn select(store: &GraphStore, start: u32, radius_x: f64) -> Strategy {
    let routed = match store.query_point(start) {
        Some(q) => {
            // A zero build radius yields a NaN or infinite ratio; both fall
            // through to the exhaustive scan.
            let ratio = radius_x / q.build_radius;
            if ratio <= HYBRID_LOCAL_RATIO {
                Strategy::Priority
            } else if ratio <= HYBRID_MODERATE_RATIO {
                Strategy::Bfs
            } else {
                Strategy::Naive
            }
        }
        None => {
            if store.node_count() < SMALL_GRAPH_NODE_THRESHOLD {
                Strategy::Naive
            } else {
                Strategy::Bfs
            }
        }
    };
    tracing::debug!(start = store.node_id(start), %routed, "hybrid routing");
    routed
}

/// Resolve `start_id` and report which concrete strategy a hybrid search
/// would run for it at `radius_x`. Exposed for callers that want to log or
/// test the routing decision without executing the search.
pub fn select_strategy(
    store: &GraphStore,
    start_id: &str,
    radius_x: f64,
) -> GraphResult<Strategy> {
    let start = store
        .resolve(start_id)
        .ok_or_else(|| GraphError::NodeNotFound(start_id.to_string()))?;
    Ok(select(store, start, radius_x))
}
