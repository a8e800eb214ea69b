//! Graph-guided best-first radius search.

use crate::config::CANCEL_CHECK_INTERVAL;
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphStore;
use crate::metric::weighted_distance_unchecked;
use crate::search::visited::with_visited;
use crate::search::CancelToken;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A frontier entry keyed by direct weighted distance from the start.
/// `BinaryHeap` is a max-heap; the reversed comparison makes it pop the
/// closest node first. Distances are finite by construction.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    distance: f64,
    node: u32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Same reachable set and completeness profile as the breadth-first
/// strategy, but nodes are expanded in ascending order of their direct
/// weighted distance from the start (not edge weight or path length), so
/// the closest matches are discovered earliest. Expansion is unconditional;
/// only regular points are scored.
pub(super) fn traverse(
    store: &GraphStore,
    start: u32,
    weights: &[f64],
    radius_x: f64,
    cancel: &CancelToken,
) -> GraphResult<Vec<(u32, f64)>> {
    let origin = store.features(start);
    with_visited(store.arena_len(), |visited| {
        let mut heap = BinaryHeap::new();
        let mut found = Vec::new();
        visited.insert(start);
        heap.push(Candidate {
            distance: 0.0,
            node: start,
        });

        let mut expanded = 0usize;
        while let Some(Candidate { distance, node }) = heap.pop() {
            if expanded % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(GraphError::Cancelled);
            }
            expanded += 1;

            if store.is_regular(node) && distance <= radius_x {
                found.push((node, distance));
            }
            for n in store.neighbors(node) {
                if visited.insert(n.node) {
                    let d = weighted_distance_unchecked(origin, store.features(n.node), weights);
                    heap.push(Candidate {
                        distance: d,
                        node: n.node,
                    });
                }
            }
        }
        Ok(found)
    })
}
