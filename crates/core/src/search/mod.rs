//! Multi-strategy radius search over an immutable graph snapshot.
//!
//! All strategies share one contract: given a start node (regular or query),
//! a live weight vector, and a radius, return the regular points within that
//! weighted radius, sorted ascending by (distance, id). Only [`Strategy::Naive`]
//! is exact; the graph-guided strategies trade completeness for latency and
//! the hybrid selector routes between them. Searches are stateless and never
//! mutate the store, so any number may run concurrently against one snapshot.

mod bfs;
/// Cooperative cancellation token.
pub mod cancel;
mod hybrid;
mod naive;
mod priority;
mod visited;

pub use cancel::CancelToken;
pub use hybrid::select_strategy;

use crate::error::{GraphError, GraphResult};
use crate::graph::GraphStore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The search strategies, matched exhaustively everywhere — there is no
/// string dispatch inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Exhaustive O(N) scan; exact.
    Naive,
    /// Breadth-first over the edge set; approximate.
    Bfs,
    /// Best-first by direct distance; approximate, same reach as Bfs.
    Priority,
    /// Auto-selects one of the above per request.
    Hybrid,
}

impl Strategy {
    /// All strategies, in evaluation order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Naive,
        Strategy::Bfs,
        Strategy::Priority,
        Strategy::Hybrid,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Naive => "naive",
            Strategy::Bfs => "bfs",
            Strategy::Priority => "priority",
            Strategy::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

impl FromStr for Strategy {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(Strategy::Naive),
            "bfs" => Ok(Strategy::Bfs),
            "priority" => Ok(Strategy::Priority),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(GraphError::InvalidConfiguration(format!(
                "unknown strategy '{other}' (expected naive, bfs, priority or hybrid)"
            ))),
        }
    }
}

/// One search result: a regular point and its weighted distance from the
/// start under the weights the search ran with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub id: String,
    pub distance: f64,
}

/// Run a radius search. See [`search_with_cancel`]; this variant runs with a
/// token that is never triggered.
pub fn search(
    store: &GraphStore,
    start_id: &str,
    weights: &[f64],
    radius_x: f64,
    strategy: Strategy,
) -> GraphResult<Vec<SearchMatch>> {
    search_with_cancel(store, start_id, weights, radius_x, strategy, &CancelToken::new())
}

/// Run a radius search with cooperative cancellation.
///
/// `start_id` may name a regular point or an attached query. `weights` may
/// differ from the weights the store was built with — edges only dictate
/// reachability, scoring always uses the live weights. Results contain
/// regular points only, sorted ascending by (distance, id).
pub fn search_with_cancel(
    store: &GraphStore,
    start_id: &str,
    weights: &[f64],
    radius_x: f64,
    strategy: Strategy,
    cancel: &CancelToken,
) -> GraphResult<Vec<SearchMatch>> {
    let start = store
        .resolve(start_id)
        .ok_or_else(|| GraphError::NodeNotFound(start_id.to_string()))?;
    if weights.len() != store.dimension() {
        return Err(GraphError::DimensionMismatch {
            expected: store.dimension(),
            actual: weights.len(),
        });
    }
    if !radius_x.is_finite() || radius_x < 0.0 {
        return Err(GraphError::InvalidConfiguration(format!(
            "search radius must be finite and >= 0, got {radius_x}"
        )));
    }

    let routed = match strategy {
        Strategy::Hybrid => hybrid::select(store, start, radius_x),
        concrete => concrete,
    };
    let mut found = match routed {
        Strategy::Naive => naive::scan(store, start, weights, radius_x, cancel)?,
        Strategy::Bfs => bfs::traverse(store, start, weights, radius_x, cancel)?,
        Strategy::Priority => priority::traverse(store, start, weights, radius_x, cancel)?,
        // select() always routes to a concrete strategy.
        Strategy::Hybrid => unreachable!("hybrid routing yielded hybrid"),
    };

    found.sort_unstable_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| store.node_id(a.0).cmp(store.node_id(b.0)))
    });
    Ok(found
        .into_iter()
        .map(|(node, distance)| SearchMatch {
            id: store.node_id(node).to_string(),
            distance,
        })
        .collect())
}
