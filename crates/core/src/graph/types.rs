//! Node and edge types of the proximity graph.

use serde::{Deserialize, Serialize};

/// A fixed-dimension feature point. Immutable once inside a store; destroyed
/// only by a full rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularPoint {
    /// Caller-supplied id, unique within a store (e.g. `node_42`).
    pub id: String,
    /// Feature vector of the store's dimension D.
    pub features: Vec<f64>,
}

/// A weighted range query (e.g. an advertisement) attached to the backbone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    /// Caller-supplied id, unique within a store (e.g. `ads_7`).
    pub id: String,
    /// Feature vector of the store's dimension D.
    pub features: Vec<f64>,
    /// Per-dimension non-negative weights for this query's metric.
    pub weights: Vec<f64>,
    /// The radius used when this query's edges were attached. Retained
    /// because hybrid search routing compares later radii against it.
    pub build_radius: f64,
}

/// Which kind of undirected edge connects two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// KNN backbone edge between two regular points; weight is the plain
    /// Euclidean distance.
    NodeNode,
    /// Attachment edge between a query point and a regular point whose
    /// weighted distance under the query's weights was ≤ its build radius.
    QueryNode,
}

/// One adjacency entry: the far endpoint, the edge weight (the distance that
/// created the edge at build time — never recomputed during search), and the
/// edge kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub node: u32,
    pub weight: f64,
    pub kind: EdgeKind,
}
