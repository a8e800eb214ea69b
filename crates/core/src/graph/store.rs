//! The graph store: node arenas, adjacency structure, and invariant checks.
//!
//! A [`GraphStore`] is built once per (point set, k) pair, then queries are
//! attached (and possibly detached) incrementally. After build it is treated
//! as an immutable snapshot: search operations take `&GraphStore` and never
//! mutate it.
//!
//! Nodes are addressed internally by `u32` refs: regular points occupy
//! `0..regular.len()`, query points follow at `regular.len()..`. External
//! string ids map to internal refs through a centralized `HashMap`. Detached
//! queries are soft-deleted: their arena slot survives (so refs never shift
//! and ids are never reused) but they leave the id map and lose their edges.

use crate::graph::types::{EdgeKind, Neighbor, QueryPoint, RegularPoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node sets and adjacency structure of the weighted proximity graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStore {
    /// Feature dimension D, fixed for every point and query in the store.
    pub(crate) dimension: usize,
    /// The k used for the KNN backbone (clamped to n-1 at build time).
    pub(crate) k: usize,
    /// Regular point arena; internal ref = index.
    pub(crate) regular: Vec<RegularPoint>,
    /// Query point arena; internal ref = `regular.len()` + index.
    pub(crate) queries: Vec<QueryPoint>,
    /// Soft-delete flags parallel to `queries`.
    pub(crate) detached: Vec<bool>,
    /// Adjacency lists indexed by internal ref, covering both arenas.
    pub(crate) adjacency: Vec<Vec<Neighbor>>,
    /// External id → internal ref, live nodes only.
    pub(crate) id_to_node: HashMap<String, u32>,
    /// Number of undirected edges.
    pub(crate) edge_count: usize,
}

impl GraphStore {
    /// Feature dimension D of every point in this store.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The (clamped) k the KNN backbone was built with.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of regular points.
    pub fn regular_count(&self) -> usize {
        self.regular.len()
    }

    /// Number of live (non-detached) query points.
    pub fn query_count(&self) -> usize {
        self.detached.iter().filter(|&&d| !d).count()
    }

    /// Live node count (regular + live queries).
    pub fn node_count(&self) -> usize {
        self.regular.len() + self.query_count()
    }

    /// Total arena slots, including detached queries. Internal refs index
    /// into this range; traversal scratch buffers size themselves by it.
    pub(crate) fn arena_len(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Resolve an external id to its internal node ref. Detached queries do
    /// not resolve.
    pub fn resolve(&self, id: &str) -> Option<u32> {
        self.id_to_node.get(id).copied()
    }

    /// Whether the internal ref addresses a regular point (vs. a query).
    #[inline]
    pub fn is_regular(&self, node: u32) -> bool {
        (node as usize) < self.regular.len()
    }

    /// External id of a node.
    pub fn node_id(&self, node: u32) -> &str {
        if self.is_regular(node) {
            &self.regular[node as usize].id
        } else {
            &self.queries[node as usize - self.regular.len()].id
        }
    }

    /// Feature vector of a node.
    #[inline]
    pub fn features(&self, node: u32) -> &[f64] {
        if self.is_regular(node) {
            &self.regular[node as usize].features
        } else {
            &self.queries[node as usize - self.regular.len()].features
        }
    }

    /// Adjacency list of a node.
    #[inline]
    pub fn neighbors(&self, node: u32) -> &[Neighbor] {
        &self.adjacency[node as usize]
    }

    /// The live query point behind an internal ref; `None` for regular
    /// points and detached queries.
    pub fn query_point(&self, node: u32) -> Option<&QueryPoint> {
        if self.is_regular(node) {
            return None;
        }
        let idx = node as usize - self.regular.len();
        if self.detached[idx] {
            None
        } else {
            Some(&self.queries[idx])
        }
    }

    /// All regular points, in internal-ref order.
    pub fn regular_points(&self) -> &[RegularPoint] {
        &self.regular
    }

    /// Live query points, in attachment order.
    pub fn query_points(&self) -> impl Iterator<Item = &QueryPoint> + '_ {
        self.queries
            .iter()
            .zip(self.detached.iter())
            .filter(|(_, &d)| !d)
            .map(|(q, _)| q)
    }

    /// Whether `id` was ever used by a node of this store, including
    /// detached queries. Ids are never reused within a store instance.
    pub(crate) fn id_ever_used(&self, id: &str) -> bool {
        self.id_to_node.contains_key(id) || self.queries.iter().any(|q| q.id == id)
    }

    /// Validate internal invariants, e.g. after deserialization.
    ///
    /// Checks arena/adjacency length consistency, id-map symmetry, dimension
    /// agreement, weight and radius sanity, adjacency bounds and undirected
    /// symmetry, edge-kind agreement with endpoint kinds, and that every
    /// query edge respects the query's build radius.
    pub fn validate(&self) -> Result<(), String> {
        let slots = self.regular.len() + self.queries.len();

        if self.adjacency.len() != slots {
            return Err(format!(
                "adjacency length {} != arena length {}",
                self.adjacency.len(),
                slots
            ));
        }
        if self.detached.len() != self.queries.len() {
            return Err(format!(
                "detached flags length {} != query count {}",
                self.detached.len(),
                self.queries.len()
            ));
        }
        if self.id_to_node.len() != self.node_count() {
            return Err(format!(
                "id map has {} entries, expected {} live nodes",
                self.id_to_node.len(),
                self.node_count()
            ));
        }

        for p in &self.regular {
            if p.features.len() != self.dimension {
                return Err(format!(
                    "point '{}' has {} features, store dimension is {}",
                    p.id,
                    p.features.len(),
                    self.dimension
                ));
            }
        }
        for (idx, q) in self.queries.iter().enumerate() {
            if q.features.len() != self.dimension {
                return Err(format!(
                    "query '{}' has {} features, store dimension is {}",
                    q.id,
                    q.features.len(),
                    self.dimension
                ));
            }
            if q.weights.len() != self.dimension {
                return Err(format!(
                    "query '{}' has {} weights, store dimension is {}",
                    q.id,
                    q.weights.len(),
                    self.dimension
                ));
            }
            if q.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(format!(
                    "query '{}' has a negative or non-finite weight",
                    q.id
                ));
            }
            if !q.build_radius.is_finite() || q.build_radius < 0.0 {
                return Err(format!(
                    "query '{}' has invalid build radius {}",
                    q.id, q.build_radius
                ));
            }
            if self.detached[idx] && !self.adjacency[self.regular.len() + idx].is_empty() {
                return Err(format!("detached query '{}' still has edges", q.id));
            }
        }

        for (id, &node) in &self.id_to_node {
            if node as usize >= slots {
                return Err(format!("id '{}' maps to out-of-bounds ref {}", id, node));
            }
            if self.node_id(node) != id {
                return Err(format!(
                    "id map asymmetry: '{}' maps to ref {} named '{}'",
                    id,
                    node,
                    self.node_id(node)
                ));
            }
        }

        let mut entries = 0usize;
        for (node, list) in self.adjacency.iter().enumerate() {
            let node = node as u32;
            entries += list.len();
            for n in list {
                if n.node as usize >= slots {
                    return Err(format!(
                        "node {} has out-of-bounds neighbor {}",
                        node, n.node
                    ));
                }
                if n.node == node {
                    return Err(format!("node {} has a self edge", node));
                }
                let expected_kind = match (self.is_regular(node), self.is_regular(n.node)) {
                    (true, true) => EdgeKind::NodeNode,
                    (false, false) => {
                        return Err(format!(
                            "edge between two query nodes {} and {}",
                            node, n.node
                        ));
                    }
                    _ => EdgeKind::QueryNode,
                };
                if n.kind != expected_kind {
                    return Err(format!(
                        "edge ({}, {}) has kind {:?}, endpoints imply {:?}",
                        node, n.node, n.kind, expected_kind
                    ));
                }
                // Undirected: the reverse entry must exist and agree.
                let reverse = self.adjacency[n.node as usize]
                    .iter()
                    .find(|r| r.node == node);
                match reverse {
                    None => {
                        return Err(format!("edge ({}, {}) has no reverse entry", node, n.node));
                    }
                    Some(r) if r.weight != n.weight || r.kind != n.kind => {
                        return Err(format!(
                            "edge ({}, {}) disagrees with its reverse entry",
                            node, n.node
                        ));
                    }
                    Some(_) => {}
                }
                if n.kind == EdgeKind::QueryNode {
                    let query_ref = if self.is_regular(node) { n.node } else { node };
                    let q = &self.queries[query_ref as usize - self.regular.len()];
                    if n.weight > q.build_radius {
                        return Err(format!(
                            "query edge ({}, {}) has weight {} beyond build radius {}",
                            node, n.node, n.weight, q.build_radius
                        ));
                    }
                }
            }
        }
        if entries != self.edge_count * 2 {
            return Err(format!(
                "adjacency holds {} entries, edge count {} implies {}",
                entries,
                self.edge_count,
                self.edge_count * 2
            ));
        }

        Ok(())
    }
}
