//! Graph construction: the KNN backbone and weighted query attachment.
//!
//! Build is the only phase that mutates a store, and it is exclusive: the
//! store is write-once while `build` / `attach_*` run, with no concurrent
//! readers until they return. Both phases fan out across cores with rayon —
//! per point for the backbone, per query for attachment (the O(N) scan per
//! query dominates construction cost and is embarrassingly parallel).

use crate::config;
use crate::error::{GraphError, GraphResult};
use crate::graph::store::GraphStore;
use crate::graph::types::{EdgeKind, Neighbor, QueryPoint, RegularPoint};
use crate::metric::weighted_distance_unchecked;
use crate::spatial::FlatIndex;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

impl GraphStore {
    /// Build the KNN backbone over `points`.
    ///
    /// Each point selects its `k` nearest neighbors by plain Euclidean
    /// distance (ties broken by ascending id) and a symmetric `NodeNode`
    /// edge is inserted for every selection, deduplicating mutual picks.
    /// `k` is clamped to `n - 1` when the point set is smaller than `k + 1`.
    pub fn build(points: Vec<RegularPoint>, k: usize) -> GraphResult<Self> {
        if points.len() >= u32::MAX as usize {
            return Err(GraphError::InvalidConfiguration(format!(
                "point set of {} exceeds the addressable node limit",
                points.len()
            )));
        }
        let dimension = points.first().map(|p| p.features.len()).unwrap_or(0);
        if dimension > config::MAX_DIMENSION {
            return Err(GraphError::InvalidConfiguration(format!(
                "dimension {} exceeds the maximum of {}",
                dimension,
                config::MAX_DIMENSION
            )));
        }

        let mut id_to_node = HashMap::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            if p.features.len() != dimension {
                return Err(GraphError::DimensionMismatch {
                    expected: dimension,
                    actual: p.features.len(),
                });
            }
            if id_to_node.insert(p.id.clone(), i as u32).is_some() {
                return Err(GraphError::InvalidConfiguration(format!(
                    "duplicate point id '{}'",
                    p.id
                )));
            }
        }

        let n = points.len();
        let k_eff = k.min(n.saturating_sub(1));

        let knn = FlatIndex::new(&points).nearest_batch(k_eff);

        let mut adjacency: Vec<Vec<Neighbor>> = vec![Vec::new(); n];
        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut edge_count = 0usize;
        for (i, selections) in knn.iter().enumerate() {
            let i = i as u32;
            for &(j, dist) in selections {
                let key = if i < j { (i, j) } else { (j, i) };
                if seen.insert(key) {
                    adjacency[i as usize].push(Neighbor {
                        node: j,
                        weight: dist,
                        kind: EdgeKind::NodeNode,
                    });
                    adjacency[j as usize].push(Neighbor {
                        node: i,
                        weight: dist,
                        kind: EdgeKind::NodeNode,
                    });
                    edge_count += 1;
                }
            }
        }

        tracing::info!(points = n, k = k_eff, edges = edge_count, "KNN backbone built");

        Ok(Self {
            dimension,
            k: k_eff,
            regular: points,
            queries: Vec::new(),
            detached: Vec::new(),
            adjacency,
            id_to_node,
            edge_count,
        })
    }

    /// Attach one query: scan every regular point and add a `QueryNode` edge
    /// wherever the weighted distance under the query's weights is ≤ the
    /// query's build radius. Returns the number of edges attached.
    pub fn attach_query(&mut self, query: QueryPoint) -> GraphResult<usize> {
        self.validate_query(&query)?;
        let edges = self.compute_query_edges(&query);
        tracing::debug!(query = %query.id, edges = edges.len(), "query attached");
        Ok(self.insert_query(query, edges))
    }

    /// Attach a batch of queries, computing their edge lists in parallel
    /// (read-only over the point set) before inserting them sequentially.
    /// Returns the total number of edges attached.
    pub fn attach_queries(&mut self, queries: Vec<QueryPoint>) -> GraphResult<usize> {
        let mut batch_ids = HashSet::new();
        for q in &queries {
            self.validate_query(q)?;
            if !batch_ids.insert(q.id.as_str()) {
                return Err(GraphError::InvalidConfiguration(format!(
                    "duplicate query id '{}' in batch",
                    q.id
                )));
            }
        }

        let edge_lists: Vec<Vec<(u32, f64)>> = queries
            .par_iter()
            .map(|q| self.compute_query_edges(q))
            .collect();

        let count = queries.len();
        let mut total = 0usize;
        for (query, edges) in queries.into_iter().zip(edge_lists) {
            total += self.insert_query(query, edges);
        }
        tracing::info!(queries = count, edges = total, "query batch attached");
        Ok(total)
    }

    /// Detach a query point: its edges are removed and its id stops
    /// resolving, but the id is never reused within this store instance.
    /// Regular points cannot be detached (full rebuild only).
    pub fn detach_query(&mut self, id: &str) -> GraphResult<()> {
        let node = self
            .resolve(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        if self.is_regular(node) {
            return Err(GraphError::InvalidConfiguration(format!(
                "'{}' is a regular point; regular points are removed only by a full rebuild",
                id
            )));
        }
        let idx = node as usize - self.regular.len();
        let list = std::mem::take(&mut self.adjacency[node as usize]);
        for n in &list {
            self.adjacency[n.node as usize].retain(|r| r.node != node);
        }
        self.edge_count -= list.len();
        self.detached[idx] = true;
        self.id_to_node.remove(id);
        tracing::debug!(query = id, removed_edges = list.len(), "query detached");
        Ok(())
    }

    fn validate_query(&self, query: &QueryPoint) -> GraphResult<()> {
        if query.features.len() != self.dimension {
            return Err(GraphError::DimensionMismatch {
                expected: self.dimension,
                actual: query.features.len(),
            });
        }
        if query.weights.len() != self.dimension {
            return Err(GraphError::DimensionMismatch {
                expected: self.dimension,
                actual: query.weights.len(),
            });
        }
        if query.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(GraphError::InvalidConfiguration(format!(
                "query '{}' has a negative or non-finite weight",
                query.id
            )));
        }
        if !query.build_radius.is_finite() || query.build_radius < 0.0 {
            return Err(GraphError::InvalidConfiguration(format!(
                "query '{}' has invalid build radius {}",
                query.id, query.build_radius
            )));
        }
        if self.id_ever_used(&query.id) {
            return Err(GraphError::InvalidConfiguration(format!(
                "id '{}' was already used in this store",
                query.id
            )));
        }
        if self.arena_len() >= u32::MAX as usize {
            return Err(GraphError::InvalidConfiguration(
                "store reached the addressable node limit".to_string(),
            ));
        }
        Ok(())
    }

    /// The O(N) weighted scan for one query, parallel over the point set.
    fn compute_query_edges(&self, query: &QueryPoint) -> Vec<(u32, f64)> {
        self.regular
            .par_iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let d = weighted_distance_unchecked(&query.features, &p.features, &query.weights);
                (d <= query.build_radius).then_some((i as u32, d))
            })
            .collect()
    }

    fn insert_query(&mut self, query: QueryPoint, edges: Vec<(u32, f64)>) -> usize {
        let node = self.arena_len() as u32;
        self.id_to_node.insert(query.id.clone(), node);
        self.queries.push(query);
        self.detached.push(false);

        let mut list = Vec::with_capacity(edges.len());
        for &(point, dist) in &edges {
            list.push(Neighbor {
                node: point,
                weight: dist,
                kind: EdgeKind::QueryNode,
            });
            self.adjacency[point as usize].push(Neighbor {
                node,
                weight: dist,
                kind: EdgeKind::QueryNode,
            });
        }
        self.adjacency.push(list);
        self.edge_count += edges.len();
        edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::weighted_distance;

    fn point(id: &str, features: &[f64]) -> RegularPoint {
        RegularPoint {
            id: id.to_string(),
            features: features.to_vec(),
        }
    }

    fn query(id: &str, features: &[f64], weights: &[f64], radius: f64) -> QueryPoint {
        QueryPoint {
            id: id.to_string(),
            features: features.to_vec(),
            weights: weights.to_vec(),
            build_radius: radius,
        }
    }

    fn square_points() -> Vec<RegularPoint> {
        vec![
            point("node_1", &[0.0, 0.0]),
            point("node_2", &[1.0, 0.0]),
            point("node_3", &[0.0, 1.0]),
            point("node_4", &[10.0, 10.0]),
        ]
    }

    // ── KNN backbone ───────────────────────────────────────────────────

    #[test]
    fn test_build_edges_are_symmetric() {
        let store = GraphStore::build(square_points(), 2).unwrap();
        for node in 0..store.regular_count() as u32 {
            for n in store.neighbors(node) {
                assert!(
                    store.neighbors(n.node).iter().any(|r| r.node == node),
                    "edge ({node}, {}) missing its reverse",
                    n.node
                );
            }
        }
        assert!(store.validate().is_ok());
    }

    #[test]
    fn test_build_clamps_k_to_point_count() {
        // 3 points, k=10 -> complete graph on 3 nodes.
        let store = GraphStore::build(square_points()[..3].to_vec(), 10).unwrap();
        assert_eq!(store.k(), 2);
        assert_eq!(store.edge_count(), 3);
        for node in 0..3u32 {
            assert_eq!(store.neighbors(node).len(), 2);
        }
    }

    #[test]
    fn test_build_complete_graph_degree_equals_k() {
        // With k = n - 1 every selection is mutual, so degree == k exactly.
        let store = GraphStore::build(square_points(), 3).unwrap();
        for node in 0..store.regular_count() as u32 {
            assert_eq!(store.neighbors(node).len(), 3);
        }
        assert_eq!(store.edge_count(), 6);
    }

    #[test]
    fn test_build_degree_at_least_k() {
        // Asymmetric selections can push a hub's degree past k, but every
        // point keeps at least its own k selections.
        let points = vec![
            point("node_1", &[0.0]),
            point("node_2", &[1.0]),
            point("node_3", &[2.5]),
            point("node_4", &[10.0]),
            point("node_5", &[11.0]),
        ];
        let store = GraphStore::build(points, 2).unwrap();
        for node in 0..store.regular_count() as u32 {
            assert!(
                store.neighbors(node).len() >= 2,
                "node {node} has degree {} < k",
                store.neighbors(node).len()
            );
        }
    }

    #[test]
    fn test_build_mutual_selection_single_edge() {
        let points = vec![point("node_1", &[0.0]), point("node_2", &[1.0])];
        let store = GraphStore::build(points, 1).unwrap();
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.neighbors(0).len(), 1);
        assert_eq!(store.neighbors(1).len(), 1);
    }

    #[test]
    fn test_build_edge_weight_is_euclidean() {
        let points = vec![point("node_1", &[0.0, 0.0]), point("node_2", &[3.0, 4.0])];
        let store = GraphStore::build(points, 1).unwrap();
        assert!((store.neighbors(0)[0].weight - 5.0).abs() < 1e-12);
        assert_eq!(store.neighbors(0)[0].kind, EdgeKind::NodeNode);
    }

    #[test]
    fn test_build_rejects_duplicate_ids() {
        let points = vec![point("node_1", &[0.0]), point("node_1", &[1.0])];
        let err = GraphStore::build(points, 1).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_build_rejects_dimension_mismatch() {
        let points = vec![point("node_1", &[0.0, 0.0]), point("node_2", &[1.0])];
        let err = GraphStore::build(points, 1).unwrap_err();
        assert_eq!(
            err,
            GraphError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_build_empty_point_set() {
        let store = GraphStore::build(Vec::new(), 5).unwrap();
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert!(store.validate().is_ok());
    }

    // ── Query attachment ───────────────────────────────────────────────

    #[test]
    fn test_attach_edges_exactly_within_radius() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let q = query("ads_1", &[0.0, 0.0], &[1.0, 1.0], 1.0);
        let attached = store.attach_query(q).unwrap();
        // node_1 (d=0), node_2 (d=1), node_3 (d=1); node_4 is far outside.
        assert_eq!(attached, 3);

        let qref = store.resolve("ads_1").unwrap();
        let mut linked: Vec<&str> = store
            .neighbors(qref)
            .iter()
            .map(|n| store.node_id(n.node))
            .collect();
        linked.sort_unstable();
        assert_eq!(linked, vec!["node_1", "node_2", "node_3"]);
        for n in store.neighbors(qref) {
            assert_eq!(n.kind, EdgeKind::QueryNode);
            assert!(n.weight <= 1.0);
        }
        assert!(store.validate().is_ok());
    }

    #[test]
    fn test_attach_boundary_distance_included() {
        // Distance exactly equal to the build radius attaches.
        let mut store = GraphStore::build(
            vec![point("node_1", &[0.0]), point("node_2", &[2.0])],
            1,
        )
        .unwrap();
        let attached = store
            .attach_query(query("ads_1", &[0.0], &[1.0], 2.0))
            .unwrap();
        assert_eq!(attached, 2);
    }

    #[test]
    fn test_attach_respects_weights() {
        // Weight 0 on the second axis collapses node_3 onto the query.
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let attached = store
            .attach_query(query("ads_1", &[0.0, 0.0], &[1.0, 0.0], 0.5))
            .unwrap();
        // node_1 at d=0, node_3 at d=0 (second axis ignored); node_2 at d=1.
        assert_eq!(attached, 2);
    }

    #[test]
    fn test_attach_edge_weight_is_weighted_distance() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let w = vec![4.0, 1.0];
        store
            .attach_query(query("ads_1", &[0.0, 0.0], &w, 3.0))
            .unwrap();
        let qref = store.resolve("ads_1").unwrap();
        for n in store.neighbors(qref) {
            let expected =
                weighted_distance(&[0.0, 0.0], store.features(n.node), &w).unwrap();
            assert_eq!(n.weight, expected);
        }
    }

    #[test]
    fn test_attach_zero_radius() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let attached = store
            .attach_query(query("ads_1", &[0.0, 0.0], &[1.0, 1.0], 0.0))
            .unwrap();
        // Only node_1 sits at distance exactly 0.
        assert_eq!(attached, 1);
    }

    #[test]
    fn test_attach_rejects_negative_radius() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let err = store
            .attach_query(query("ads_1", &[0.0, 0.0], &[1.0, 1.0], -1.0))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_attach_rejects_negative_weight() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let err = store
            .attach_query(query("ads_1", &[0.0, 0.0], &[1.0, -1.0], 1.0))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_attach_rejects_wrong_dimension() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let err = store
            .attach_query(query("ads_1", &[0.0], &[1.0], 1.0))
            .unwrap_err();
        assert!(matches!(err, GraphError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_attach_rejects_reused_id() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let err = store
            .attach_query(query("node_1", &[0.0, 0.0], &[1.0, 1.0], 1.0))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration(_)));

        store
            .attach_query(query("ads_1", &[0.0, 0.0], &[1.0, 1.0], 1.0))
            .unwrap();
        let err = store
            .attach_query(query("ads_1", &[0.0, 0.0], &[1.0, 1.0], 1.0))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_attach_queries_batch_matches_single() {
        let queries = vec![
            query("ads_1", &[0.0, 0.0], &[1.0, 1.0], 1.0),
            query("ads_2", &[10.0, 10.0], &[1.0, 1.0], 2.0),
        ];

        let mut batch = GraphStore::build(square_points(), 2).unwrap();
        batch.attach_queries(queries.clone()).unwrap();

        let mut single = GraphStore::build(square_points(), 2).unwrap();
        for q in queries {
            single.attach_query(q).unwrap();
        }

        assert_eq!(batch.edge_count(), single.edge_count());
        for id in ["ads_1", "ads_2"] {
            let b = batch.resolve(id).unwrap();
            let s = single.resolve(id).unwrap();
            assert_eq!(batch.neighbors(b), single.neighbors(s));
        }
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_attach_queries_rejects_batch_duplicate() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let err = store
            .attach_queries(vec![
                query("ads_1", &[0.0, 0.0], &[1.0, 1.0], 1.0),
                query("ads_1", &[1.0, 0.0], &[1.0, 1.0], 1.0),
            ])
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration(_)));
        assert_eq!(store.query_count(), 0);
    }

    // ── Query detachment ───────────────────────────────────────────────

    #[test]
    fn test_detach_query_removes_edges_and_id() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        store
            .attach_query(query("ads_1", &[0.0, 0.0], &[1.0, 1.0], 1.0))
            .unwrap();
        let edges_before = store.edge_count();

        store.detach_query("ads_1").unwrap();
        assert!(store.resolve("ads_1").is_none());
        assert_eq!(store.query_count(), 0);
        assert_eq!(store.edge_count(), edges_before - 3);
        assert!(store.validate().is_ok());

        // The id is retired for the lifetime of this store instance.
        let err = store
            .attach_query(query("ads_1", &[0.0, 0.0], &[1.0, 1.0], 1.0))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_detach_unknown_query() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let err = store.detach_query("ads_9").unwrap_err();
        assert_eq!(err, GraphError::NodeNotFound("ads_9".to_string()));
    }

    #[test]
    fn test_detach_regular_point_rejected() {
        let mut store = GraphStore::build(square_points(), 2).unwrap();
        let err = store.detach_query("node_1").unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration(_)));
    }
}
