//! # adgraph-core
//!
//! Weighted proximity graph engine: a KNN backbone over fixed-dimension
//! feature points, per-query weighted edges, and a multi-strategy radius
//! search that trades completeness against latency.
//!
//! This is the core library crate with zero async dependencies — ingestion,
//! CLI, and any serving layer live in separate crates and talk to it through
//! plain in-memory types.

/// Global configuration constants: tuning parameters and limits.
pub mod config;
/// Typed errors shared by build and search.
pub mod error;
/// The proximity graph: types, store, construction, snapshot handle.
pub mod graph;
/// Weighted Euclidean distance.
pub mod metric;
/// Correctness scoring against the exact reference strategy.
pub mod oracle;
/// The four search strategies and the hybrid selector.
pub mod search;
/// Exact nearest-neighbor index used during backbone construction.
pub mod spatial;
/// Disk persistence of built stores.
pub mod storage;
