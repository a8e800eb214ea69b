//! Global configuration constants for adgraph.
//!
//! Tuning parameters and input validation limits are defined here. These are
//! compile-time constants; runtime configuration is handled via CLI arguments
//! in the `adgraph` binary.

/// Default number of nearest neighbors per regular point in the KNN backbone.
///
/// Higher values improve graph connectivity (and therefore the recall of the
/// graph-guided strategies) at the cost of memory and build time.
pub const DEFAULT_K: usize = 10;

/// Hybrid routing: upper bound on `radius_x / build_radius` for the
/// priority-queue strategy (search stays well inside the built neighborhood).
pub const HYBRID_LOCAL_RATIO: f64 = 0.8;

/// Hybrid routing: upper bound on `radius_x / build_radius` for the
/// breadth-first strategy. Above this ratio the graph topology can no longer
/// be trusted to cover the requested radius and the exhaustive scan is used.
pub const HYBRID_MODERATE_RATIO: f64 = 1.5;

/// Hybrid routing for regular start points (which carry no build radius):
/// below this total node count the exhaustive scan is cheap enough to be the
/// default; at or above it the breadth-first strategy is used.
pub const SMALL_GRAPH_NODE_THRESHOLD: usize = 1000;

/// How many scored/expanded nodes a strategy processes between checks of the
/// caller's cancellation token.
pub const CANCEL_CHECK_INTERVAL: usize = 1024;

/// Maximum allowed feature dimension.
pub const MAX_DIMENSION: usize = 4096;
