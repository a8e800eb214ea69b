//! The weighted proximity graph: node/edge types, the store, construction,
//! and the shared snapshot handle.

/// Graph construction: KNN backbone build and query attach/detach.
mod build;
/// Shared snapshot handle with atomic swap on rebuild.
pub mod handle;
/// The graph store and its invariant checks.
pub mod store;
/// Node and edge data types.
pub mod types;

pub use handle::GraphHandle;
pub use store::GraphStore;
pub use types::{EdgeKind, Neighbor, QueryPoint, RegularPoint};
