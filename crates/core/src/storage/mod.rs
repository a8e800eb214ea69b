//! Storage layer: disk persistence of built graph stores.
//!
//! A built [`crate::graph::GraphStore`] can be snapshotted to disk and
//! reloaded later; loading re-checks every store invariant before handing
//! the store back.

/// Snapshot save/load with atomic writes and CRC32 integrity checks.
pub mod persistence;

pub use persistence::{load_store, save_store};
