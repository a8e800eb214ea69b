//! Shared handle for swapping in rebuilt stores under concurrent readers.
//!
//! Once built, a [`GraphStore`] is an immutable snapshot: any number of
//! searches may run against it with no locking. A rebuild (new points or a
//! new `k`) constructs a fresh store offline and [`GraphHandle::install`]s
//! it; readers that grabbed the previous snapshot keep using it untouched.
//! The lock is held only long enough to clone or replace the `Arc`.

use crate::graph::store::GraphStore;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe handle to the current graph snapshot.
///
/// Cloning a `GraphHandle` produces a new handle to the same shared slot.
#[derive(Debug, Clone)]
pub struct GraphHandle {
    slot: Arc<RwLock<Arc<GraphStore>>>,
}

impl GraphHandle {
    /// Wrap a freshly built store in a shared handle.
    pub fn new(store: GraphStore) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    /// Grab the current snapshot. The returned `Arc` stays valid (and
    /// unchanged) across any subsequent `install`, so long-running searches
    /// never observe a partially rebuilt store.
    pub fn snapshot(&self) -> Arc<GraphStore> {
        Arc::clone(&self.slot.read())
    }

    /// Atomically replace the current snapshot with a rebuilt store.
    pub fn install(&self, store: GraphStore) {
        let next = Arc::new(store);
        *self.slot.write() = next;
    }
}
