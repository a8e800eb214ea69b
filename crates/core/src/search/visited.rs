//! Generation-based visited set for graph traversal.
//!
//! Replaces `HashSet<u32>` with O(1) array indexing. Each `clear()`
//! increments a generation counter instead of zeroing the array, and a
//! thread-local instance is reused across searches on the same thread so
//! repeated traversals allocate nothing.

use std::cell::RefCell;

thread_local! {
    /// Per-thread scratch set shared by the BFS and priority traversals.
    static TRAVERSAL_VISITED: RefCell<VisitedSet> = RefCell::new(VisitedSet::new(0));
}

/// Run `f` with this thread's visited set, cleared and sized for `capacity`
/// node slots.
pub(super) fn with_visited<R>(capacity: usize, f: impl FnOnce(&mut VisitedSet) -> R) -> R {
    TRAVERSAL_VISITED.with(|cell| {
        let mut visited = cell.borrow_mut();
        visited.ensure_capacity(capacity);
        visited.clear();
        f(&mut visited)
    })
}

/// Generation-counted membership array. `insert()` compares a slot against
/// the current generation; a u16 generation keeps the full memset down to
/// one in every 65534 clears.
#[derive(Debug)]
pub(super) struct VisitedSet {
    data: Vec<u16>,
    generation: u16,
}

impl VisitedSet {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u16; capacity],
            generation: 1,
        }
    }

    /// Reset the set. O(1) amortized.
    pub(super) fn clear(&mut self) {
        if self.generation == u16::MAX {
            self.data.fill(0);
            self.generation = 1;
        } else {
            self.generation += 1;
        }
    }

    /// Grow to cover at least `cap` slots.
    pub(super) fn ensure_capacity(&mut self, cap: usize) {
        if cap > self.data.len() {
            self.data.resize(cap, 0);
        }
    }

    /// Mark `id` as visited. Returns `true` if it was newly inserted.
    #[inline]
    pub(super) fn insert(&mut self, id: u32) -> bool {
        let idx = id as usize;
        if self.data[idx] == self.generation {
            false
        } else {
            self.data[idx] = self.generation;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_clear() {
        let mut set = VisitedSet::new(4);
        assert!(set.insert(2));
        assert!(!set.insert(2));
        set.clear();
        assert!(set.insert(2));
    }

    #[test]
    fn test_generation_wraparound() {
        let mut set = VisitedSet::new(2);
        set.generation = u16::MAX;
        assert!(set.insert(0));
        set.clear();
        assert_eq!(set.generation, 1);
        assert!(set.insert(0));
    }

    #[test]
    fn test_ensure_capacity_preserves_marks() {
        let mut set = VisitedSet::new(1);
        assert!(set.insert(0));
        set.ensure_capacity(8);
        assert!(!set.insert(0));
        assert!(set.insert(7));
    }

    #[test]
    fn test_with_visited_reuses_cleared_set() {
        let first = with_visited(4, |v| v.insert(1));
        let second = with_visited(4, |v| v.insert(1));
        assert!(first);
        assert!(second, "set must be cleared between uses");
    }
}
