//! Cooperative cancellation for long-running searches.
//!
//! The engine performs no I/O, so timeouts belong to the caller: wrap a
//! search in a [`CancelToken`] and trigger it from another thread. Strategies
//! check the token periodically (every [`crate::config::CANCEL_CHECK_INTERVAL`]
//! processed nodes) so very large radii and graphs remain interruptible.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Cloning produces another handle to the same
/// flag, so the caller keeps one clone and hands another to the search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not been triggered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation. The running search returns
    /// [`crate::error::GraphError::Cancelled`] at its next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn test_cancel_visible_through_clone() {
        let token = CancelToken::new();
        let other = token.clone();
        token.cancel();
        assert!(other.is_cancelled());
    }
}
