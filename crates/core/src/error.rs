//! Error types for graph construction and search.
//!
//! All failures in this crate are "bad input" or "not found" — there is no
//! transient/retryable class. Errors are surfaced at the call that triggered
//! them and never silently recovered.

use thiserror::Error;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Error type for all graph build and search operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A feature or weight vector does not match the store's dimension.
    /// Indicates malformed input data; never expected in correctly-built stores.
    #[error("dimension mismatch: expected {expected} components, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Malformed build or search parameters (negative radius, negative weight,
    /// duplicate id, ...). Fatal at the call site, never retried.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested start node does not exist in the store. Per-request
    /// fatal; concurrent searches and the store itself are unaffected.
    #[error("node not found: '{0}'")]
    NodeNotFound(String),

    /// The caller's cancellation token was triggered mid-search.
    #[error("search cancelled")]
    Cancelled,
}
