//! Error types for store operations.

use thiserror::Error;

/// Error type for store operations.
///
/// A store error fails the current request step; the gateway does not retry
/// and moves on to its fallback chain.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store (or the storage holding it) cannot be used right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Internal store error, state or computation error.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),

    /// Serialization or deserialization error.
    #[error(transparent)]
    Format(#[from] serde_json::Error),

    /// I/O error while loading or saving store contents.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
