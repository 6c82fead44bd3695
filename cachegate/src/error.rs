use cachegate_backend::StoreError;
use cachegate_core::FetchError;
use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// Errors returned by the gateway.
///
/// Most runtime failures never reach the caller: [`Gateway::handle`]
/// recovers them through the cache and the fallback chain. These variants
/// surface from lifecycle calls, control messages and the strategies
/// themselves.
///
/// [`Gateway::handle`]: crate::Gateway::handle
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The network could not be reached.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The network did not answer within the configured timeout.
    #[error("network timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// An essential manifest entry could not be fetched during install.
    #[error("essential asset {url} failed: {reason}")]
    EssentialAsset {
        /// The manifest URL.
        url: String,
        /// Why it failed.
        reason: String,
    },
    /// A lifecycle step was called in the wrong state.
    #[error("expected lifecycle state {expected}, gateway is {actual}")]
    InvalidState {
        /// The state the call requires.
        expected: LifecycleState,
        /// The state the gateway was in.
        actual: LifecycleState,
    },
    /// The configuration is invalid or could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type of gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
