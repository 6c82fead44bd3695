//! Where a response came from.

use crate::store_name::StoreName;

/// Source of a response returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    /// Fresh from the network.
    Network,
    /// Served from the named store.
    ///
    /// Also used when a network-first fetch failed or timed out and the
    /// last good copy was returned instead.
    Cache(StoreName),
    /// An entry past its max age, served because revalidation failed.
    Stale(StoreName),
    /// A synthetic offline response built by the gateway.
    Fallback,
}

impl ResponseSource {
    /// Returns the source as a string slice, suitable for headers and metric labels.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache(_) => "cache",
            ResponseSource::Stale(_) => "stale",
            ResponseSource::Fallback => "fallback",
        }
    }

    /// The store involved, if any.
    pub fn store(&self) -> Option<&StoreName> {
        match self {
            ResponseSource::Cache(name) | ResponseSource::Stale(name) => Some(name),
            ResponseSource::Network | ResponseSource::Fallback => None,
        }
    }
}
