//! Store names and partitions.
//!
//! Every store the gateway owns is named `{prefix}-{partition}-v{version}`,
//! e.g. `ghp-images-v1.0.0`. Anything that starts with `{prefix}-` belongs to
//! the gateway's naming scheme; anything else is foreign and left alone.
//!
//! ```
//! use cachegate_core::{Partition, StoreName};
//!
//! let name = StoreName::versioned("ghp", Partition::Images, "1.0.0");
//! assert_eq!(name.as_str(), "ghp-images-v1.0.0");
//! assert!(name.belongs_to("ghp"));
//! assert_eq!(name.version("ghp"), Some("1.0.0"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// The four store partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Partition {
    /// The versioned top-level store, populated from the manifest.
    StaticAssets,
    /// Runtime image cache.
    Images,
    /// Runtime API response cache.
    ApiResponses,
    /// Runtime third-party resource cache.
    ExternalResources,
}

impl Partition {
    /// All partitions.
    pub const ALL: [Partition; 4] = [
        Partition::StaticAssets,
        Partition::Images,
        Partition::ApiResponses,
        Partition::ExternalResources,
    ];

    /// Returns the partition as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Partition::StaticAssets => "static-assets",
            Partition::Images => "images",
            Partition::ApiResponses => "api-responses",
            Partition::ExternalResources => "external-resources",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a cache store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreName(SmolStr);

impl StoreName {
    /// Creates a store name from any string.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Builds the name of `partition` for the given prefix and version.
    pub fn versioned(prefix: &str, partition: Partition, version: &str) -> Self {
        Self(SmolStr::from(format!("{prefix}-{partition}-v{version}")))
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name is part of the naming scheme for `prefix`.
    pub fn belongs_to(&self, prefix: &str) -> bool {
        self.0
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('-'))
    }

    /// The version encoded in the name, if it follows the scheme for `prefix`.
    pub fn version(&self, prefix: &str) -> Option<&str> {
        if !self.belongs_to(prefix) {
            return None;
        }
        let rest = &self.0[prefix.len() + 1..];
        Partition::ALL
            .iter()
            .find_map(|partition| {
                rest.strip_prefix(partition.as_str())
                    .and_then(|tail| tail.strip_prefix("-v"))
            })
            .or_else(|| rest.rsplit_once("-v").map(|(_, version)| version))
            .filter(|version| !version.is_empty())
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for StoreName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for StoreName {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}
