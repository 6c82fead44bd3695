//! Resource categories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store_name::Partition;

/// The closed set of resource categories a request can fall into.
///
/// Every category maps to exactly one caching strategy in the gateway, so
/// adding a variant here is a compile error until the gateway handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Stylesheets, scripts, documents and manifest entries.
    Static,
    /// Raster and vector images.
    Image,
    /// API calls and stats endpoints.
    Api,
    /// Third-party CDN resources.
    External,
    /// Anything else.
    Default,
}

impl Category {
    /// All categories, in classification order.
    pub const ALL: [Category; 5] = [
        Category::Static,
        Category::Image,
        Category::Api,
        Category::External,
        Category::Default,
    ];

    /// Returns the category as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Static => "static",
            Category::Image => "image",
            Category::Api => "api",
            Category::External => "external",
            Category::Default => "default",
        }
    }

    /// The store partition this category writes to.
    ///
    /// `Default` has no store of its own: it only reads the static partition
    /// as a fallback.
    pub const fn partition(&self) -> Partition {
        match self {
            Category::Static | Category::Default => Partition::StaticAssets,
            Category::Image => Partition::Images,
            Category::Api => Partition::ApiResponses,
            Category::External => Partition::ExternalResources,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
