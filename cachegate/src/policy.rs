//! Category to strategy mapping.

use std::time::Duration;

use cachegate_core::{Category, Partition};

use crate::config::GatewayConfig;

/// How a request of a given category is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve from the store; on a miss fetch, store a 2xx copy, trim.
    CacheFirst {
        /// Store holding the copies.
        partition: Partition,
        /// Entry limit, `None` for unbounded.
        max_entries: Option<usize>,
    },
    /// Like [`CacheFirst`](Strategy::CacheFirst), but entries older than
    /// `max_age` are revalidated and only served again if the network fails.
    CacheFirstWithTtl {
        /// Store holding the copies.
        partition: Partition,
        /// Entry limit.
        max_entries: usize,
        /// Age after which an entry is revalidated.
        max_age: Duration,
    },
    /// Fetch first (bounded by `timeout` when set), store a 2xx copy;
    /// fall back to the store on failure.
    NetworkFirst {
        /// Store holding the last good responses.
        partition: Partition,
        /// Entry limit, `None` for unbounded.
        max_entries: Option<usize>,
        /// Upper bound on the network wait.
        timeout: Option<Duration>,
    },
    /// Fetch only; on failure look the request up in `fallback` without
    /// ever writing to it.
    NetworkFirstReadOnly {
        /// Read-only fallback store.
        fallback: Partition,
    },
}

impl Strategy {
    /// Selects the strategy for `category`.
    ///
    /// The match is exhaustive on purpose: a new category does not compile
    /// until it has a strategy.
    pub fn for_category(category: Category, config: &GatewayConfig) -> Self {
        let stores = &config.stores;
        let partition = category.partition();
        match category {
            Category::Static => Strategy::CacheFirst {
                partition,
                max_entries: stores.static_assets.max_entries,
            },
            Category::Image => Strategy::CacheFirstWithTtl {
                partition,
                max_entries: stores.images.max_entries,
                max_age: stores.images.max_age,
            },
            Category::Api => Strategy::NetworkFirst {
                partition,
                max_entries: Some(stores.api.max_entries),
                timeout: Some(stores.api.timeout),
            },
            Category::External => Strategy::CacheFirst {
                partition,
                max_entries: Some(stores.external.max_entries),
            },
            Category::Default => Strategy::NetworkFirstReadOnly {
                fallback: partition,
            },
        }
    }

    /// The partition the strategy reads, and writes unless read-only.
    pub const fn partition(&self) -> Partition {
        match self {
            Strategy::CacheFirst { partition, .. }
            | Strategy::CacheFirstWithTtl { partition, .. }
            | Strategy::NetworkFirst { partition, .. } => *partition,
            Strategy::NetworkFirstReadOnly { fallback } => *fallback,
        }
    }

    /// Span-friendly name.
    pub const fn name(&self) -> &'static str {
        match self {
            Strategy::CacheFirst { .. } => "CacheFirst",
            Strategy::CacheFirstWithTtl { .. } => "CacheFirstWithTtl",
            Strategy::NetworkFirst { .. } => "NetworkFirst",
            Strategy::NetworkFirstReadOnly { .. } => "NetworkFirstReadOnly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_strategy() {
        let config = GatewayConfig::default();
        let strategies: Vec<_> = Category::ALL
            .iter()
            .map(|category| Strategy::for_category(*category, &config).name())
            .collect();
        assert_eq!(
            strategies,
            ["CacheFirst", "CacheFirstWithTtl", "NetworkFirst", "CacheFirst", "NetworkFirstReadOnly"]
        );
    }

    #[test]
    fn strategies_use_the_category_partition() {
        let config = GatewayConfig::default();
        let partitions: Vec<_> = Category::ALL
            .iter()
            .map(|category| Strategy::for_category(*category, &config).partition())
            .collect();
        assert_eq!(
            partitions,
            [
                Partition::StaticAssets,
                Partition::Images,
                Partition::ApiResponses,
                Partition::ExternalResources,
                Partition::StaticAssets,
            ]
        );
        for category in Category::ALL {
            assert_eq!(
                Strategy::for_category(category, &config).partition(),
                category.partition()
            );
        }
    }

    #[test]
    fn limits_come_from_config() {
        let config = GatewayConfig::default();
        assert_eq!(
            Strategy::for_category(Category::Api, &config),
            Strategy::NetworkFirst {
                partition: Partition::ApiResponses,
                max_entries: Some(20),
                timeout: Some(Duration::from_secs(5)),
            }
        );
        assert_eq!(
            Strategy::for_category(Category::External, &config),
            Strategy::CacheFirst {
                partition: Partition::ExternalResources,
                max_entries: Some(30),
            }
        );
    }
}
