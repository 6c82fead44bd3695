//! The four caching strategies.
//!
//! Each strategy either answers the request or fails; a failure is turned
//! into a synthetic response by the fallback chain in [`Gateway::handle`].

use std::time::Duration;

use cachegate_backend::{CacheStorage, SharedStore, Store};
use cachegate_core::{
    CacheEntry, Category, Clients, FetchError, Fetcher, GatewayRequest, Partition, RequestKey,
    ResponseData, ResponseSource,
};
use tokio::time::Instant;
use tracing::{Instrument, debug, debug_span, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{Gateway, Served};
use crate::metrics;
use crate::policy::Strategy;

impl<S, F, C> Gateway<S, F, C>
where
    S: CacheStorage,
    F: Fetcher,
    C: Clients,
{
    /// Runs `strategy` for `request`.
    pub(crate) async fn apply(
        &self,
        strategy: Strategy,
        category: Category,
        request: &GatewayRequest,
    ) -> GatewayResult<Served> {
        match strategy {
            Strategy::CacheFirst {
                partition,
                max_entries,
            } => {
                self.cache_first(category, request, partition, max_entries)
                    .instrument(debug_span!("strategy.CacheFirst"))
                    .await
            }
            Strategy::CacheFirstWithTtl {
                partition,
                max_entries,
                max_age,
            } => {
                self.cache_first_with_ttl(category, request, partition, max_entries, max_age)
                    .instrument(debug_span!("strategy.CacheFirstWithTtl"))
                    .await
            }
            Strategy::NetworkFirst {
                partition,
                max_entries,
                timeout,
            } => {
                self.network_first(category, request, partition, max_entries, timeout)
                    .instrument(debug_span!("strategy.NetworkFirst"))
                    .await
            }
            Strategy::NetworkFirstReadOnly { fallback } => {
                self.network_first_read_only(category, request, fallback)
                    .instrument(debug_span!("strategy.NetworkFirstReadOnly"))
                    .await
            }
        }
    }

    async fn cache_first(
        &self,
        category: Category,
        request: &GatewayRequest,
        partition: Partition,
        max_entries: Option<usize>,
    ) -> GatewayResult<Served> {
        let store = self.open(partition).await?;
        let key = request.key();

        if let Some(entry) = store.read(&key).await? {
            debug!(store = %store.name(), "cache hit");
            return Ok(Served::cached(entry.into_response(), &store));
        }

        debug!(store = %store.name(), "cache miss");
        let response = self.fetch(category, request).await?;
        self.keep(&store, key, &response, max_entries).await?;
        Ok(Served::network(response))
    }

    async fn cache_first_with_ttl(
        &self,
        category: Category,
        request: &GatewayRequest,
        partition: Partition,
        max_entries: usize,
        max_age: Duration,
    ) -> GatewayResult<Served> {
        let store = self.open(partition).await?;
        let key = request.key();

        let stale = match store.read(&key).await? {
            Some(entry) if !entry.is_older_than(max_age) => {
                debug!(store = %store.name(), "fresh cache hit");
                return Ok(Served::cached(entry.into_response(), &store));
            }
            Some(entry) => {
                debug!(store = %store.name(), written_at = %entry.written_at(), "entry expired, revalidating");
                Some(entry)
            }
            None => None,
        };

        match self.fetch(category, request).await {
            Ok(response) => {
                self.keep(&store, key, &response, Some(max_entries)).await?;
                Ok(Served::network(response))
            }
            Err(error) => match stale {
                Some(entry) => {
                    warn!(%error, "revalidation failed, serving expired entry");
                    Ok(Served {
                        response: entry.into_response(),
                        source: ResponseSource::Stale(store.name().clone()),
                    })
                }
                None => Err(error.into()),
            },
        }
    }

    async fn network_first(
        &self,
        category: Category,
        request: &GatewayRequest,
        partition: Partition,
        max_entries: Option<usize>,
        timeout: Option<Duration>,
    ) -> GatewayResult<Served> {
        let fetched = match timeout {
            // on expiry the fetch future is dropped
            Some(limit) => tokio::time::timeout(limit, self.fetch(category, request))
                .await
                .map_err(|_| GatewayError::Timeout(limit))
                .and_then(|result| result.map_err(GatewayError::from)),
            None => self.fetch(category, request).await.map_err(GatewayError::from),
        };

        match fetched {
            Ok(response) => {
                if response.is_ok() {
                    let store = self.open(partition).await?;
                    self.keep(&store, request.key(), &response, max_entries)
                        .await?;
                }
                Ok(Served::network(response))
            }
            Err(error) => {
                warn!(%error, "network failed, trying cache");
                let name = self.config.store_name(partition);
                match self.lookup(&name, &request.key()).await? {
                    Some(entry) => Ok(Served {
                        response: entry.into_response(),
                        source: ResponseSource::Cache(name),
                    }),
                    None => Err(error),
                }
            }
        }
    }

    async fn network_first_read_only(
        &self,
        category: Category,
        request: &GatewayRequest,
        fallback: Partition,
    ) -> GatewayResult<Served> {
        match self.fetch(category, request).await {
            Ok(response) => Ok(Served::network(response)),
            Err(error) => {
                warn!(%error, "network failed, trying static store");
                let name = self.config.store_name(fallback);
                match self.lookup(&name, &request.key()).await? {
                    Some(entry) => Ok(Served {
                        response: entry.into_response(),
                        source: ResponseSource::Cache(name),
                    }),
                    None => Err(error.into()),
                }
            }
        }
    }

    pub(crate) async fn open(&self, partition: Partition) -> GatewayResult<SharedStore> {
        Ok(self
            .storage
            .open(&self.config.store_name(partition))
            .await?)
    }

    /// Sends `request` to the network, recording how long it took.
    pub(crate) async fn fetch(
        &self,
        category: Category,
        request: &GatewayRequest,
    ) -> Result<ResponseData, FetchError> {
        let started = Instant::now();
        let result = self.fetcher.fetch(request).await;
        metrics::record_upstream(category, started.elapsed());
        result
    }

    /// Stores a copy of a 2xx `response` and trims the store.
    async fn keep(
        &self,
        store: &SharedStore,
        key: RequestKey,
        response: &ResponseData,
        max_entries: Option<usize>,
    ) -> GatewayResult<()> {
        if !response.is_ok() {
            debug!(status = %response.status(), "not storing non-2xx response");
            return Ok(());
        }
        store.write(key, CacheEntry::new(response.clone())).await?;
        if let Some(max) = max_entries {
            let evicted = store.trim(max).await?;
            metrics::record_evictions(store.name(), evicted);
        }
        Ok(())
    }
}
