use std::sync::Arc;

use async_trait::async_trait;
use cachegate_core::{CacheEntry, RequestKey, StoreName};
use tracing::debug;

use crate::{DeleteStatus, StoreError};

/// Result of a store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// A named, insertion-ordered mapping from [`RequestKey`] to [`CacheEntry`].
///
/// Each method is atomic on its own. Writing an existing key replaces the
/// entry and moves it to the newest position, so `keys()` always lists
/// entries oldest-write first.
#[async_trait]
pub trait Store: Send + Sync {
    /// Name of this store.
    fn name(&self) -> &StoreName;

    /// Returns the entry stored under `key`, if any. Never reorders.
    async fn read(&self, key: &RequestKey) -> StoreResult<Option<CacheEntry>>;

    /// Stores `entry` under `key` as the newest entry, replacing any
    /// previous one.
    async fn write(&self, key: RequestKey, entry: CacheEntry) -> StoreResult<()>;

    /// Removes the entry under `key`.
    async fn remove(&self, key: &RequestKey) -> StoreResult<DeleteStatus>;

    /// Keys in write order, oldest first.
    async fn keys(&self) -> StoreResult<Vec<RequestKey>>;

    /// Number of entries.
    async fn len(&self) -> StoreResult<usize> {
        Ok(self.keys().await?.len())
    }

    /// Writes every entry or none of them.
    ///
    /// The default writes one by one; implementations that can make the
    /// batch atomic should override it.
    async fn write_all(&self, entries: Vec<(RequestKey, CacheEntry)>) -> StoreResult<()> {
        for (key, entry) in entries {
            self.write(key, entry).await?;
        }
        Ok(())
    }

    /// Evicts the oldest entries until at most `max_entries` remain.
    ///
    /// Eviction is FIFO on write order: reads never protect an entry.
    /// Returns how many entries were removed.
    async fn trim(&self, max_entries: usize) -> StoreResult<usize> {
        let keys = self.keys().await?;
        if keys.len() <= max_entries {
            return Ok(0);
        }
        let overflow = keys.len() - max_entries;
        let mut removed = 0;
        for key in keys.iter().take(overflow) {
            if let DeleteStatus::Deleted(n) = self.remove(key).await? {
                removed += n as usize;
            }
        }
        debug!(store = %self.name(), removed, "trimmed store");
        Ok(removed)
    }
}

#[async_trait]
impl Store for Arc<dyn Store> {
    fn name(&self) -> &StoreName {
        (**self).name()
    }

    async fn read(&self, key: &RequestKey) -> StoreResult<Option<CacheEntry>> {
        (**self).read(key).await
    }

    async fn write(&self, key: RequestKey, entry: CacheEntry) -> StoreResult<()> {
        (**self).write(key, entry).await
    }

    async fn remove(&self, key: &RequestKey) -> StoreResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> StoreResult<Vec<RequestKey>> {
        (**self).keys().await
    }

    async fn len(&self) -> StoreResult<usize> {
        (**self).len().await
    }

    async fn write_all(&self, entries: Vec<(RequestKey, CacheEntry)>) -> StoreResult<()> {
        (**self).write_all(entries).await
    }

    async fn trim(&self, max_entries: usize) -> StoreResult<usize> {
        (**self).trim(max_entries).await
    }
}
