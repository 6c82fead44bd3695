//! In-memory store implementation.

use async_trait::async_trait;
use cachegate_backend::{DeleteStatus, Store, StoreResult};
use cachegate_core::{CacheEntry, RequestKey, StoreName};
use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::trace;

/// A single named store held in memory.
///
/// Entries live in an [`IndexMap`] guarded by one mutex, so every operation
/// (including [`trim`](Store::trim) and [`write_all`](Store::write_all)) is
/// atomic with respect to concurrent writers. The map's order is write
/// order: a rewrite moves the key to the back.
///
/// # Caveats
///
/// - Data is **not persisted** on its own; see
///   [`MemoryStorage::save`](crate::MemoryStorage::save) for snapshots.
/// - No capacity is enforced on write. Callers bound the store with
///   [`trim`](Store::trim) after each write.
#[derive(Debug)]
pub struct MemoryStore {
    name: StoreName,
    entries: Mutex<IndexMap<RequestKey, CacheEntry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new(name: StoreName) -> Self {
        Self::with_entries(name, IndexMap::new())
    }

    pub(crate) fn with_entries(name: StoreName, entries: IndexMap<RequestKey, CacheEntry>) -> Self {
        Self {
            name,
            entries: Mutex::new(entries),
        }
    }

    pub(crate) async fn entries(&self) -> Vec<(RequestKey, CacheEntry)> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }
}

fn put(entries: &mut IndexMap<RequestKey, CacheEntry>, key: RequestKey, entry: CacheEntry) {
    // shift_remove keeps the remaining order intact, so the rewrite lands at the back
    entries.shift_remove(&key);
    entries.insert(key, entry);
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &StoreName {
        &self.name
    }

    async fn read(&self, key: &RequestKey) -> StoreResult<Option<CacheEntry>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: RequestKey, entry: CacheEntry) -> StoreResult<()> {
        trace!(store = %self.name, %key, "write");
        put(&mut *self.entries.lock().await, key, entry);
        Ok(())
    }

    async fn remove(&self, key: &RequestKey) -> StoreResult<DeleteStatus> {
        match self.entries.lock().await.shift_remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn keys(&self) -> StoreResult<Vec<RequestKey>> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.lock().await.len())
    }

    async fn write_all(&self, batch: Vec<(RequestKey, CacheEntry)>) -> StoreResult<()> {
        let mut entries = self.entries.lock().await;
        for (key, entry) in batch {
            put(&mut entries, key, entry);
        }
        Ok(())
    }

    async fn trim(&self, max_entries: usize) -> StoreResult<usize> {
        let mut entries = self.entries.lock().await;
        let overflow = entries.len().saturating_sub(max_entries);
        if overflow > 0 {
            entries.drain(..overflow);
            trace!(store = %self.name, removed = overflow, "trimmed");
        }
        Ok(overflow)
    }
}
