//! In-memory [`CacheStorage`] implementation.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cachegate_backend::{CacheStorage, SharedStore, StoreResult};
use cachegate_core::{CacheEntry, RequestKey, StoreName};
use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// In-memory collection of named stores.
///
/// Cloning is cheap: clones share the same stores.
///
/// # Examples
///
/// ```
/// use cachegate_backend::CacheStorage;
/// use cachegate_memory::MemoryStorage;
///
/// let storage = MemoryStorage::builder().label("pages").build();
/// assert_eq!(storage.label(), "pages");
/// ```
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    stores: Arc<DashMap<StoreName, Arc<MemoryStore>>>,
    label: SmolStr,
}

impl MemoryStorage {
    /// Creates an empty storage labelled `memory`.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new builder.
    pub fn builder() -> MemoryStorageBuilder {
        MemoryStorageBuilder::default()
    }

    /// Captures the content of every store.
    pub async fn snapshot(&self) -> StorageSnapshot {
        let handles: Vec<Arc<MemoryStore>> =
            self.stores.iter().map(|item| Arc::clone(item.value())).collect();

        let mut stores = Vec::with_capacity(handles.len());
        for store in handles {
            stores.push(StoreSnapshot {
                name: cachegate_backend::Store::name(store.as_ref()).clone(),
                entries: store.entries().await,
            });
        }
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        StorageSnapshot { stores }
    }

    /// Replaces the current stores with the ones in `snapshot`.
    pub fn restore(&self, snapshot: StorageSnapshot) {
        self.stores.clear();
        for store in snapshot.stores {
            let entries: IndexMap<RequestKey, CacheEntry> = store.entries.into_iter().collect();
            self.stores.insert(
                store.name.clone(),
                Arc::new(MemoryStore::with_entries(store.name, entries)),
            );
        }
    }

    /// Writes a JSON snapshot of every store to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let snapshot = self.snapshot().await;
        let json = serde_json::to_vec(&snapshot)?;
        tokio::fs::write(path.as_ref(), json).await?;
        info!(path = %path.as_ref().display(), stores = snapshot.stores.len(), "saved storage snapshot");
        Ok(())
    }

    /// Loads a JSON snapshot written by [`save`](Self::save).
    pub async fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let json = tokio::fs::read(path.as_ref()).await?;
        let snapshot: StorageSnapshot = serde_json::from_slice(&json)?;
        let storage = Self::new();
        storage.restore(snapshot);
        Ok(storage)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &StoreName) -> StoreResult<SharedStore> {
        let store = self
            .stores
            .entry(name.clone())
            .or_insert_with(|| {
                debug!(storage = %self.label, store = %name, "opened new store");
                Arc::new(MemoryStore::new(name.clone()))
            })
            .clone();
        Ok(store)
    }

    async fn has(&self, name: &StoreName) -> StoreResult<bool> {
        Ok(self.stores.contains_key(name))
    }

    async fn delete(&self, name: &StoreName) -> StoreResult<bool> {
        Ok(self.stores.remove(name).is_some())
    }

    async fn names(&self) -> StoreResult<Vec<StoreName>> {
        let mut names: Vec<StoreName> = self.stores.iter().map(|item| item.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Builder for [`MemoryStorage`].
#[derive(Debug, Clone)]
pub struct MemoryStorageBuilder {
    label: SmolStr,
}

impl Default for MemoryStorageBuilder {
    fn default() -> Self {
        Self {
            label: SmolStr::new_static("memory"),
        }
    }
}

impl MemoryStorageBuilder {
    /// Sets the label used in logs.
    pub fn label(self, label: impl Into<SmolStr>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Builds an empty storage.
    pub fn build(self) -> MemoryStorage {
        MemoryStorage {
            stores: Arc::new(DashMap::new()),
            label: self.label,
        }
    }
}

/// Serializable content of a [`MemoryStorage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    /// Stores, sorted by name.
    pub stores: Vec<StoreSnapshot>,
}

/// Serializable content of one store, entries oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Store name.
    pub name: StoreName,
    /// Entries in write order.
    pub entries: Vec<(RequestKey, CacheEntry)>,
}
