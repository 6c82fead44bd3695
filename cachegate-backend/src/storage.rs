use std::sync::Arc;

use async_trait::async_trait;
use cachegate_core::StoreName;

use crate::store::{Store, StoreResult};

/// Shared handle to an opened store.
pub type SharedStore = Arc<dyn Store>;

/// The collection of named stores, like a browser's `CacheStorage`.
///
/// Stores are created lazily by [`open`](CacheStorage::open); opening an
/// existing name returns a handle to the same store.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Opens the store called `name`, creating it if needed.
    async fn open(&self, name: &StoreName) -> StoreResult<SharedStore>;

    /// Whether a store called `name` exists. Never creates it.
    async fn has(&self, name: &StoreName) -> StoreResult<bool>;

    /// Deletes a whole store. Returns `false` if it did not exist.
    async fn delete(&self, name: &StoreName) -> StoreResult<bool>;

    /// Names of all existing stores.
    async fn names(&self) -> StoreResult<Vec<StoreName>>;

    /// Returns the name of this storage for logs and metrics.
    fn label(&self) -> &str {
        "storage"
    }
}

#[async_trait]
impl<T> CacheStorage for Arc<T>
where
    T: CacheStorage + ?Sized,
{
    async fn open(&self, name: &StoreName) -> StoreResult<SharedStore> {
        (**self).open(name).await
    }

    async fn has(&self, name: &StoreName) -> StoreResult<bool> {
        (**self).has(name).await
    }

    async fn delete(&self, name: &StoreName) -> StoreResult<bool> {
        (**self).delete(name).await
    }

    async fn names(&self) -> StoreResult<Vec<StoreName>> {
        (**self).names().await
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}
