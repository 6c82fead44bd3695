#![warn(missing_docs)]
//! Traits and structs for cachegate store interaction.
//!
//! If you want to implement your own storage, you are in the right place:
//! implement [`Store`] for a single named store and [`CacheStorage`] for the
//! collection that opens, lists and deletes them.
mod error;
mod storage;
mod store;

pub use error::StoreError;
pub use storage::{CacheStorage, SharedStore};
pub use store::{Store, StoreResult};

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
