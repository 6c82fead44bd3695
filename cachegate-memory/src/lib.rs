#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod storage;
mod store;

pub use storage::{MemoryStorage, MemoryStorageBuilder, StorageSnapshot, StoreSnapshot};
pub use store::MemoryStore;
