#![warn(missing_docs)]
//! # cachegate-core
//!
//! Core traits and types for the cachegate offline-first cache gateway.
//!
//! This crate holds the vocabulary shared by every other cachegate crate.
//! It does no I/O on its own: storage lives in `cachegate-backend`
//! implementations and the network lives behind the [`Fetcher`] trait.
//!
//! ## Architecture
//!
//! The gateway sits between a client and the network. For each outgoing
//! request it:
//!
//! - **Classifies** the URL into a [`Category`] ([`Classifier`])
//! - **Keys** the request for storage ([`RequestKey`])
//! - **Calls** the network on misses ([`Fetcher`])
//! - **Stores** responses as first-class records ([`CacheEntry`])
//! - **Reports** where the response came from ([`ResponseSource`])
//!
//! Page-level side effects of the lifecycle (claiming pages, opening
//! windows) go through the [`Clients`] trait.

pub mod category;
pub mod classify;
pub mod clients;
pub mod entry;
pub mod fetch;
pub mod key;
pub mod request;
pub mod response;
pub mod source;
pub mod store_name;

pub use category::Category;
pub use classify::{Classifier, ClassifierRules};
pub use clients::{Clients, NoopClients};
pub use entry::CacheEntry;
pub use fetch::{FetchError, FetchResult, Fetcher};
pub use key::RequestKey;
pub use request::{GatewayRequest, RequestMode};
pub use response::ResponseData;
pub use source::ResponseSource;
pub use store_name::{Partition, StoreName};

