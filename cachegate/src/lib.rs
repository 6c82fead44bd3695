#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Gateway configuration and its YAML loader.
pub mod config;

/// Error types returned by lifecycle calls and control messages.
pub mod error;

/// Synthetic responses served when both network and cache fail.
///
/// - navigations get the cached offline document, or `200 Offline`
/// - images get a placeholder SVG
/// - everything else gets `408 Network Error`
pub mod fallback;

mod gateway;
mod lifecycle;

/// Control messages (`CACHE_UPDATE`, `GET_VERSION`) and their replies.
pub mod message;

/// Metrics collection.
///
/// When the `metrics` feature is enabled, this module records counters for
/// answered requests, fallbacks and evictions, and a histogram of network
/// fetch durations.
pub mod metrics;

/// Push notification presentation.
pub mod notification;

/// The total mapping from request category to caching strategy.
pub mod policy;

mod strategy;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{Gateway, GatewayBuilder, Interception, NotSet, Served};
pub use lifecycle::{ActivationReport, InstallReport, LifecycleState};
pub use message::{ControlMessage, ControlReply, VersionReply};
pub use notification::{ClickOutcome, Notification, PushPayload};
pub use policy::Strategy;

pub use cachegate_core::{
    CacheEntry, Category, Classifier, ClassifierRules, Clients, FetchError, Fetcher,
    GatewayRequest, NoopClients, RequestKey, RequestMode, ResponseData, ResponseSource, StoreName,
};

/// The `cachegate` prelude.
pub mod prelude {
    pub use crate::{
        ControlMessage, Gateway, GatewayConfig, GatewayError, Interception, LifecycleState, Served,
    };
    pub use cachegate_backend::{CacheStorage, Store};
    pub use cachegate_core::{Fetcher, GatewayRequest, ResponseData, ResponseSource};
}
