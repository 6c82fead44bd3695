#![doc = include_str!("../README.md")]

pub mod body;
pub mod fetcher;
pub mod layer;
pub mod service;

pub use body::GatewayBody;
pub use fetcher::TowerFetcher;
pub use layer::GatewayLayer;
pub use service::{CACHE_SOURCE_HEADER, GatewayService};
