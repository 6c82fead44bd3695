#![doc = include_str!("../README.md")]

mod fetcher;
mod middleware;

pub use fetcher::ReqwestFetcher;
pub use middleware::{CACHE_SOURCE_HEADER, GatewayMiddleware};

/// Re-export reqwest body type for convenience in type annotations
pub use reqwest::Body as ReqwestBody;
