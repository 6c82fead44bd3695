//! Network access.

use async_trait::async_trait;
use thiserror::Error;

use crate::request::GatewayRequest;
use crate::response::ResponseData;

/// Errors raised while reaching the network.
///
/// A non-2xx status is not an error: the fetcher returns it as a normal
/// [`ResponseData`] and the gateway decides whether to store it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The network could not be reached or the transfer failed.
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The URL could not be turned into a request.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Wraps any error as a network failure.
    pub fn network<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FetchError::Network(Box::new(error))
    }
}

/// Result of a fetch.
pub type FetchResult = Result<ResponseData, FetchError>;

/// Trait for sending requests to the network.
///
/// This trait is transport-agnostic: `cachegate-reqwest` implements it over
/// reqwest, `cachegate-tower` over any tower service, and tests over a
/// scripted mock.
///
/// # Examples
///
/// ```rust,ignore
/// use cachegate_core::{Fetcher, FetchResult, GatewayRequest, ResponseData};
///
/// struct Static;
///
/// #[async_trait::async_trait]
/// impl Fetcher for Static {
///     async fn fetch(&self, _request: &GatewayRequest) -> FetchResult {
///         Ok(ResponseData::ok("hello"))
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Sends `request` and buffers the full response.
    async fn fetch(&self, request: &GatewayRequest) -> FetchResult;
}

#[async_trait]
impl<T> Fetcher for std::sync::Arc<T>
where
    T: Fetcher + ?Sized,
{
    async fn fetch(&self, request: &GatewayRequest) -> FetchResult {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl Fetcher for Box<dyn Fetcher> {
    async fn fetch(&self, request: &GatewayRequest) -> FetchResult {
        (**self).fetch(request).await
    }
}
