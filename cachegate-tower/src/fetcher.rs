//! Tower services as the gateway's network.

use async_trait::async_trait;
use bytes::Bytes;
use cachegate_core::{FetchError, FetchResult, Fetcher, GatewayRequest, ResponseData};
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Body as HttpBody;
use tower::{Service, ServiceExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// [`Fetcher`] that sends requests through a Tower service.
///
/// The service is cloned for every fetch and must be `Sync`. Request bodies
/// are empty (only GET requests are fetched); response bodies are collected
/// in full.
#[derive(Debug, Clone)]
pub struct TowerFetcher<S> {
    service: S,
}

impl<S> TowerFetcher<S> {
    /// Wraps `service`.
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S, B> Fetcher for TowerFetcher<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    async fn fetch(&self, request: &GatewayRequest) -> FetchResult {
        let mut http_request = Request::builder()
            .method(request.method().clone())
            .uri(request.uri().clone())
            .body(Full::new(Bytes::new()))
            .map_err(FetchError::network)?;
        *http_request.headers_mut() = request.headers().clone();

        let mut service = self.service.clone();
        let response = service
            .ready()
            .await
            .map_err(|e| FetchError::Network(e.into()))?
            .call(http_request)
            .await
            .map_err(|e| FetchError::Network(e.into()))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| FetchError::Network(e.into()))?
            .to_bytes();
        Ok(ResponseData::new(parts.status, parts.headers, body))
    }
}
