//! Gateway middleware for reqwest-middleware.

use std::sync::Arc;

use async_trait::async_trait;
use cachegate::{Gateway, Interception};
use cachegate_backend::CacheStorage;
use cachegate_core::{Clients, Fetcher, GatewayRequest, RequestMode};
use http::header::{HeaderName, HeaderValue};
use http::{Extensions, Uri};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::debug;

/// Header naming where an intercepted response came from
/// (`network`, `cache`, `stale` or `fallback`).
pub const CACHE_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-cache-source");

/// Middleware routing GET requests through a [`Gateway`].
///
/// Requests the gateway passes through (non-GET, non-HTTP, or a gateway that
/// is not active yet) continue down the middleware chain untouched.
pub struct GatewayMiddleware<S, F, C> {
    gateway: Arc<Gateway<S, F, C>>,
}

impl<S, F, C> GatewayMiddleware<S, F, C> {
    /// Creates a middleware around a shared gateway.
    pub fn new(gateway: Arc<Gateway<S, F, C>>) -> Self {
        Self { gateway }
    }
}

impl<S, F, C> Clone for GatewayMiddleware<S, F, C> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
        }
    }
}

#[async_trait]
impl<S, F, C> Middleware for GatewayMiddleware<S, F, C>
where
    S: CacheStorage + 'static,
    F: Fetcher + 'static,
    C: Clients + 'static,
{
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let Ok(uri) = req.url().as_str().parse::<Uri>() else {
            return next.run(req, extensions).await;
        };
        let headers = req.headers().clone();
        let request = GatewayRequest::new(req.method().clone(), uri)
            .with_mode(RequestMode::from_headers(&headers))
            .with_headers(headers);

        match self.gateway.handle(request).await {
            Interception::Passthrough(_) => {
                debug!(url = %req.url(), "passing request down the chain");
                next.run(req, extensions).await
            }
            Interception::Respond(served) => {
                let mut http_response = served.response.into_http();
                http_response.headers_mut().insert(
                    CACHE_SOURCE_HEADER,
                    HeaderValue::from_static(served.source.as_str()),
                );
                let (parts, body) = http_response.into_parts();
                let http_response = http::Response::from_parts(parts, reqwest::Body::from(body));
                Ok(http_response.into())
            }
        }
    }
}
