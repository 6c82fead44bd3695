use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use cachegate::{Gateway, Interception};
use cachegate_backend::CacheStorage;
use cachegate_core::{Clients, Fetcher, GatewayRequest, RequestMode};
use futures::future::BoxFuture;
use http::header::{HOST, HeaderName, HeaderValue};
use http::uri::{Authority, PathAndQuery};
use http::{Request, Response, Uri};
use hyper::body::Body as HttpBody;
use tower::Service;
use tracing::trace;

use crate::body::GatewayBody;

/// Header naming where an intercepted response came from.
pub const CACHE_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-cache-source");

/// Service produced by [`GatewayLayer`](crate::GatewayLayer).
pub struct GatewayService<S, St, F, C> {
    inner: S,
    gateway: Arc<Gateway<St, F, C>>,
}

impl<S, St, F, C> GatewayService<S, St, F, C> {
    /// Wraps `inner`.
    pub fn new(inner: S, gateway: Arc<Gateway<St, F, C>>) -> Self {
        Self { inner, gateway }
    }
}

impl<S, St, F, C> Clone for GatewayService<S, St, F, C>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<S, St, F, C, ReqBody, ResBody> Service<Request<ReqBody>> for GatewayService<S, St, F, C>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    St: CacheStorage + 'static,
    F: Fetcher + 'static,
    C: Clients + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
{
    type Response = Response<GatewayBody<ResBody>>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // the ready service goes into the future, a fresh clone stays behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let gateway = Arc::clone(&self.gateway);

        Box::pin(async move {
            let uri = absolute_uri(&req, gateway.origin());
            let request = GatewayRequest::new(req.method().clone(), uri)
                .with_headers(req.headers().clone())
                .with_mode(RequestMode::from_headers(req.headers()));

            match gateway.handle(request).await {
                Interception::Passthrough(_) => {
                    trace!(method = %req.method(), uri = %req.uri(), "passthrough");
                    let response = inner.call(req).await?;
                    Ok(response.map(GatewayBody::Upstream))
                }
                Interception::Respond(served) => {
                    let mut response = served.response.into_http().map(GatewayBody::served);
                    response.headers_mut().insert(
                        CACHE_SOURCE_HEADER,
                        HeaderValue::from_static(served.source.as_str()),
                    );
                    Ok(response)
                }
            }
        })
    }
}

/// The absolute URI the gateway sees for `req`.
///
/// Servers receive origin-form targets (`/js/main.js`); those are completed
/// with the origin's scheme and the `Host` header, or the origin's authority
/// when `Host` is missing or invalid. Absolute targets are kept as they are.
fn absolute_uri<B>(req: &Request<B>, origin: &Uri) -> Uri {
    let uri = req.uri();
    if uri.scheme().is_some() || uri.authority().is_some() {
        return uri.clone();
    }
    let Some(scheme) = origin.scheme() else {
        return uri.clone();
    };

    let authority = req
        .headers()
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .and_then(|host| host.parse::<Authority>().ok())
        .or_else(|| origin.authority().cloned());
    let Some(authority) = authority else {
        return uri.clone();
    };

    Uri::builder()
        .scheme(scheme.clone())
        .authority(authority)
        .path_and_query(
            uri.path_and_query()
                .cloned()
                .unwrap_or_else(|| PathAndQuery::from_static("/")),
        )
        .build()
        .unwrap_or_else(|_| uri.clone())
}
