//! Requests seen by the gateway.

use http::{HeaderMap, HeaderValue, Method, Request, Uri, header::HeaderName};

use crate::fetch::FetchError;
use crate::key::RequestKey;

/// Header browsers use to announce a full-page navigation.
pub const SEC_FETCH_MODE: HeaderName = HeaderName::from_static("sec-fetch-mode");

/// How the request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// A full-page load.
    Navigate,
    /// Any sub-resource request.
    #[default]
    Subresource,
}

impl RequestMode {
    /// Reads the mode from a `Sec-Fetch-Mode` header, if any.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(SEC_FETCH_MODE).map(HeaderValue::as_bytes) {
            Some(b"navigate") => RequestMode::Navigate,
            _ => RequestMode::Subresource,
        }
    }
}

/// A request as the gateway sees it: method, absolute URI, headers and mode.
///
/// The body is never inspected because only `GET` requests are intercepted.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    mode: RequestMode,
}

impl GatewayRequest {
    /// Creates a request with no headers.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            mode: RequestMode::Subresource,
        }
    }

    /// A sub-resource `GET` for `uri`.
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// A navigation `GET` for `uri`.
    pub fn navigate(uri: Uri) -> Self {
        Self::get(uri).with_mode(RequestMode::Navigate)
    }

    /// Builds a gateway request from an `http::Request`, ignoring its body.
    ///
    /// The mode is derived from `Sec-Fetch-Mode`.
    pub fn from_http<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            mode: RequestMode::from_headers(request.headers()),
        }
    }

    /// Overrides the request mode.
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request mode.
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Whether this is a full-page navigation.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Whether the URI uses the `http` or `https` scheme.
    pub fn is_http(&self) -> bool {
        matches!(self.uri.scheme_str(), Some("http") | Some("https"))
    }

    /// Store key for this request.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method.clone(), &self.uri)
    }
}

/// Resolves a manifest reference against the gateway origin.
///
/// Absolute URLs are returned as-is; root-relative paths (`/css/style.css`)
/// are joined to the origin's scheme and authority.
///
/// ```
/// use cachegate_core::request::resolve;
///
/// let origin = "https://example.com".parse().unwrap();
/// assert_eq!(resolve(&origin, "/").unwrap().to_string(), "https://example.com/");
/// assert_eq!(
///     resolve(&origin, "https://unpkg.com/aos.js").unwrap().to_string(),
///     "https://unpkg.com/aos.js"
/// );
/// ```
pub fn resolve(origin: &Uri, reference: &str) -> Result<Uri, FetchError> {
    let invalid = || FetchError::InvalidUrl(reference.to_owned());

    if reference.starts_with('/') {
        let scheme = origin.scheme().ok_or_else(invalid)?.clone();
        let authority = origin.authority().ok_or_else(invalid)?.clone();
        return Uri::builder()
            .scheme(scheme)
            .authority(authority)
            .path_and_query(reference)
            .build()
            .map_err(|_| invalid());
    }

    let uri: Uri = reference.parse().map_err(|_| invalid())?;
    if uri.scheme().is_some() && uri.authority().is_some() {
        Ok(uri)
    } else {
        Err(invalid())
    }
}
