//! Synthetic responses used when both network and cache fail.

use cachegate_backend::{CacheStorage, Store, StoreResult};
use cachegate_core::{
    CacheEntry, Clients, Fetcher, GatewayRequest, Partition, RequestKey, ResponseData,
    ResponseSource, StoreName, request::resolve,
};
use http::StatusCode;
use tracing::{debug, warn};

use crate::gateway::{Gateway, Served};
use crate::metrics;

/// Placeholder graphic served for images that cannot be loaded.
pub const IMAGE_PLACEHOLDER_SVG: &str = concat!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200">"##,
    r##"<rect width="200" height="200" fill="#f3f4f6"/>"##,
    r##"<text x="100" y="100" text-anchor="middle" dy=".3em" fill="#6b7280">Image Offline</text>"##,
    "</svg>",
);

/// Which synthetic response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// The cached offline document, for navigations.
    OfflineDocument,
    /// Plain `Offline` text, for navigations with no cached document.
    OfflineText,
    /// The placeholder SVG, for images.
    ImagePlaceholder,
    /// `408 Network Error`, for everything else.
    NetworkError,
}

impl FallbackKind {
    /// Label used in logs and metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FallbackKind::OfflineDocument => "offline_document",
            FallbackKind::OfflineText => "offline_text",
            FallbackKind::ImagePlaceholder => "image_placeholder",
            FallbackKind::NetworkError => "network_error",
        }
    }
}

/// `200 Offline` as plain text.
pub fn offline_text() -> ResponseData {
    ResponseData::ok("Offline").with_content_type("text/plain")
}

/// The placeholder SVG with status 200.
pub fn image_placeholder() -> ResponseData {
    ResponseData::ok(IMAGE_PLACEHOLDER_SVG).with_content_type("image/svg+xml")
}

/// `408 Network Error` as plain text.
pub fn network_error() -> ResponseData {
    ResponseData::new(
        StatusCode::REQUEST_TIMEOUT,
        Default::default(),
        "Network Error",
    )
    .with_content_type("text/plain")
}

impl<S, F, C> Gateway<S, F, C>
where
    S: CacheStorage,
    F: Fetcher,
    C: Clients,
{
    /// Produces the last-resort response for `request`. Never fails.
    pub(crate) async fn fallback(&self, request: &GatewayRequest) -> Served {
        let (kind, response) = if request.is_navigation() {
            match self.offline_document().await {
                Some(document) => (FallbackKind::OfflineDocument, document),
                None => (FallbackKind::OfflineText, offline_text()),
            }
        } else if self.classifier.is_image(request.uri()) {
            (FallbackKind::ImagePlaceholder, image_placeholder())
        } else {
            (FallbackKind::NetworkError, network_error())
        };

        debug!(kind = kind.as_str(), "serving fallback");
        metrics::record_fallback(kind.as_str());
        Served {
            response,
            source: ResponseSource::Fallback,
        }
    }

    async fn offline_document(&self) -> Option<ResponseData> {
        let name = self.config.store_name(Partition::StaticAssets);
        let uri = resolve(&self.origin, &self.config.offline_document).ok()?;

        match self.lookup(&name, &RequestKey::get(&uri)).await {
            Ok(entry) => entry.map(|entry| entry.into_response()),
            Err(error) => {
                warn!(%error, store = %name, "offline document lookup failed");
                None
            }
        }
    }

    /// Reads `key` from an existing store without creating it.
    pub(crate) async fn lookup(
        &self,
        name: &StoreName,
        key: &RequestKey,
    ) -> StoreResult<Option<CacheEntry>> {
        if !self.storage.has(name).await? {
            return Ok(None);
        }
        self.storage.open(name).await?.read(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;

    #[test]
    fn placeholder_is_svg() {
        let response = image_placeholder();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), Some("image/svg+xml"));
        let body = std::str::from_utf8(response.body()).unwrap();
        assert!(body.starts_with("<svg"));
        assert!(body.contains("Image Offline"));
        assert!(body.ends_with("</svg>"));
    }

    #[test]
    fn network_error_is_408() {
        let response = network_error();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(response.body().as_ref(), b"Network Error");
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn offline_text_is_200() {
        let response = offline_text();
        assert!(response.is_ok());
        assert_eq!(response.body().as_ref(), b"Offline");
    }
}
