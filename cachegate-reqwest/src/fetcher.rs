//! Network access over reqwest.

use async_trait::async_trait;
use cachegate_core::{FetchError, FetchResult, Fetcher, GatewayRequest, ResponseData};
use tracing::trace;

/// [`Fetcher`] backed by a [`reqwest::Client`].
///
/// Responses are buffered completely. Every status, including 4xx and 5xx,
/// is returned as a response; only transport failures become
/// [`FetchError::Network`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Wraps `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The wrapped client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: &GatewayRequest) -> FetchResult {
        let url = request.uri().to_string();
        trace!(method = %request.method(), %url, "fetching");

        let response = self
            .client
            .request(request.method().clone(), url.as_str())
            .headers(request.headers().clone())
            .send()
            .await
            .map_err(FetchError::network)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(FetchError::network)?;
        Ok(ResponseData::new(status, headers, body))
    }
}
