//! A scripted network.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cachegate_core::{FetchError, FetchResult, Fetcher, GatewayRequest, ResponseData};
use dashmap::DashMap;
use http::StatusCode;

/// Error returned by [`MockNetwork`] while offline.
#[derive(Debug, thiserror::Error)]
#[error("network unreachable")]
pub struct Unreachable;

/// [`Fetcher`] that answers from a table instead of the network.
///
/// Unscripted URLs answer `200` with the URL as body, so a whole manifest can
/// be installed without scripting every entry.
#[derive(Debug, Default)]
pub struct MockNetwork {
    routes: DashMap<String, ResponseData>,
    failing: DashMap<String, ()>,
    offline: AtomicBool,
    latency: Mutex<Option<Duration>>,
    calls: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `url` with `response` from now on.
    pub fn respond(&self, url: &str, response: ResponseData) -> &Self {
        self.routes.insert(url.to_owned(), response);
        self
    }

    /// Makes `url` fail as if the host could not be reached.
    pub fn fail(&self, url: &str) -> &Self {
        self.failing.insert(url.to_owned(), ());
        self
    }

    /// Makes every fetch fail.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delays every answer by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap() = latency;
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// How many times `url` was fetched.
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| *call == url)
            .count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Fetcher for MockNetwork {
    async fn fetch(&self, request: &GatewayRequest) -> FetchResult {
        let url = request.uri().to_string();
        self.calls.lock().unwrap().push(url.clone());

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.offline.load(Ordering::SeqCst) || self.failing.contains_key(&url) {
            return Err(FetchError::network(Unreachable));
        }
        match self.routes.get(&url) {
            Some(response) => Ok(response.value().clone()),
            None => Ok(ResponseData::new(
                StatusCode::OK,
                Default::default(),
                url.into_bytes(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_unscripted_urls() {
        let network = MockNetwork::new();
        let request = GatewayRequest::get("https://example.com/a.css".parse().unwrap());

        let response = network.fetch(&request).await.unwrap();
        assert_eq!(response.body().as_ref(), b"https://example.com/a.css");
        assert_eq!(network.calls_to("https://example.com/a.css"), 1);
    }

    #[tokio::test]
    async fn offline_fails_but_counts() {
        let network = MockNetwork::new();
        network.set_offline(true);
        let request = GatewayRequest::get("https://example.com/".parse().unwrap());

        assert!(matches!(
            network.fetch(&request).await,
            Err(FetchError::Network(_))
        ));
        assert_eq!(network.call_count(), 1);
    }
}
