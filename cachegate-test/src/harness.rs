//! A gateway wired to the mocks of this crate.

use std::sync::Arc;

use cachegate::{Gateway, GatewayConfig, Interception, Served};
use cachegate_backend::{CacheStorage, Store};
use cachegate_core::{GatewayRequest, Partition, RequestKey, StoreName, request::resolve};
use cachegate_memory::MemoryStorage;
use http::Uri;

use crate::{MockNetwork, RecordingClients};

pub const ORIGIN: &str = "https://example.com";

pub type TestGateway = Gateway<MemoryStorage, Arc<MockNetwork>, Arc<RecordingClients>>;

/// Default configuration served from [`ORIGIN`].
pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        origin: ORIGIN.to_owned(),
        ..Default::default()
    }
}

pub struct Harness {
    pub gateway: TestGateway,
    pub network: Arc<MockNetwork>,
    pub clients: Arc<RecordingClients>,
    pub storage: MemoryStorage,
}

impl Harness {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_storage(config, MemoryStorage::new())
    }

    /// Builds a gateway over an existing storage, e.g. one left behind by an
    /// older version.
    pub fn with_storage(config: GatewayConfig, storage: MemoryStorage) -> Self {
        let network = Arc::new(MockNetwork::new());
        let clients = Arc::new(RecordingClients::new());
        let gateway = Gateway::builder()
            .config(config)
            .storage(storage.clone())
            .fetcher(network.clone())
            .clients(clients.clone())
            .build()
            .expect("valid test config");
        Self {
            gateway,
            network,
            clients,
            storage,
        }
    }

    /// An installed and activated gateway with a clean call log.
    pub async fn active(config: GatewayConfig) -> Self {
        let harness = Self::new(config);
        harness.gateway.start().await.expect("gateway starts");
        harness.network.reset_calls();
        harness
    }

    /// Absolute URL for `reference`.
    pub fn url(&self, reference: &str) -> Uri {
        let origin: Uri = self.gateway.config().origin.parse().expect("valid origin");
        resolve(&origin, reference).expect("valid reference")
    }

    /// Sends a sub-resource GET and returns the gateway's answer.
    pub async fn get(&self, reference: &str) -> Served {
        self.respond(GatewayRequest::get(self.url(reference))).await
    }

    /// Sends a navigation GET and returns the gateway's answer.
    pub async fn navigate(&self, reference: &str) -> Served {
        self.respond(GatewayRequest::navigate(self.url(reference)))
            .await
    }

    async fn respond(&self, request: GatewayRequest) -> Served {
        match self.gateway.handle(request).await {
            Interception::Respond(served) => served,
            Interception::Passthrough(request) => {
                panic!("{} was passed through", request.uri())
            }
        }
    }

    pub fn store_name(&self, partition: Partition) -> StoreName {
        self.gateway.config().store_name(partition)
    }

    /// URLs stored in `partition`, oldest first. Empty if the store does not exist.
    pub async fn stored_urls(&self, partition: Partition) -> Vec<String> {
        let name = self.store_name(partition);
        if !self.storage.has(&name).await.unwrap() {
            return Vec::new();
        }
        let store = self.storage.open(&name).await.unwrap();
        store
            .keys()
            .await
            .unwrap()
            .iter()
            .map(|key| key.url().to_owned())
            .collect()
    }

    /// Store key of a GET for `reference`.
    pub fn key(&self, reference: &str) -> RequestKey {
        RequestKey::get(&self.url(reference))
    }
}
