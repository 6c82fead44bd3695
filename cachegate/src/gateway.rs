//! The cache gateway.

use std::sync::{Mutex, PoisonError};

use cachegate_backend::{CacheStorage, SharedStore, Store};
use cachegate_core::{
    CacheEntry, Category, Classifier, Clients, FetchError, Fetcher, GatewayRequest, NoopClients,
    Partition, RequestKey, ResponseData, ResponseSource, request::resolve,
};
use futures::future::try_join_all;
use http::{Method, Uri};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::lifecycle::{ActivationReport, InstallReport, LifecycleState};
use crate::message::{ControlMessage, ControlReply, VersionReply};
use crate::metrics;
use crate::notification::{ClickOutcome, Notification, PushPayload};
use crate::policy::Strategy;

/// A response produced by the gateway and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    /// The response to hand to the caller.
    pub response: ResponseData,
    /// Where the response came from.
    pub source: ResponseSource,
}

impl Served {
    pub(crate) fn network(response: ResponseData) -> Self {
        Self {
            response,
            source: ResponseSource::Network,
        }
    }

    pub(crate) fn cached(response: ResponseData, store: &SharedStore) -> Self {
        Self {
            response,
            source: ResponseSource::Cache(store.name().clone()),
        }
    }
}

/// What the gateway decided to do with a request.
#[derive(Debug)]
pub enum Interception {
    /// Not handled: the caller sends the request to the network itself.
    Passthrough(GatewayRequest),
    /// Answered by the gateway.
    Respond(Served),
}

impl Interception {
    /// The served response, if the request was intercepted.
    pub fn served(self) -> Option<Served> {
        match self {
            Interception::Respond(served) => Some(served),
            Interception::Passthrough(_) => None,
        }
    }
}

/// Offline-first cache gateway.
///
/// A gateway owns its storage, network and clients handles together with the
/// configuration and the lifecycle state of one version. It is `Send + Sync`
/// and meant to be shared behind an `Arc`.
///
/// Requests are only intercepted once the gateway is
/// [`Active`](LifecycleState::Active), i.e. after [`install`](Self::install)
/// and [`activate`](Self::activate) (or [`start`](Self::start)).
pub struct Gateway<S, F, C = NoopClients> {
    pub(crate) config: GatewayConfig,
    pub(crate) classifier: Classifier,
    pub(crate) origin: Uri,
    pub(crate) storage: S,
    pub(crate) fetcher: F,
    clients: C,
    state: Mutex<LifecycleState>,
}

impl Gateway<NotSet, NotSet, NoopClients> {
    /// Creates a new [`GatewayBuilder`].
    pub fn builder() -> GatewayBuilder<NotSet, NotSet, NoopClients> {
        GatewayBuilder::new()
    }
}

impl<S, F, C> Gateway<S, F, C>
where
    S: CacheStorage,
    F: Fetcher,
    C: Clients,
{
    /// The configured version string.
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// The configuration this gateway runs with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The origin as a parsed URI.
    pub fn origin(&self) -> &Uri {
        &self.origin
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Category of `uri`. Pure; performs no I/O.
    pub fn classify(&self, uri: &Uri) -> Category {
        self.classifier.classify(uri)
    }

    /// Decides how to answer `request`.
    ///
    /// Non-GET requests, non-HTTP(S) URLs and every request reaching a
    /// gateway that is not active are passed through. Anything else always
    /// resolves to a response: from the network, from a store, or from the
    /// fallback chain.
    pub async fn handle(&self, request: GatewayRequest) -> Interception {
        if request.method() != Method::GET || !request.is_http() {
            return Interception::Passthrough(request);
        }
        let state = self.state();
        if state != LifecycleState::Active {
            debug!(%state, url = %request.uri(), "gateway not active, passing through");
            return Interception::Passthrough(request);
        }

        let category = self.classify(request.uri());
        let span = info_span!(
            "cachegate.handle",
            category = category.as_str(),
            url = %request.uri(),
        );
        let served = self.respond(category, &request).instrument(span).await;
        metrics::record_request(category, &served.source);
        Interception::Respond(served)
    }

    async fn respond(&self, category: Category, request: &GatewayRequest) -> Served {
        let strategy = Strategy::for_category(category, &self.config);
        match self.apply(strategy, category, request).await {
            Ok(served) => {
                debug!(source = served.source.as_str(), status = %served.response.status(), "served");
                served
            }
            Err(error) => {
                let store = self.config.store_name(strategy.partition());
                warn!(%error, %store, "strategy failed, using fallback");
                self.fallback(request).await
            }
        }
    }

    /// Precaches the manifest.
    ///
    /// Every essential URL must fetch with a 2xx status before any of them is
    /// written; otherwise the static store is left untouched, the gateway
    /// becomes [`Redundant`](LifecycleState::Redundant) and the error is
    /// returned. Secondary URLs are cached best-effort afterwards.
    pub async fn install(&self) -> GatewayResult<InstallReport> {
        self.transition(LifecycleState::Parsed, LifecycleState::Installing)?;
        let span = info_span!("cachegate.install", version = %self.config.version);

        match self.precache().instrument(span).await {
            Ok(report) => {
                self.set_state(LifecycleState::Installed);
                info!(
                    cached = report.cached.len(),
                    skipped = report.skipped.len(),
                    "gateway installed"
                );
                Ok(report)
            }
            Err(err) => {
                error!(error = %err, "install failed");
                self.set_state(LifecycleState::Redundant);
                Err(err)
            }
        }
    }

    async fn precache(&self) -> GatewayResult<InstallReport> {
        let store = self.open(Partition::StaticAssets).await?;

        let essential = self.fetch_all(&self.config.manifest.essential).await?;
        let mut cached: Vec<String> = essential.iter().map(|(key, _)| key.url().to_owned()).collect();
        store.write_all(essential).await?;
        info!(count = cached.len(), "essential assets cached");

        let mut skipped = Vec::new();
        for reference in &self.config.manifest.secondary {
            match self.fetch_one(reference).await {
                Ok((key, entry)) => {
                    cached.push(key.url().to_owned());
                    store.write(key, entry).await?;
                }
                Err(err) => {
                    warn!(url = %reference, error = %err, "skipping secondary asset");
                    skipped.push(reference.clone());
                }
            }
        }
        self.trim(&store, Partition::StaticAssets).await?;

        Ok(InstallReport {
            cached,
            skipped,
            skip_waiting: true,
        })
    }

    /// Deletes every store of this gateway's scheme that belongs to another
    /// version, then claims the open clients.
    ///
    /// If listing or deleting stores fails the gateway goes back to
    /// [`Installed`](LifecycleState::Installed) so activation can be retried.
    pub async fn activate(&self) -> GatewayResult<ActivationReport> {
        self.transition(LifecycleState::Installed, LifecycleState::Activating)?;
        let span = info_span!("cachegate.activate", version = %self.config.version);

        match self.cleanup().instrument(span).await {
            Ok(report) => {
                self.clients.claim().await;
                self.set_state(LifecycleState::Active);
                info!(deleted = report.deleted.len(), "gateway activated");
                Ok(report)
            }
            Err(err) => {
                error!(error = %err, "activation failed");
                self.set_state(LifecycleState::Installed);
                Err(err)
            }
        }
    }

    async fn cleanup(&self) -> GatewayResult<ActivationReport> {
        let prefix = self.config.prefix.as_str();
        let current = self.config.version.as_str();
        let mut deleted = Vec::new();

        for name in self.storage.names().await? {
            if !name.belongs_to(prefix) || name.version(prefix) == Some(current) {
                continue;
            }
            if self.storage.delete(&name).await? {
                info!(store = %name, "deleted old store");
                deleted.push(name.to_string());
            }
        }
        Ok(ActivationReport { deleted })
    }

    /// Installs and activates in one go.
    pub async fn start(&self) -> GatewayResult<InstallReport> {
        let report = self.install().await?;
        self.activate().await?;
        Ok(report)
    }

    /// Answers a control message.
    ///
    /// `GET_VERSION` replies with the version. `CACHE_UPDATE` re-fetches the
    /// whole manifest into the static store, writing nothing unless every
    /// URL succeeds, and sends no reply.
    pub async fn handle_message(&self, message: ControlMessage) -> GatewayResult<Option<ControlReply>> {
        match message {
            ControlMessage::GetVersion => Ok(Some(ControlReply::Version(VersionReply {
                version: self.config.version.clone(),
            }))),
            ControlMessage::CacheUpdate => {
                let manifest = &self.config.manifest;
                let references: Vec<String> = manifest
                    .essential
                    .iter()
                    .chain(&manifest.secondary)
                    .cloned()
                    .collect();
                let entries = self.fetch_all(&references).await?;
                let count = entries.len();
                let store = self.open(Partition::StaticAssets).await?;
                store.write_all(entries).await?;
                self.trim(&store, Partition::StaticAssets).await?;
                info!(count, "manifest refreshed");
                Ok(None)
            }
        }
    }

    /// Turns a push message into the notification to display.
    pub fn push(&self, payload: PushPayload) -> Notification {
        Notification::from_payload(payload, &self.config.notification)
    }

    /// Reacts to a click on `notification`.
    ///
    /// The `view` action opens the notification URL; anything else just
    /// closes it.
    pub async fn notification_click(
        &self,
        action: Option<&str>,
        notification: &Notification,
    ) -> GatewayResult<ClickOutcome> {
        if action != Some(Notification::VIEW_ACTION) {
            return Ok(ClickOutcome::Closed);
        }
        let url = resolve(&self.origin, &notification.data.url)?;
        self.clients.open_window(&url).await;
        Ok(ClickOutcome::Opened(url))
    }

    /// Fetches every reference, failing on the first error or non-2xx status.
    async fn fetch_all(&self, references: &[String]) -> GatewayResult<Vec<(RequestKey, CacheEntry)>> {
        try_join_all(references.iter().map(|reference| async move {
            self.fetch_one(reference)
                .await
                .map_err(|err| GatewayError::EssentialAsset {
                    url: reference.clone(),
                    reason: err.to_string(),
                })
        }))
        .await
    }

    async fn fetch_one(&self, reference: &str) -> Result<(RequestKey, CacheEntry), FetchError> {
        let uri = resolve(&self.origin, reference)?;
        let request = GatewayRequest::get(uri);
        let response = self.fetch(Category::Static, &request).await?;
        if !response.is_ok() {
            return Err(FetchError::network(BadStatus(response.status())));
        }
        Ok((request.key(), CacheEntry::new(response)))
    }

    async fn trim(&self, store: &SharedStore, partition: Partition) -> GatewayResult<()> {
        if let Some(max) = self.config.max_entries(partition) {
            let evicted = store.trim(max).await?;
            metrics::record_evictions(store.name(), evicted);
        }
        Ok(())
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> GatewayResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return Err(GatewayError::InvalidState {
                expected: from,
                actual: *state,
            });
        }
        *state = to;
        info!(from = %from, to = %to, "lifecycle transition");
        Ok(())
    }

    fn set_state(&self, to: LifecycleState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        info!(from = %*state, to = %to, "lifecycle transition");
        *state = to;
    }
}

#[derive(Debug)]
struct BadStatus(http::StatusCode);

impl std::fmt::Display for BadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unexpected status {}", self.0)
    }
}

impl std::error::Error for BadStatus {}

/// Marker type for unset builder fields.
///
/// When you see `NotSet` in a compiler error, the corresponding builder
/// method has not been called yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotSet;

/// Builder for [`Gateway`].
///
/// ```
/// use cachegate::{Gateway, GatewayConfig};
/// # use cachegate_core::{Fetcher, FetchResult, GatewayRequest, ResponseData};
/// # struct Network;
/// # #[async_trait::async_trait]
/// # impl Fetcher for Network {
/// #     async fn fetch(&self, _: &GatewayRequest) -> FetchResult { Ok(ResponseData::ok("")) }
/// # }
/// # let storage = cachegate_memory::MemoryStorage::new();
///
/// let gateway = Gateway::builder()
///     .config(GatewayConfig::default())
///     .storage(storage)
///     .fetcher(Network)
///     .build()
///     .unwrap();
/// assert_eq!(gateway.version(), "1.0.0");
/// ```
pub struct GatewayBuilder<S, F, C> {
    config: GatewayConfig,
    storage: S,
    fetcher: F,
    clients: C,
}

impl GatewayBuilder<NotSet, NotSet, NoopClients> {
    /// Creates a builder with the default configuration and no-op clients.
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            storage: NotSet,
            fetcher: NotSet,
            clients: NoopClients,
        }
    }
}

impl Default for GatewayBuilder<NotSet, NotSet, NoopClients> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, F, C> GatewayBuilder<S, F, C> {
    /// Sets the configuration.
    pub fn config(self, config: GatewayConfig) -> Self {
        Self { config, ..self }
    }

    /// Sets the store collection.
    pub fn storage<NewS>(self, storage: NewS) -> GatewayBuilder<NewS, F, C> {
        GatewayBuilder {
            config: self.config,
            storage,
            fetcher: self.fetcher,
            clients: self.clients,
        }
    }

    /// Sets the network.
    pub fn fetcher<NewF>(self, fetcher: NewF) -> GatewayBuilder<S, NewF, C> {
        GatewayBuilder {
            config: self.config,
            storage: self.storage,
            fetcher,
            clients: self.clients,
        }
    }

    /// Sets the page handle used by activation and notification clicks.
    pub fn clients<NewC>(self, clients: NewC) -> GatewayBuilder<S, F, NewC> {
        GatewayBuilder {
            config: self.config,
            storage: self.storage,
            fetcher: self.fetcher,
            clients,
        }
    }
}

impl<S, F, C> GatewayBuilder<S, F, C>
where
    S: CacheStorage,
    F: Fetcher,
    C: Clients,
{
    /// Validates the configuration and builds a gateway in the
    /// [`Parsed`](LifecycleState::Parsed) state.
    pub fn build(self) -> GatewayResult<Gateway<S, F, C>> {
        self.config.validate()?;
        let origin = self.config.origin_uri()?;
        let classifier = self.config.classifier()?;
        Ok(Gateway {
            config: self.config,
            classifier,
            origin,
            storage: self.storage,
            fetcher: self.fetcher,
            clients: self.clients,
            state: Mutex::new(LifecycleState::Parsed),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use cachegate_core::{FetchResult, ResponseData, StoreName};
    use cachegate_memory::MemoryStorage;
    use http::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Serves `<path>` as body for every URL, except paths listed as failing.
    #[derive(Default)]
    struct EchoNetwork {
        failing: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for EchoNetwork {
        async fn fetch(&self, request: &GatewayRequest) -> FetchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let path = request.uri().path().to_owned();
            if self.failing.iter().any(|p| *p == path) {
                return Err(FetchError::network(std::io::Error::other("offline")));
            }
            Ok(ResponseData::ok(path))
        }
    }

    fn config() -> GatewayConfig {
        GatewayConfig {
            origin: "https://example.com".into(),
            ..Default::default()
        }
    }

    fn gateway(network: EchoNetwork) -> Gateway<MemoryStorage, Arc<EchoNetwork>> {
        Gateway::builder()
            .config(config())
            .storage(MemoryStorage::new())
            .fetcher(Arc::new(network))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn passes_through_until_active() {
        let gateway = gateway(EchoNetwork::default());
        let request = GatewayRequest::get("https://example.com/css/style.css".parse().unwrap());

        assert!(matches!(
            gateway.handle(request).await,
            Interception::Passthrough(_)
        ));
    }

    #[tokio::test]
    async fn passes_through_non_get() {
        let gateway = gateway(EchoNetwork::default());
        gateway.start().await.unwrap();
        let request = GatewayRequest::new(Method::POST, "https://example.com/api/contact".parse().unwrap());

        match gateway.handle(request).await {
            Interception::Passthrough(request) => assert_eq!(request.method(), Method::POST),
            other => panic!("expected passthrough, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn install_then_activate() {
        let gateway = gateway(EchoNetwork::default());
        assert_eq!(gateway.state(), LifecycleState::Parsed);

        let report = gateway.install().await.unwrap();
        assert_eq!(gateway.state(), LifecycleState::Installed);
        assert!(report.skip_waiting);
        assert_eq!(report.cached.len(), 11);
        assert!(report.skipped.is_empty());

        gateway.activate().await.unwrap();
        assert_eq!(gateway.state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn lifecycle_steps_out_of_order_fail() {
        let gateway = gateway(EchoNetwork::default());

        let err = gateway.activate().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InvalidState {
                expected: LifecycleState::Installed,
                actual: LifecycleState::Parsed,
            }
        ));

        gateway.start().await.unwrap();
        assert!(gateway.install().await.is_err());
        assert_eq!(gateway.state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn secondary_failures_are_skipped() {
        let gateway = gateway(EchoNetwork {
            failing: vec!["/manifest.json"],
            ..Default::default()
        });

        let report = gateway.install().await.unwrap();
        assert_eq!(report.skipped, vec!["/manifest.json".to_owned()]);
        assert_eq!(report.cached.len(), 10);
    }

    #[tokio::test]
    async fn essential_failure_makes_gateway_redundant() {
        let gateway = gateway(EchoNetwork {
            failing: vec!["/js/particles.js"],
            ..Default::default()
        });

        let err = gateway.install().await.unwrap_err();
        match err {
            GatewayError::EssentialAsset { url, .. } => assert_eq!(url, "/js/particles.js"),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(gateway.state(), LifecycleState::Redundant);

        let store = gateway
            .storage()
            .open(&gateway.config().store_name(Partition::StaticAssets))
            .await
            .unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn version_reply() {
        let gateway = gateway(EchoNetwork::default());
        let reply = gateway.handle_message(ControlMessage::GetVersion).await.unwrap();
        assert_eq!(
            reply,
            Some(ControlReply::Version(VersionReply {
                version: "1.0.0".into()
            }))
        );
    }

    #[tokio::test]
    async fn cache_update_refreshes_manifest() {
        let gateway = gateway(EchoNetwork::default());
        gateway.start().await.unwrap();
        let before = gateway.fetcher.calls.load(Ordering::SeqCst);

        let reply = gateway.handle_message(ControlMessage::CacheUpdate).await.unwrap();

        assert_eq!(reply, None);
        assert_eq!(gateway.fetcher.calls.load(Ordering::SeqCst) - before, 11);
    }

    #[tokio::test]
    async fn activation_keeps_foreign_and_current_stores() {
        let gateway = gateway(EchoNetwork::default());
        let storage = gateway.storage().clone();
        for name in [
            "ghp-static-assets-v0.9.0",
            "ghp-images-v0.9.0",
            "ghp-images-cache",
            "ghp-images-v1.0.0",
            "other-app-v0.1",
        ] {
            storage.open(&StoreName::from(name)).await.unwrap();
        }

        gateway.install().await.unwrap();
        let report = gateway.activate().await.unwrap();

        assert_eq!(
            report.deleted,
            vec!["ghp-images-cache", "ghp-images-v0.9.0", "ghp-static-assets-v0.9.0"]
        );
        let names: Vec<String> = storage
            .names()
            .await
            .unwrap()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["ghp-images-v1.0.0", "ghp-static-assets-v1.0.0", "other-app-v0.1"]
        );
    }

    #[tokio::test]
    async fn non_success_is_returned_but_not_stored() {
        struct NotFound;

        #[async_trait]
        impl Fetcher for NotFound {
            async fn fetch(&self, _request: &GatewayRequest) -> FetchResult {
                Ok(ResponseData::new(StatusCode::NOT_FOUND, Default::default(), "missing"))
            }
        }

        let mut config = config();
        config.manifest.essential.clear();
        config.manifest.secondary.clear();
        let gateway = Gateway::builder()
            .config(config)
            .storage(MemoryStorage::new())
            .fetcher(NotFound)
            .build()
            .unwrap();
        gateway.start().await.unwrap();

        let request = GatewayRequest::get("https://example.com/css/missing.css".parse().unwrap());
        let served = gateway.handle(request).await.served().unwrap();

        assert_eq!(served.response.status(), StatusCode::NOT_FOUND);
        assert_eq!(served.source, ResponseSource::Network);
        let store = gateway.open(Partition::StaticAssets).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
