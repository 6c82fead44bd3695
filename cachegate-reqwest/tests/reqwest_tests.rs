//! Integration tests for the reqwest fetcher and middleware using wiremock.

use std::sync::Arc;

use cachegate::{Gateway, GatewayConfig, LifecycleState};
use cachegate_core::{FetchError, Fetcher, GatewayRequest};
use cachegate_memory::MemoryStorage;
use cachegate_reqwest::{CACHE_SOURCE_HEADER, GatewayMiddleware, ReqwestFetcher};
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ESSENTIAL: [&str; 5] = ["/", "/index.html", "/css/style.css", "/js/main.js", "/js/particles.js"];

fn config(origin: &str) -> GatewayConfig {
    GatewayConfig::from_yaml_str(&format!(
        r#"
version: "1.0.0"
prefix: ghp
origin: "{origin}"
manifest:
  secondary: []
"#
    ))
    .unwrap()
}

async fn mount_essentials(server: &MockServer) {
    for asset in ESSENTIAL {
        Mock::given(method("GET"))
            .and(path(asset))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("body of {asset}")))
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn fetcher_buffers_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"stars":42}"#)
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(Client::new());
    let request = GatewayRequest::get(format!("{}/api/stats", server.uri()).parse().unwrap());
    let response = fetcher.fetch(&request).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.body().as_ref(), br#"{"stars":42}"#);
}

#[tokio::test]
async fn fetcher_returns_error_statuses_as_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::default();
    let request = GatewayRequest::get(format!("{}/missing.png", server.uri()).parse().unwrap());
    let response = fetcher.fetch(&request).await.unwrap();

    assert_eq!(response.status(), 404);
    assert!(!response.is_ok());
}

#[tokio::test]
async fn fetcher_reports_unreachable_network() {
    let server = MockServer::start().await;
    let uri = format!("{}/css/style.css", server.uri());
    drop(server);

    let fetcher = ReqwestFetcher::default();
    let err = fetcher
        .fetch(&GatewayRequest::get(uri.parse().unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn middleware_serves_precached_assets() {
    let server = MockServer::start().await;
    mount_essentials(&server).await;

    let gateway = Arc::new(
        Gateway::builder()
            .config(config(&server.uri()))
            .storage(MemoryStorage::new())
            .fetcher(ReqwestFetcher::default())
            .build()
            .unwrap(),
    );
    gateway.start().await.unwrap();
    assert_eq!(gateway.state(), LifecycleState::Active);

    let client = ClientBuilder::new(Client::new())
        .with(GatewayMiddleware::new(gateway))
        .build();

    // precached at install, so neither request reaches the server again
    for _ in 0..2 {
        let response = client
            .get(format!("{}/css/style.css", server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers().get(CACHE_SOURCE_HEADER).unwrap(), "cache");
        assert_eq!(response.text().await.unwrap(), "body of /css/style.css");
    }
}

#[tokio::test]
async fn middleware_passes_post_down_the_chain() {
    let server = MockServer::start().await;
    mount_essentials(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Arc::new(
        Gateway::builder()
            .config(config(&server.uri()))
            .storage(MemoryStorage::new())
            .fetcher(ReqwestFetcher::default())
            .build()
            .unwrap(),
    );
    gateway.start().await.unwrap();
    let client = ClientBuilder::new(Client::new())
        .with(GatewayMiddleware::new(gateway))
        .build();

    let response = client
        .post(format!("{}/api/contact", server.uri()))
        .body("hello")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    assert!(response.headers().get(CACHE_SOURCE_HEADER).is_none());
}

#[tokio::test]
async fn middleware_falls_back_when_offline() {
    let server = MockServer::start().await;
    mount_essentials(&server).await;
    let origin = server.uri();

    let gateway = Arc::new(
        Gateway::builder()
            .config(config(&origin))
            .storage(MemoryStorage::new())
            .fetcher(ReqwestFetcher::default())
            .build()
            .unwrap(),
    );
    gateway.start().await.unwrap();
    let client = ClientBuilder::new(Client::new())
        .with(GatewayMiddleware::new(gateway))
        .build();
    server.verify().await;
    drop(server);

    let response = client
        .get(format!("{origin}/assets/images/avatar.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get(CACHE_SOURCE_HEADER).unwrap(), "fallback");
    assert_eq!(response.headers().get("content-type").unwrap(), "image/svg+xml");
}
