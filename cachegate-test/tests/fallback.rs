use cachegate::fallback::IMAGE_PLACEHOLDER_SVG;
use cachegate::{GatewayConfig, ResponseData, ResponseSource};
use cachegate_backend::{CacheStorage, Store};
use cachegate_core::{CacheEntry, Partition};
use cachegate_test::{Harness, test_config};
use http::StatusCode;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn offline_image_gets_placeholder() {
    let harness = Harness::active(test_config()).await;
    harness.network.set_offline(true);

    let served = harness.get("/assets/images/avatar.png").await;

    assert_eq!(served.source, ResponseSource::Fallback);
    assert_eq!(served.response.status(), StatusCode::OK);
    assert_eq!(served.response.content_type(), Some("image/svg+xml"));
    assert_eq!(served.response.body().as_ref(), IMAGE_PLACEHOLDER_SVG.as_bytes());
}

#[tokio::test]
async fn offline_navigation_gets_offline_document() {
    let harness = Harness::active(test_config()).await;
    harness.network.set_offline(true);

    let served = harness.navigate("/projects/42").await;

    assert_eq!(served.source, ResponseSource::Fallback);
    assert_eq!(served.response.status(), StatusCode::OK);
    assert_eq!(
        served.response.body().as_ref(),
        b"https://example.com/index.html"
    );
}

#[tokio::test]
async fn offline_navigation_without_document_gets_text() {
    let config = GatewayConfig {
        offline_document: "/offline.html".into(),
        ..test_config()
    };
    let harness = Harness::active(config).await;
    harness.network.set_offline(true);

    let served = harness.navigate("/projects/42").await;

    assert_eq!(served.source, ResponseSource::Fallback);
    assert_eq!(served.response.status(), StatusCode::OK);
    assert_eq!(served.response.body().as_ref(), b"Offline");
}

#[tokio::test]
async fn offline_subresource_gets_network_error() {
    let harness = Harness::active(test_config()).await;
    harness.network.set_offline(true);

    let served = harness.get("/fonts/inter.woff2").await;

    assert_eq!(served.source, ResponseSource::Fallback);
    assert_eq!(served.response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(served.response.body().as_ref(), b"Network Error");
}

#[tokio::test]
async fn offline_default_request_reads_static_store() {
    let harness = Harness::active(test_config()).await;
    let store = harness
        .storage
        .open(&harness.store_name(Partition::StaticAssets))
        .await
        .unwrap();
    store
        .write(
            harness.key("/about"),
            CacheEntry::new(ResponseData::ok("about page")),
        )
        .await
        .unwrap();
    harness.network.set_offline(true);

    let served = harness.navigate("/about").await;

    assert_eq!(
        served.source,
        ResponseSource::Cache(harness.store_name(Partition::StaticAssets))
    );
    assert_eq!(served.response.body().as_ref(), b"about page");
}

#[tokio::test]
async fn offline_static_miss_uses_fallback() {
    let harness = Harness::active(test_config()).await;
    harness.network.set_offline(true);

    let script = harness.get("/js/never-cached.js").await;
    let page = harness.navigate("/blog/post.html").await;

    assert_eq!(script.response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(page.source, ResponseSource::Fallback);
    assert_eq!(page.response.body().as_ref(), b"https://example.com/index.html");
}

#[tokio::test]
async fn fallback_never_creates_the_static_store() {
    let harness = Harness::active(test_config()).await;
    harness
        .storage
        .delete(&harness.store_name(Partition::StaticAssets))
        .await
        .unwrap();
    harness.network.set_offline(true);

    let served = harness.navigate("/about").await;

    assert_eq!(served.response.body().as_ref(), b"Offline");
    assert!(
        !harness
            .storage
            .has(&harness.store_name(Partition::StaticAssets))
            .await
            .unwrap()
    );
}
