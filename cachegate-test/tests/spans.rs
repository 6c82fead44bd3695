use cachegate_test::tracing::capture_spans;
use cachegate_test::{Harness, test_config};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn each_category_runs_its_strategy() {
    let harness = Harness::active(test_config()).await;

    let ((), collector) = capture_spans(async {
        harness.get("/css/style.css").await;
        harness.get("/images/me.webp").await;
        harness.get("/api/projects").await;
        harness.get("https://unpkg.com/aos@2.3.1/dist/aos.css").await;
        harness.navigate("/about").await;
    })
    .await;

    assert_eq!(
        collector.strategies_per_request(),
        vec![
            vec!["CacheFirst"],
            vec!["CacheFirstWithTtl"],
            vec!["NetworkFirst"],
            vec!["CacheFirst"],
            vec!["NetworkFirstReadOnly"],
        ]
    );
}

#[tokio::test]
async fn handle_span_records_category() {
    let harness = Harness::active(test_config()).await;

    let (_, collector) = capture_spans(harness.get("/api/projects")).await;

    collector.assert_has_spans(&["cachegate.handle", "strategy.NetworkFirst"]);
    assert_eq!(
        collector.get_field("cachegate.handle", "category"),
        Some("api".to_string())
    );
}

#[tokio::test]
async fn lifecycle_steps_are_traced() {
    let harness = Harness::new(test_config());

    let (result, collector) = capture_spans(harness.gateway.start()).await;

    result.unwrap();
    collector.assert_has_spans(&["cachegate.install", "cachegate.activate"]);
    assert!(!collector.has_span("cachegate.handle"));
}
