use cachegate::{ClickOutcome, Notification, PushPayload};
use cachegate_test::{Harness, test_config};
use http::Uri;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn push_text_becomes_notification_body() {
    let harness = Harness::active(test_config()).await;

    let notification = harness.gateway.push(PushPayload::text("New project added"));

    assert_eq!(notification.title, "Portfolio Update");
    assert_eq!(notification.body, "New project added");
    assert_eq!(notification.vibrate, vec![200, 100, 200]);
    let actions: Vec<&str> = notification
        .actions
        .iter()
        .map(|action| action.action.as_str())
        .collect();
    assert_eq!(
        actions,
        vec![Notification::VIEW_ACTION, Notification::CLOSE_ACTION]
    );
}

#[tokio::test]
async fn empty_push_uses_default_body() {
    let harness = Harness::active(test_config()).await;

    let notification = harness.gateway.push(PushPayload::default());

    assert_eq!(notification.body, "New update available!");
}

#[tokio::test]
async fn view_click_opens_a_window() {
    let harness = Harness::active(test_config()).await;
    let notification = harness.gateway.push(PushPayload::default());

    let outcome = harness
        .gateway
        .notification_click(Some("view"), &notification)
        .await
        .unwrap();

    let home: Uri = "https://example.com/".parse().unwrap();
    assert_eq!(outcome, ClickOutcome::Opened(home.clone()));
    assert_eq!(harness.clients.opened(), vec![home]);
}

#[tokio::test]
async fn other_clicks_only_close() {
    let harness = Harness::active(test_config()).await;
    let notification = harness.gateway.push(PushPayload::default());

    for action in [Some("close"), None] {
        let outcome = harness
            .gateway
            .notification_click(action, &notification)
            .await
            .unwrap();
        assert_eq!(outcome, ClickOutcome::Closed);
    }
    assert!(harness.clients.opened().is_empty());
}
