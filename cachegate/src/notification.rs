//! Push notifications.

use http::Uri;
use serde::{Deserialize, Serialize};

use crate::config::NotificationConfig;

/// Content of a push message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    /// Text to show, if the message carried any.
    pub text: Option<String>,
}

impl PushPayload {
    /// A payload carrying `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[allow(missing_docs)]
    pub title: String,
    /// Payload text, or the configured default.
    pub body: String,
    /// Icon URL.
    pub icon: String,
    /// Badge URL.
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    #[allow(missing_docs)]
    pub data: NotificationData,
    /// `view` and `close` buttons.
    pub actions: Vec<NotificationAction>,
}

/// Data attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Page opened by the `view` action.
    pub url: String,
}

/// A button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Identifier reported back on click.
    pub action: String,
    /// Button label.
    pub title: String,
}

impl Notification {
    /// Action that opens the notification URL.
    pub const VIEW_ACTION: &'static str = "view";
    /// Action that only dismisses the notification.
    pub const CLOSE_ACTION: &'static str = "close";

    /// Builds the notification for `payload`.
    pub fn from_payload(payload: PushPayload, config: &NotificationConfig) -> Self {
        Self {
            title: config.title.clone(),
            body: payload
                .text
                .unwrap_or_else(|| config.default_body.clone()),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData {
                url: config.url.clone(),
            },
            actions: vec![
                NotificationAction {
                    action: Self::VIEW_ACTION.to_owned(),
                    title: "View Portfolio".to_owned(),
                },
                NotificationAction {
                    action: Self::CLOSE_ACTION.to_owned(),
                    title: "Close".to_owned(),
                },
            ],
        }
    }
}

/// What a notification click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A page was opened at this URL.
    Opened(Uri),
    /// The notification was dismissed.
    Closed,
}
