//! Control messages exchanged with pages.
//!
//! Messages arrive as JSON objects tagged by `type`:
//!
//! ```
//! use cachegate::{ControlMessage, ControlReply, VersionReply};
//!
//! let message: ControlMessage = serde_json::from_str(r#"{"type":"GET_VERSION"}"#).unwrap();
//! assert_eq!(message, ControlMessage::GetVersion);
//!
//! let reply = ControlReply::Version(VersionReply { version: "1.0.0".into() });
//! assert_eq!(serde_json::to_string(&reply).unwrap(), r#"{"version":"1.0.0"}"#);
//! ```

use serde::{Deserialize, Serialize};

/// A message sent to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Re-fetch the whole manifest into the static store.
    CacheUpdate,
    /// Ask for the running version.
    GetVersion,
}

/// A reply to a [`ControlMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlReply {
    /// Reply to [`ControlMessage::GetVersion`].
    Version(VersionReply),
}

/// `{"version": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    /// The running version.
    pub version: String,
}
