use std::fmt;

use serde::Serialize;

/// Lifecycle of a gateway version.
///
/// ```text
/// Parsed -> Installing -> Installed -> Activating -> Active
///               |
///               +-> Redundant
/// ```
///
/// Only an `Active` gateway intercepts requests; in any other state
/// [`Gateway::handle`](crate::Gateway::handle) passes them through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Created, nothing cached yet.
    Parsed,
    /// Precaching the manifest.
    Installing,
    /// Manifest cached, waiting for activation.
    Installed,
    /// Cleaning up stores of older versions.
    Activating,
    /// Intercepting requests.
    Active,
    /// Install failed; this version will never become active.
    Redundant,
}

impl LifecycleState {
    /// Short lowercase name, used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
            LifecycleState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstallReport {
    /// URLs written to the static store.
    pub cached: Vec<String>,
    /// Secondary URLs that could not be fetched.
    pub skipped: Vec<String>,
    /// The new version activates without waiting for old pages to close.
    pub skip_waiting: bool,
}

/// Outcome of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationReport {
    /// Stores of older versions that were deleted.
    pub deleted: Vec<String>,
}
