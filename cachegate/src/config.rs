//! Gateway configuration.
//!
//! [`GatewayConfig`] is plain serde data and is usually read from YAML:
//!
//! ```
//! use std::time::Duration;
//! use cachegate::GatewayConfig;
//!
//! let config = GatewayConfig::from_yaml_str(r#"
//! version: "2.0.0"
//! origin: "https://example.com"
//! stores:
//!   images:
//!     max_entries: 10
//!     max_age: 7d
//! "#).unwrap();
//!
//! assert_eq!(config.version, "2.0.0");
//! assert_eq!(config.stores.images.max_age, Duration::from_secs(7 * 24 * 60 * 60));
//! // everything not mentioned keeps its default
//! assert_eq!(config.stores.api.max_entries, 20);
//! ```

use std::time::Duration;

use cachegate_core::{Classifier, ClassifierRules, Partition, StoreName, request::resolve};
use http::Uri;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

const DAY: u64 = 24 * 60 * 60;

/// Top level gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Version string, part of every store name.
    pub version: String,
    /// Store name prefix. Stores not starting with `{prefix}-` are never touched.
    pub prefix: String,
    /// Origin the gateway serves, e.g. `https://example.com`.
    pub origin: String,
    /// Document served to navigation requests when the network is down.
    pub offline_document: String,
    /// URLs cached at install time.
    pub manifest: ManifestConfig,
    /// Per-store limits.
    pub stores: StoresConfig,
    /// Classification lists.
    pub classifier: ClassifierRules,
    /// Push notification presentation.
    pub notification: NotificationConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_owned(),
            prefix: "ghp".to_owned(),
            origin: "http://localhost".to_owned(),
            offline_document: "/index.html".to_owned(),
            manifest: ManifestConfig::default(),
            stores: StoresConfig::default(),
            classifier: ClassifierRules::default(),
            notification: NotificationConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> GatewayResult<Self> {
        let config: GatewayConfig =
            serde_saphyr::from_str(yaml).map_err(|e| GatewayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.version.trim().is_empty() {
            return Err(GatewayError::Config("version must not be empty".into()));
        }
        if self.prefix.trim().is_empty() {
            return Err(GatewayError::Config("prefix must not be empty".into()));
        }
        self.origin_uri()?;

        let limits = [
            ("static_assets", self.stores.static_assets.max_entries),
            ("images", Some(self.stores.images.max_entries)),
            ("api", Some(self.stores.api.max_entries)),
            ("external", Some(self.stores.external.max_entries)),
        ];
        if let Some((store, _)) = limits.iter().find(|(_, max)| *max == Some(0)) {
            return Err(GatewayError::Config(format!(
                "stores.{store}.max_entries must be greater than zero"
            )));
        }
        Ok(())
    }

    /// The origin as a URI. Fails unless it has both a scheme and a host.
    pub fn origin_uri(&self) -> GatewayResult<Uri> {
        let uri: Uri = self
            .origin
            .parse()
            .map_err(|e| GatewayError::Config(format!("origin {:?}: {e}", self.origin)))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(GatewayError::Config(format!(
                "origin {:?} needs a scheme and a host",
                self.origin
            )));
        }
        Ok(uri)
    }

    /// Name of the store for `partition` under the current version.
    pub fn store_name(&self, partition: Partition) -> StoreName {
        StoreName::versioned(&self.prefix, partition, &self.version)
    }

    /// Maximum entry count for `partition`, `None` for unbounded.
    pub fn max_entries(&self, partition: Partition) -> Option<usize> {
        match partition {
            Partition::StaticAssets => self.stores.static_assets.max_entries,
            Partition::Images => Some(self.stores.images.max_entries),
            Partition::ApiResponses => Some(self.stores.api.max_entries),
            Partition::ExternalResources => Some(self.stores.external.max_entries),
        }
    }

    /// Builds the classifier, treating every manifest URL as static.
    pub fn classifier(&self) -> GatewayResult<Classifier> {
        let origin = self.origin_uri()?;
        let manifest = self
            .manifest
            .essential
            .iter()
            .chain(&self.manifest.secondary)
            .map(|reference| resolve(&origin, reference))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Classifier::new(self.classifier.clone(), origin.host().unwrap_or_default())
            .with_manifest(manifest))
    }
}

/// URLs precached at install time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Must all succeed or the install fails.
    pub essential: Vec<String>,
    /// Cached best-effort; failures are logged and skipped.
    pub secondary: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            essential: [
                "/",
                "/index.html",
                "/css/style.css",
                "/js/main.js",
                "/js/particles.js",
            ]
            .map(String::from)
            .to_vec(),
            secondary: [
                "/assets/resume.html",
                "/manifest.json",
                "https://fonts.googleapis.com/css2?family=Poppins:wght@300;400;500;600;700;800&display=swap",
                "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
                "https://unpkg.com/aos@2.3.1/dist/aos.css",
                "https://unpkg.com/aos@2.3.1/dist/aos.js",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Limits of the four stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoresConfig {
    /// The versioned top-level store.
    pub static_assets: StaticStoreConfig,
    /// Image store.
    pub images: ImageStoreConfig,
    /// API response store.
    pub api: ApiStoreConfig,
    /// Third-party CDN store.
    pub external: ExternalStoreConfig,
}

/// Static store limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StaticStoreConfig {
    /// Unbounded when `None`.
    pub max_entries: Option<usize>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageStoreConfig {
    pub max_entries: usize,
    /// Age after which a cached image is revalidated (e.g. "30d", "12h").
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 50,
            max_age: Duration::from_secs(30 * DAY),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStoreConfig {
    pub max_entries: usize,
    /// How long to wait for the network before using the cache (e.g. "5s").
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 20,
            timeout: Duration::from_secs(5),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalStoreConfig {
    pub max_entries: usize,
}

impl Default for ExternalStoreConfig {
    fn default() -> Self {
        Self { max_entries: 30 }
    }
}

/// How push messages are presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Notification title.
    pub title: String,
    /// Body used when the push payload carries no text.
    pub default_body: String,
    /// Icon URL.
    pub icon: String,
    /// Badge URL.
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    /// Page opened by the `view` action.
    pub url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio Update".to_owned(),
            default_body: "New update available!".to_owned(),
            icon: "/assets/images/icon-192x192.png".to_owned(),
            badge: "/assets/images/icon-72x72.png".to_owned(),
            vibrate: vec![200, 100, 200],
            url: "/".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = GatewayConfig::default();
        config.validate().unwrap();
        assert_eq!(
            config.store_name(Partition::StaticAssets).as_str(),
            "ghp-static-assets-v1.0.0"
        );
        assert_eq!(config.max_entries(Partition::StaticAssets), None);
        assert_eq!(config.max_entries(Partition::Images), Some(50));
    }

    #[test]
    fn empty_document_is_default() {
        let config = GatewayConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn parses_durations_and_lists() {
        let config = GatewayConfig::from_yaml_str(
            r#"
version: "3"
prefix: site
origin: "https://example.org"
manifest:
  essential: [/, /app.js]
  secondary: []
stores:
  static_assets:
    max_entries: 100
  api:
    max_entries: 5
    timeout: 250ms
classifier:
  api_hosts: [api.example.org]
"#,
        )
        .unwrap();

        assert_eq!(config.manifest.essential, vec!["/", "/app.js"]);
        assert_eq!(config.stores.static_assets.max_entries, Some(100));
        assert_eq!(config.stores.api.timeout, Duration::from_millis(250));
        assert_eq!(config.classifier.api_hosts, vec!["api.example.org"]);
        // unspecified rule lists keep their defaults
        assert_eq!(config.classifier.cdn_hosts.len(), 3);
    }

    #[test]
    fn rejects_empty_version() {
        let err = GatewayConfig::from_yaml_str("version: \"\"").unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn rejects_empty_prefix() {
        let config = GatewayConfig {
            prefix: " ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_limits() {
        let err = GatewayConfig::from_yaml_str("stores: { images: { max_entries: 0 } }")
            .unwrap_err()
            .to_string();
        assert!(err.contains("stores.images.max_entries"), "{err}");
    }

    #[test]
    fn rejects_origin_without_host() {
        let config = GatewayConfig {
            origin: "/just/a/path".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GatewayError::Config(_))));
    }

    #[test]
    fn manifest_entries_classify_as_static() {
        let config = GatewayConfig {
            origin: "https://example.com".into(),
            ..Default::default()
        };
        let classifier = config.classifier().unwrap();
        let root: Uri = "https://example.com/".parse().unwrap();
        let font: Uri = config.manifest.secondary[2].parse().unwrap();

        assert_eq!(classifier.classify(&root), cachegate_core::Category::Static);
        assert_eq!(classifier.classify(&font), cachegate_core::Category::Static);
    }
}
