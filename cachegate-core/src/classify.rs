//! Request classification.
//!
//! [`Classifier`] maps a URL to a [`Category`] using file extensions, path
//! markers and host allow-lists. It is a pure function of its rules and the
//! URL: no network state, no store state.
//!
//! Rules are checked in a fixed order and the first match wins:
//!
//! | Order | Category | Matches when |
//! |---|---|---|
//! | 1 | [`Static`](Category::Static) | path ends with a static extension, or the URL is a manifest entry |
//! | 2 | [`Image`](Category::Image) | path ends with an image extension, or contains an image marker |
//! | 3 | [`Api`](Category::Api) | path contains an API marker, or host contains an API host |
//! | 4 | [`External`](Category::External) | host is not the origin and contains a CDN host |
//! | 5 | [`Default`](Category::Default) | nothing above matched |

use std::collections::HashSet;

use http::Uri;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::category::Category;

/// Configurable matching lists used by [`Classifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    /// Path suffixes that mark static assets.
    pub static_extensions: Vec<String>,
    /// Path suffixes that mark images.
    pub image_extensions: Vec<String>,
    /// Path fragments that mark images regardless of extension.
    pub image_path_markers: Vec<String>,
    /// Path fragments that mark API calls.
    pub api_path_markers: Vec<String>,
    /// Host fragments that mark API calls.
    pub api_hosts: Vec<String>,
    /// Host fragments that mark third-party CDN resources.
    pub cdn_hosts: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            static_extensions: strings(&[".css", ".js", ".html", ".json"]),
            image_extensions: strings(&[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico"]),
            image_path_markers: strings(&["/images/"]),
            api_path_markers: strings(&["/api/"]),
            api_hosts: strings(&["github.com", "vercel.app", "herokuapp.com"]),
            cdn_hosts: strings(&["fonts.googleapis.com", "cdnjs.cloudflare.com", "unpkg.com"]),
        }
    }
}

/// Deterministic URL classifier.
///
/// # Example
///
/// ```
/// use cachegate_core::{Category, Classifier, ClassifierRules};
/// use http::Uri;
///
/// let classifier = Classifier::new(ClassifierRules::default(), "example.com");
///
/// let css: Uri = "https://example.com/css/style.css".parse().unwrap();
/// assert_eq!(classifier.classify(&css), Category::Static);
///
/// let font: Uri = "https://fonts.googleapis.com/css2?family=Poppins".parse().unwrap();
/// assert_eq!(classifier.classify(&font), Category::External);
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: ClassifierRules,
    origin_host: SmolStr,
    manifest: HashSet<String>,
}

impl Classifier {
    /// Creates a classifier for pages served from `origin_host`.
    pub fn new(rules: ClassifierRules, origin_host: impl AsRef<str>) -> Self {
        let rules = ClassifierRules {
            static_extensions: lowercase(rules.static_extensions),
            image_extensions: lowercase(rules.image_extensions),
            image_path_markers: lowercase(rules.image_path_markers),
            api_path_markers: lowercase(rules.api_path_markers),
            api_hosts: lowercase(rules.api_hosts),
            cdn_hosts: lowercase(rules.cdn_hosts),
        };
        Self {
            rules,
            origin_host: SmolStr::new(origin_host.as_ref().to_ascii_lowercase()),
            manifest: HashSet::new(),
        }
    }

    /// Treats the given absolute URLs as static assets whatever their extension.
    pub fn with_manifest<I>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = Uri>,
    {
        self.manifest = urls.into_iter().map(|uri| uri.to_string()).collect();
        self
    }

    /// Returns the category of `uri`.
    pub fn classify(&self, uri: &Uri) -> Category {
        let path = uri.path().to_ascii_lowercase();
        let host = uri.host().unwrap_or_default().to_ascii_lowercase();

        if self.is_static(uri, &path) {
            Category::Static
        } else if self.is_image_path(&path) {
            Category::Image
        } else if self.is_api(&path, &host) {
            Category::Api
        } else if self.is_external(&host) {
            Category::External
        } else {
            Category::Default
        }
    }

    /// Whether `uri` matches the image rule alone.
    ///
    /// Used by the fallback chain, which serves a placeholder graphic for any
    /// image-looking URL even when an earlier rule claimed it.
    pub fn is_image(&self, uri: &Uri) -> bool {
        self.is_image_path(&uri.path().to_ascii_lowercase())
    }

    fn is_static(&self, uri: &Uri, path: &str) -> bool {
        ends_with_any(path, &self.rules.static_extensions)
            || (!self.manifest.is_empty() && self.manifest.contains(&uri.to_string()))
    }

    fn is_image_path(&self, path: &str) -> bool {
        ends_with_any(path, &self.rules.image_extensions)
            || contains_any(path, &self.rules.image_path_markers)
    }

    fn is_api(&self, path: &str, host: &str) -> bool {
        contains_any(path, &self.rules.api_path_markers) || contains_any(host, &self.rules.api_hosts)
    }

    fn is_external(&self, host: &str) -> bool {
        !host.is_empty()
            && host != self.origin_host.as_str()
            && contains_any(host, &self.rules.cdn_hosts)
    }
}

fn lowercase(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.to_ascii_lowercase()).collect()
}

fn ends_with_any(value: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| value.ends_with(suffix.as_str()))
}

fn contains_any(value: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| value.contains(needle.as_str()))
}
