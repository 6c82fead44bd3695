//! Request keys.
//!
//! A [`RequestKey`] identifies a stored response by HTTP method and absolute
//! URL. The URL is kept in its normalized `http::Uri` string form so that a
//! manifest entry resolved at install time and a page request for the same
//! resource produce the same key.
//!
//! ```
//! use cachegate_core::RequestKey;
//! use http::{Method, Uri};
//!
//! let uri: Uri = "https://example.com".parse().unwrap();
//! let key = RequestKey::get(&uri);
//! assert_eq!(key.method(), &Method::GET);
//! assert_eq!(key.url(), "https://example.com/");
//! assert_eq!(key.to_string(), "GET https://example.com/");
//! ```

use std::fmt;

use http::{Method, Uri};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Method + absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    #[serde(with = "http_serde::method")]
    method: Method,
    url: SmolStr,
}

impl RequestKey {
    /// Creates a key for the given method and URI.
    pub fn new(method: Method, uri: &Uri) -> Self {
        Self {
            method,
            url: SmolStr::new(uri.to_string()),
        }
    }

    /// Creates a `GET` key for `uri`.
    pub fn get(uri: &Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// The request method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The normalized absolute URL.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
