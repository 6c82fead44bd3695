//! Stored cache entries.
//!
//! A [`CacheEntry`] pairs a [`ResponseData`] with the moment it was written.
//! The write time is a field of the record, not a header on the response,
//! so age checks never depend on what the network sent.
//!
//! ```
//! use cachegate_core::{CacheEntry, ResponseData};
//! use chrono::{Duration, Utc};
//!
//! let fresh = CacheEntry::new(ResponseData::ok("png bytes"));
//! assert!(!fresh.is_older_than(std::time::Duration::from_secs(60)));
//!
//! let old = CacheEntry::stored_at(ResponseData::ok("png bytes"), Utc::now() - Duration::days(31));
//! assert!(old.is_older_than(std::time::Duration::from_secs(30 * 24 * 60 * 60)));
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::ResponseData;

/// A stored response plus its write timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    response: ResponseData,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Wraps `response`, stamping it with the current time.
    pub fn new(response: ResponseData) -> Self {
        Self::stored_at(response, Utc::now())
    }

    /// Wraps `response` with an explicit write time.
    pub fn stored_at(response: ResponseData, stored_at: DateTime<Utc>) -> Self {
        Self {
            response,
            stored_at,
        }
    }

    /// The stored response.
    #[inline]
    pub fn response(&self) -> &ResponseData {
        &self.response
    }

    /// When the entry was written.
    #[inline]
    pub fn written_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Consumes the entry and returns the response.
    pub fn into_response(self) -> ResponseData {
        self.response
    }

    /// Time elapsed since the write, or zero if the clock went backwards.
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the entry has reached `max_age` and must be revalidated.
    ///
    /// An entry written at `T` is due for revalidation at any time `>= T + max_age`.
    pub fn is_older_than(&self, max_age: Duration) -> bool {
        self.age() >= max_age
    }
}
