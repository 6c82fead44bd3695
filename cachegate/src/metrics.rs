//! Metrics declaration and recording.
//!
//! With the `metrics` feature disabled every function here is an empty
//! inline stub.

use std::time::Duration;

use cachegate_core::{Category, ResponseSource, StoreName};

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Requests answered by the gateway, per category and source.
    pub static ref REQUESTS_TOTAL: &'static str = {
        metrics::describe_counter!(
            "cachegate_requests_total",
            "Total number of requests answered by the gateway."
        );
        "cachegate_requests_total"
    };
    /// Synthetic fallback responses, per kind.
    pub static ref FALLBACK_TOTAL: &'static str = {
        metrics::describe_counter!(
            "cachegate_fallback_total",
            "Total number of synthetic fallback responses."
        );
        "cachegate_fallback_total"
    };
    /// Entries evicted by trimming, per store.
    pub static ref EVICTIONS_TOTAL: &'static str = {
        metrics::describe_counter!(
            "cachegate_evictions_total",
            "Total number of entries evicted from bounded stores."
        );
        "cachegate_evictions_total"
    };
    /// Network fetch timings, per category.
    pub static ref UPSTREAM_DURATION: &'static str = {
        metrics::describe_histogram!(
            "cachegate_upstream_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of network fetches in seconds."
        );
        "cachegate_upstream_duration_seconds"
    };
}

/// Records one answered request.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_request(category: Category, source: &ResponseSource) {
    metrics::counter!(
        *REQUESTS_TOTAL,
        "category" => category.as_str(),
        "source" => source.as_str()
    )
    .increment(1);
}

/// No-op without the `metrics` feature.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_request(_category: Category, _source: &ResponseSource) {}

/// Records a synthetic response of the given kind.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_fallback(kind: &'static str) {
    metrics::counter!(*FALLBACK_TOTAL, "kind" => kind).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
#[allow(missing_docs)]
pub fn record_fallback(_kind: &'static str) {}

/// Records entries removed by a trim.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_evictions(store: &StoreName, evicted: usize) {
    if evicted > 0 {
        metrics::counter!(*EVICTIONS_TOTAL, "store" => store.to_string()).increment(evicted as u64);
    }
}

#[cfg(not(feature = "metrics"))]
#[inline]
#[allow(missing_docs)]
pub fn record_evictions(_store: &StoreName, _evicted: usize) {}

/// Records how long a network fetch took.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_upstream(category: Category, duration: Duration) {
    metrics::histogram!(*UPSTREAM_DURATION, "category" => category.as_str())
        .record(duration.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
#[inline]
#[allow(missing_docs)]
pub fn record_upstream(_category: Category, _duration: Duration) {}
