//! Run metrics
//!
//! Emitted through the `metrics` facade. Nothing is exported unless the
//! embedding application installs a recorder.

use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Non-empty transaction pages retrieved
    PagesFetched,
    /// Fetches stopped by the page cap
    FetchTruncated,
    /// Requests sent to the Pendle API
    HttpRequests,
    /// Responses served from the cache
    CacheHits,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Single Pendle API request
    HttpRequest,
    /// Whole simulation run
    Simulation,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::PagesFetched => "ytpoints_pages_fetched_total",
            CounterMetric::FetchTruncated => "ytpoints_fetch_truncated_total",
            CounterMetric::HttpRequests => "ytpoints_http_requests_total",
            CounterMetric::CacheHits => "ytpoints_cache_hits_total",
        }
    }
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::HttpRequest => "ytpoints_http_request_latency_ms",
            LatencyMetric::Simulation => "ytpoints_simulation_latency_ms",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    ::metrics::counter!(metric.name()).increment(1);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let value_ms = duration.as_secs_f64() * 1000.0;
    ::metrics::histogram!(metric.name()).record(value_ms);
    tracing::trace!(metric = metric.name(), value_ms, "Recording latency");
}
