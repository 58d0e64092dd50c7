// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_with_registry,
    register_histogram_vec_with_registry, CounterVec, Encoder, Gauge, HistogramVec, Opts,
    Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // GEMINI API METRICS
    // ============================================================================

    /// Remote calls by operation and outcome
    pub static ref REMOTE_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("gemini_api_calls_total", "Total Gemini API calls"),
        &["operation", "status"], // status: HTTP code, "timeout" or "transport"
        REGISTRY
    ).unwrap();

    /// Remote call latency
    pub static ref REMOTE_CALL_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("gemini_api_duration_seconds", "Gemini API call duration")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["operation"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // RESPONSE CACHE METRICS
    // ============================================================================

    /// Proxy response cache operations
    pub static ref RESPONSE_CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("response_cache_operations_total", "Total proxy response cache operations"),
        &["operation"], // operation: hit, miss, store, clear
        REGISTRY
    ).unwrap();

    /// Responses currently held by the proxy
    pub static ref RESPONSE_CACHE_ENTRIES: Gauge = register_gauge_with_registry!(
        Opts::new("response_cache_entries", "Responses currently held by the proxy cache"),
        REGISTRY
    ).unwrap();
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
