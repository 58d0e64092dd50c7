// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics, REMOTE_CALLS, REMOTE_CALL_DURATION, RESPONSE_CACHE_ENTRIES,
    RESPONSE_CACHE_OPERATIONS,
};

/// Helper to record one remote Gemini API call
pub fn record_remote_call(operation: &str, status: &str, duration_secs: f64) {
    REMOTE_CALLS.with_label_values(&[operation, status]).inc();
    REMOTE_CALL_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Helpers to record proxy response cache operations
pub fn record_response_cache_hit() {
    RESPONSE_CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_response_cache_miss() {
    RESPONSE_CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_response_cache_store() {
    RESPONSE_CACHE_OPERATIONS.with_label_values(&["store"]).inc();
}

pub fn record_response_cache_clear() {
    RESPONSE_CACHE_OPERATIONS.with_label_values(&["clear"]).inc();
}

pub fn update_response_cache_entries(count: usize) {
    RESPONSE_CACHE_ENTRIES.set(count as f64);
}
