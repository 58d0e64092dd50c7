// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::cache::{CacheStats, ResponseCache};
use crate::error::AppError;
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info};

const X_CACHE: &str = "x-cache";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub response_cache_enabled: bool,
    pub response_cache: CacheStats,
    pub timestamp: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.gemini_client.default_model().to_string(),
        response_cache_enabled: state.response_cache.is_enabled(),
        response_cache: state.response_cache.stats(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handler for `POST /api/gemini`
///
/// Relays a `generateContent` body to the default model. Successful upstream
/// responses are memoized by request body; the `X-Cache` header tells the
/// caller whether the answer came from memory.
pub async fn gemini_proxy_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: Value = serde_json::from_slice(&body).map_err(|e| {
        debug!("Rejected proxy request body: {}", e);
        AppError::InvalidRequest(format!("JSON deserialization error: {}", e))
    })?;

    let cache_key = ResponseCache::key_for(&request);

    if let Some(cached) = state.response_cache.get(&cache_key) {
        info!("Using cached response for request");
        return Ok(json_response(StatusCode::OK, cached, "HIT"));
    }

    let (status, upstream_body) = state
        .gemini_client
        .forward_generate(&request)
        .await
        .map_err(|e| {
            error!("Error making request to Gemini API: {}", e);
            e
        })?;

    if status == StatusCode::OK.as_u16() {
        state.response_cache.put(cache_key, upstream_body.clone());
        debug!("Cached response for future requests");
    }

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok(json_response(status, upstream_body, "MISS"))
}

pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.response_cache.stats())
}

pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<Value> {
    state.response_cache.clear();
    Json(json!({ "message": "Cache cleared successfully" }))
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

fn json_response(status: StatusCode, body: String, cache: &'static str) -> Response {
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(X_CACHE, HeaderValue::from_static(cache));
    response
}
