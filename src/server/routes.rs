// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    cache_clear_handler, cache_stats_handler, gemini_proxy_handler, health_handler,
    metrics_handler,
};
use super::middleware::{cors_layer, request_id_layers};
use crate::cache::ResponseCache;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::gemini::GeminiClient;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub gemini_client: Arc<GeminiClient>,
    pub response_cache: Arc<ResponseCache>,
}

pub fn create_router(config: &AppConfig, gemini_client: GeminiClient) -> Result<Router> {
    let state = AppState {
        gemini_client: Arc::new(gemini_client),
        response_cache: Arc::new(ResponseCache::new(&config.response_cache)),
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/gemini", post(gemini_proxy_handler))
        .route("/api/cache-stats", get(cache_stats_handler))
        .route("/api/cache-clear", post(cache_clear_handler));

    if let Some(dir) = &config.server.static_dir {
        if !Path::new(dir).is_dir() {
            return Err(AppError::Config(format!(
                "Static directory '{}' does not exist",
                dir
            )));
        }
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app
        .layer(tower_http::limit::RequestBodyLimitLayer::new(10 * 1024 * 1024))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
