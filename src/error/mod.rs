// Error types for gemcache
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failure of a single call against the remote Gemini API.
///
/// Every remote operation reports its failures through this type, including
/// timeouts. Nothing is retried locally.
#[derive(Error, Debug)]
pub enum RemoteServiceError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl RemoteServiceError {
    /// HTTP status returned by the service, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteServiceError::Timeout(_))
    }
}

impl From<reqwest::Error> for RemoteServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteServiceError::Timeout(e.to_string())
        } else if e.is_decode() {
            RemoteServiceError::InvalidResponse(e.to_string())
        } else {
            RemoteServiceError::Transport(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Gemini API error: {0}")]
    RemoteService(#[from] RemoteServiceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for every failure that came from talking to the remote API.
    pub fn is_remote(&self) -> bool {
        matches!(self, AppError::RemoteService(_))
    }
}

// Proxy clients only ever see `{"error": "..."}` bodies
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidRequest(_) | AppError::Json(_) => {
                (StatusCode::BAD_REQUEST, "Invalid JSON".to_string())
            }
            AppError::RemoteService(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to contact Gemini API".to_string(),
            ),
            AppError::MissingCredential(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
