// Error handling tests
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::IntoResponse;
use gemcache::error::{AppError, RemoteServiceError};
use http_body_util::BodyExt;

#[test]
fn test_error_display_messages() {
    let errors = vec![
        AppError::MissingCredential("GEMINI_API_KEY is not set".to_string()),
        AppError::RemoteService(RemoteServiceError::Status {
            status: 404,
            message: "not found".to_string(),
        }),
        AppError::RemoteService(RemoteServiceError::Timeout("deadline".to_string())),
        AppError::Config("bad port".to_string()),
        AppError::InvalidRequest("Bad request".to_string()),
        AppError::Internal("boom".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_remote_status_error() {
    let error = AppError::from(RemoteServiceError::Status {
        status: 403,
        message: "API key not valid".to_string(),
    });
    assert!(error.is_remote());
    assert!(format!("{}", error).contains("HTTP 403: API key not valid"));
}

#[test]
fn test_timeout_is_a_remote_service_error() {
    let remote = RemoteServiceError::Timeout("operation timed out".to_string());
    assert!(remote.is_timeout());
    assert_eq!(remote.status(), None);

    let error = AppError::from(remote);
    assert!(error.is_remote());
    assert!(format!("{}", error).contains("timed out"));
}

#[test]
fn test_missing_credential_is_not_remote() {
    let error = AppError::MissingCredential("GEMINI_API_KEY is not set".to_string());
    assert!(!error.is_remote());
    assert!(format!("{}", error).contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn test_invalid_request_response_body() {
    let response = AppError::InvalidRequest("expected value".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_remote_failure_response_body() {
    let response =
        AppError::from(RemoteServiceError::Transport("connection refused".to_string()))
            .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Failed to contact Gemini API");
}
