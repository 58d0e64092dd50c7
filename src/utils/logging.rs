//! Structured logging and secret masking.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to keep the
//! API key out of logs and terminal output.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{AppError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty`: Human-readable, multi-line output for development.
/// - `compact` (default): One line per event.
///
/// Logs go to stderr so command output on stdout stays clean. Log levels
/// are controlled via the `RUST_LOG` environment variable or the provided
/// `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let result = match config.format.as_str() {
        "json" => registry.with(fmt.json()).try_init(),
        "pretty" => registry.with(fmt.pretty()).try_init(),
        _ => registry.with(fmt.compact()).try_init(),
    };

    result.map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))
}

/// Masks a secret for display, keeping only the first and last four chars.
///
/// Secrets of eight characters or fewer are replaced entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Sanitizes Google API keys from log messages.
///
/// Replaces every `AIza`-prefixed key and every `key=` query value with
/// `[REDACTED_API_KEY]`.
pub fn sanitize(input: &str) -> String {
    let mut result = input.to_string();

    for marker in ["AIza", "key="] {
        let mut search_from = 0;
        while let Some(pos) = result[search_from..].find(marker) {
            let start = search_from + pos + if marker == "key=" { marker.len() } else { 0 };
            let end = result[start..]
                .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '&'))
                .map(|i| start + i)
                .unwrap_or(result.len());
            if end == start {
                search_from = start;
                continue;
            }
            result.replace_range(start..end, "[REDACTED_API_KEY]");
            search_from = start + "[REDACTED_API_KEY]".len();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("AIzaSyExampleKey1234"), "AIza...1234");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret(""), "***");
    }

    #[test]
    fn test_sanitize_api_key() {
        let input = "x-goog-api-key: AIzaSyDUMMYdummy0123456789 sent";
        let output = sanitize(input);
        assert!(output.contains("[REDACTED_API_KEY]"));
        assert!(!output.contains("AIzaSyDUMMY"));
        assert!(output.ends_with(" sent"));
    }

    #[test]
    fn test_sanitize_query_key() {
        let input = "POST /v1beta/models/gemini-2.0-flash:generateContent?key=secret123&alt=json";
        let output = sanitize(input);
        assert!(output.contains("key=[REDACTED_API_KEY]&alt=json"));
        assert!(!output.contains("secret123"));
    }
}
