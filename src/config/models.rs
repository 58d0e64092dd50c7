//! Configuration data structures for gemcache.
//!
//! This module defines the schema for the application settings: the remote
//! Gemini API connection, the local proxy server and its response cache,
//! and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Remote Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Local proxy server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Response memoization used by the local proxy.
    #[serde(default)]
    pub response_cache: ResponseCacheConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the remote Gemini API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API.
    /// Default: `https://generativelanguage.googleapis.com/v1beta`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// API key. Normally taken from `GEMINI_API_KEY`; empty means unset.
    #[serde(default)]
    pub api_key: String,

    /// Model used for generation and for new cached contents.
    /// Default: `gemini-2.0-flash`
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Per-request timeout in seconds.
    /// Default: `60`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for the local proxy server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// Default: `3000`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for any path that is not an API route.
    /// Default: none
    #[serde(default)]
    pub static_dir: Option<String>,
}

/// Settings for the proxy's in-memory response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseCacheConfig {
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lifetime of a memoized response in seconds.
    /// Default: `3600` (1 hour)
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,

    /// Upper bound on stored responses; the least recently used is dropped.
    /// Default: `1000`
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: String::new(),
            default_model: default_model(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: default_cache_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_max_entries() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}
