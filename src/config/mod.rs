// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{AppError, Result};
use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use std::path::{Path, PathBuf};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. `GEMINI_API_KEY` (highest, for the key only)
    /// 2. Environment variables (`GEMCACHE__SECTION__KEY`)
    /// 3. Config file
    /// 4. Defaults (lowest)
    ///
    /// A `.env` file in the working directory is read first, so its values
    /// behave like regular environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = Self::base_builder(&path)?
            .add_source(
                Environment::with_prefix("GEMCACHE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("gemini.api_key", std::env::var(API_KEY_ENV).ok())?
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Defaults overlaid with a single TOML file, ignoring the environment.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::base_builder(path)?
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    fn base_builder(path: &Path) -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path).required(false)))
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemcache")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from_file(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.gemini.default_model, "gemini-2.0-flash");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.response_cache.ttl_seconds, 3600);
        assert!(config.gemini.api_key.is_empty());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[gemini]\ndefault_model = \"gemini-1.5-flash-001\"\ntimeout_seconds = 5\n\n[server]\nport = 8000"
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.gemini.default_model, "gemini-1.5-flash-001");
        assert_eq!(config.gemini.timeout_seconds, 5);
        assert_eq!(config.server.port, 8000);
        // Untouched sections keep their defaults
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.response_cache.enabled);
    }
}
