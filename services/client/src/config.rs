//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;

use novel_reader_core::{Language, SessionPolicy};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub storage_path: PathBuf,
    pub log_level: Level,
    pub trusted_token_prefix: Option<String>,
    pub default_language: Language,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout: Duration::from_secs(60),
            storage_path: PathBuf::from("./.novel-reader/storage.json"),
            log_level: Level::INFO,
            trusted_token_prefix: None,
            default_language: Language::English,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- API Settings ---
        let api_base_url = lookup("READER_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "READER_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let request_timeout = match lookup("READER_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("READER_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        "READER_REQUEST_TIMEOUT_SECS".to_string(),
                        "timeout must be at least one second".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        // --- Local Storage and Logging ---
        let storage_path = lookup("READER_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Session and Language ---
        let trusted_token_prefix = lookup("READER_TRUSTED_TOKEN_PREFIX")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let default_language = match lookup("READER_DEFAULT_LANGUAGE") {
            Some(code) => Language::from_code(&code).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "READER_DEFAULT_LANGUAGE".to_string(),
                    format!("'{}' is neither 'ta' nor 'en'", code),
                )
            })?,
            None => defaults.default_language,
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            storage_path,
            log_level,
            trusted_token_prefix,
            default_language,
        })
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            trusted_token_prefix: self.trusted_token_prefix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.default_language, Language::English);
        assert!(config.trusted_token_prefix.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("READER_API_URL", "https://novels.example.com/api/"),
            ("READER_REQUEST_TIMEOUT_SECS", "15"),
            ("RUST_LOG", "debug"),
            ("READER_DEFAULT_LANGUAGE", "ta"),
            ("READER_TRUSTED_TOKEN_PREFIX", "demo-"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://novels.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.default_language, Language::Tamil);
        assert_eq!(config.session_policy().trusted_token_prefix.as_deref(), Some("demo-"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("READER_REQUEST_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidValue(var, _)) if var == "READER_REQUEST_TIMEOUT_SECS"
        ));
        assert!(Config::from_lookup(lookup_from(&[("READER_API_URL", "ftp://x")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("READER_DEFAULT_LANGUAGE", "fr")])).is_err());
    }
}
