//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `POCKETSHOP_API_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `POCKETSHOP_STORAGE_DIR` - Directory for persisted state (default: .pocketshop)
//! - `POCKETSHOP_STORAGE_KEY` - Key of the persisted auth snapshot (default: auth-storage)
//! - `POCKETSHOP_PAGE_LIMIT` - Products per listing page (default: 8)
//! - `POCKETSHOP_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use pocketshop_core::filters::DEFAULT_PAGE_LIMIT;
use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_DIR: &str = ".pocketshop";
const DEFAULT_STORAGE_KEY: &str = "auth-storage";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_PAGE_LIMIT: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API; endpoint paths are appended to it.
    pub api_base_url: Url,
    /// Directory holding the file-backed key-value store.
    pub storage_dir: PathBuf,
    /// Key the auth snapshot is persisted under.
    pub storage_key: String,
    /// Listing page size, fixed for the session.
    pub page_limit: u32,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Sentry error tracking configuration.
    pub sentry: SentryConfig,
}

/// Sentry configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when unset.
    pub dsn: Option<String>,
    /// Environment tag (e.g., production, staging).
    pub environment: Option<String>,
}

impl ClientConfig {
    /// Build a configuration for `api_base_url` with every other setting at
    /// its default.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sentry: SentryConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("POCKETSHOP_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("POCKETSHOP_API_URL".to_string()))?;
        let api_base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("POCKETSHOP_API_URL".to_string(), e.to_string())
        })?;

        let mut config = Self::new(api_base_url);

        if let Some(dir) = lookup("POCKETSHOP_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("POCKETSHOP_STORAGE_KEY") {
            if key.trim().is_empty() {
                return Err(ConfigError::InvalidEnvVar(
                    "POCKETSHOP_STORAGE_KEY".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            config.storage_key = key;
        }
        if let Some(limit) = lookup("POCKETSHOP_PAGE_LIMIT") {
            config.page_limit = parse_page_limit(&limit)?;
        }
        if let Some(secs) = lookup("POCKETSHOP_HTTP_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("POCKETSHOP_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.sentry = SentryConfig {
            dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            environment: lookup("SENTRY_ENVIRONMENT"),
        };

        Ok(config)
    }
}

fn parse_page_limit(value: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("POCKETSHOP_PAGE_LIMIT".to_string(), reason);
    let limit = value.parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(invalid(format!("must be between 1 and {MAX_PAGE_LIMIT} (got {limit})")));
    }
    Ok(limit)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("POCKETSHOP_API_URL", "https://api.example.com/api")]).unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://api.example.com/api");
        assert_eq!(config.storage_dir, PathBuf::from(".pocketshop"));
        assert_eq!(config.storage_key, "auth-storage");
        assert_eq!(config.page_limit, 8);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "POCKETSHOP_API_URL"));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = load(&[("POCKETSHOP_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("POCKETSHOP_API_URL", "http://localhost:5000/api"),
            ("POCKETSHOP_STORAGE_DIR", "/tmp/shop"),
            ("POCKETSHOP_STORAGE_KEY", "session"),
            ("POCKETSHOP_PAGE_LIMIT", "20"),
            ("POCKETSHOP_HTTP_TIMEOUT_SECS", "5"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
            ("SENTRY_ENVIRONMENT", "staging"),
        ])
        .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(config.storage_key, "session");
        assert_eq!(config.page_limit, 20);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.sentry.dsn.as_deref(), Some("https://key@sentry.example/1"));
        assert_eq!(config.sentry.environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_page_limit_bounds() {
        assert!(parse_page_limit("0").is_err());
        assert!(parse_page_limit("101").is_err());
        assert!(parse_page_limit("eight").is_err());
        assert_eq!(parse_page_limit("100").unwrap(), 100);
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        let err = load(&[
            ("POCKETSHOP_API_URL", "http://localhost:5000"),
            ("POCKETSHOP_STORAGE_KEY", " "),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_empty_sentry_dsn_disables_tracking() {
        let config = load(&[
            ("POCKETSHOP_API_URL", "http://localhost:5000"),
            ("SENTRY_DSN", ""),
        ])
        .unwrap();
        assert!(config.sentry.dsn.is_none());
    }
}
