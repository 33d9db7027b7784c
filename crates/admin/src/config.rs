//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Origin of the Respawn REST backend
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL of the admin API; `https://` marks the
//!   session cookie secure
//! - `BACKEND_TIMEOUT_SECS` - Per-request backend timeout (default: 10)
//! - `ADMIN_USER_CACHE_TTL_SECS` - Lifetime of the cached user list (default: 30)
//! - `LOG_FORMAT` - `json` or `text` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use respawn_api::ApiConfig;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, when served behind a proxy
    pub base_url: Option<String>,
    /// Backend origin
    pub backend_url: Url,
    /// Per-request backend timeout
    pub backend_timeout: Duration,
    /// How long the user list is served from memory
    pub user_cache_ttl: Duration,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let host = parse("ADMIN_HOST", &or_default("ADMIN_HOST", "127.0.0.1"))?;
        let port = parse("ADMIN_PORT", &or_default("ADMIN_PORT", "3001"))?;

        let backend_url = get("BACKEND_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("BACKEND_URL".to_string()))?;
        let backend_url = Url::parse(&backend_url)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;

        let backend_timeout = Duration::from_secs(parse(
            "BACKEND_TIMEOUT_SECS",
            &or_default("BACKEND_TIMEOUT_SECS", "10"),
        )?);
        let user_cache_ttl = Duration::from_secs(parse(
            "ADMIN_USER_CACHE_TTL_SECS",
            &or_default("ADMIN_USER_CACHE_TTL_SECS", "30"),
        )?);

        let log_format = match or_default("LOG_FORMAT", "text").as_str() {
            "json" => LogFormat::Json,
            "text" | "pretty" => LogFormat::Text,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected json or text, got {other}"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            base_url: get("ADMIN_BASE_URL"),
            backend_url,
            backend_timeout,
            user_cache_ttl,
            log_format,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the admin API is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url
            .as_deref()
            .is_some_and(|url| url.starts_with("https://"))
    }

    /// Client settings for the backend. The admin always reads the catalog
    /// fresh, so the client-side catalog cache is disabled.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.backend_url.clone())
            .with_timeout(self.backend_timeout)
            .with_catalog_cache_ttl(Duration::ZERO)
    }
}

/// Parse a variable's value, naming the variable on failure.
fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
