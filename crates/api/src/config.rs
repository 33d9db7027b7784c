//! Client configuration.

use std::time::Duration;

use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default lifetime of cached catalog responses.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(300);

/// Settings for [`crate::BackendClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://api.respawn.store/`.
    pub base_url: Url,
    /// Upper bound for a single request, connect to last body byte.
    pub timeout: Duration,
    /// Catalog cache lifetime; `None` disables caching.
    pub catalog_cache_ttl: Option<Duration>,
}

impl ApiConfig {
    /// Configuration with default timeout and catalog caching.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            catalog_cache_ttl: Some(DEFAULT_CATALOG_TTL),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the catalog cache lifetime; zero disables the cache.
    #[must_use]
    pub fn with_catalog_cache_ttl(mut self, ttl: Duration) -> Self {
        self.catalog_cache_ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }
}
