//! Application state shared across handlers.

use std::sync::Arc;

use respawn_api::{ApiError, BackendClient};

use crate::config::AdminConfig;
use crate::services::{OrderDesk, UserDirectory};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    client: BackendClient,
    users: UserDirectory,
    orders: OrderDesk,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let client = BackendClient::new(&config.api_config())?;
        Ok(Self::with_client(config, client))
    }

    /// Create the state around an existing client.
    #[must_use]
    pub fn with_client(config: AdminConfig, client: BackendClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                users: UserDirectory::new(client.clone(), config.user_cache_ttl),
                orders: OrderDesk::new(client.clone()),
                client,
                config,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the REST backend client.
    #[must_use]
    pub fn client(&self) -> &BackendClient {
        &self.inner.client
    }

    /// Cached user list and moderation.
    #[must_use]
    pub fn users(&self) -> &UserDirectory {
        &self.inner.users
    }

    /// Order listing and status changes.
    #[must_use]
    pub fn orders(&self) -> &OrderDesk {
        &self.inner.orders
    }
}
