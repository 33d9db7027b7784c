//! Application state shared across handlers.

use std::sync::Arc;

use respawn_api::{ApiError, BackendClient};

use crate::config::StorefrontConfig;
use crate::services::{
    CartCountRegistry, CartService, CatalogService, CheckoutService, FavoritesService,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client and the services built on it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    client: BackendClient,
    catalog: CatalogService,
    cart: CartService,
    favorites: FavoritesService,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let client = BackendClient::new(&config.backend.api_config())?;
        Ok(Self::with_client(config, client))
    }

    /// Create the state around an existing client.
    #[must_use]
    pub fn with_client(config: StorefrontConfig, client: BackendClient) -> Self {
        let counts = CartCountRegistry::new(config.cart_count_policy);

        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(client.clone()),
                cart: CartService::new(client.clone(), counts.clone()),
                favorites: FavoritesService::new(client.clone()),
                checkout: CheckoutService::new(client.clone(), counts),
                client,
                config,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the REST backend client.
    #[must_use]
    pub fn client(&self) -> &BackendClient {
        &self.inner.client
    }

    /// Catalog listing service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Cart actions and badge.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    /// Favorite toggling.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesService {
        &self.inner.favorites
    }

    /// Checkout aggregation and order placement.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    /// The cart badge registry.
    #[must_use]
    pub fn cart_counts(&self) -> &CartCountRegistry {
        self.inner.cart.counts()
    }
}
