//! Favorite toggling.
//!
//! The favorite set is always read from the backend before a toggle, so the
//! add-or-remove decision is made on current membership.

use respawn_api::BackendClient;
use respawn_core::cart::FavoriteSet;
use respawn_core::catalog::Product;
use respawn_core::{ProductId, UserId};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::models::CurrentUser;
use crate::services::inflight::InFlight;

/// Outcome of a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteToggle {
    /// Membership after the toggle.
    pub is_favorite: bool,
    /// The whole set after the toggle.
    pub favorites: FavoriteSet,
}

/// Favorites for the signed-in user.
#[derive(Clone)]
pub struct FavoritesService {
    client: BackendClient,
    in_flight: InFlight<(UserId, ProductId)>,
}

impl FavoritesService {
    /// Create the service.
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            in_flight: InFlight::new(),
        }
    }

    /// Favorite products in full.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for visitors, or the backend error.
    pub async fn list(&self, user: Option<&CurrentUser>) -> Result<Vec<Product>> {
        let user = user.ok_or_else(AppError::sign_in_required)?;
        Ok(self.client.favorites(&user.token()).await?)
    }

    /// Favorite ids for rendering hearts. Visitors and failures get an empty
    /// set; a failure is logged.
    pub async fn ids(&self, user: Option<&CurrentUser>) -> FavoriteSet {
        let Some(user) = user else {
            return FavoriteSet::new();
        };
        match self.client.favorite_ids(&user.token()).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, user_id = %user.id, "Failed to load favorites");
                FavoriteSet::new()
            }
        }
    }

    /// Flip membership of `product_id`.
    ///
    /// # Errors
    ///
    /// - `AppError::Unauthorized` for visitors, before any backend call
    /// - `AppError::AlreadyPending` while a toggle for the same product is
    ///   outstanding
    /// - the backend error; nothing is changed locally
    #[instrument(skip(self, user), fields(user_id = ?user.map(|u| u.id)))]
    pub async fn toggle(
        &self,
        user: Option<&CurrentUser>,
        product_id: ProductId,
    ) -> Result<FavoriteToggle> {
        let user = user.ok_or_else(AppError::sign_in_required)?;
        let _guard = self.in_flight.try_acquire((user.id, product_id))?;
        let token = user.token();

        let mut favorites = self.client.favorite_ids(&token).await?;
        let is_favorite = if favorites.contains(product_id) {
            self.client.remove_favorite(&token, product_id).await?;
            favorites.remove(product_id);
            false
        } else {
            self.client.add_favorite(&token, product_id).await?;
            favorites.insert(product_id);
            true
        };

        Ok(FavoriteToggle {
            is_favorite,
            favorites,
        })
    }
}
