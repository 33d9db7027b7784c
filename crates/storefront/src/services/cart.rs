//! Cart actions and the cart badge.

use respawn_api::BackendClient;
use respawn_core::cart::Cart;
use respawn_core::{ProductId, UserId};
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::models::CurrentUser;
use crate::services::cart_count::{CartCount, CartCountRegistry};
use crate::services::inflight::InFlight;

/// Cart reads and mutations for the signed-in user.
#[derive(Clone)]
pub struct CartService {
    client: BackendClient,
    counts: CartCountRegistry,
    in_flight: InFlight<(UserId, ProductId)>,
}

impl CartService {
    /// Create the service.
    #[must_use]
    pub fn new(client: BackendClient, counts: CartCountRegistry) -> Self {
        Self {
            client,
            counts,
            in_flight: InFlight::new(),
        }
    }

    /// The badge registry.
    #[must_use]
    pub const fn counts(&self) -> &CartCountRegistry {
        &self.counts
    }

    /// Current badge count; zero for visitors.
    pub async fn count(&self, user: Option<&CurrentUser>) -> CartCount {
        match user {
            Some(user) => {
                let token = user.token();
                self.counts
                    .current(&self.client, Some((user.id, &token)))
                    .await
            }
            None => CartCount::default(),
        }
    }

    /// The full cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for visitors, or the backend error.
    pub async fn cart(&self, user: Option<&CurrentUser>) -> Result<Cart> {
        let user = user.ok_or_else(AppError::sign_in_required)?;
        Ok(self.client.cart(&user.token()).await?)
    }

    /// Add `quantity` of a product and bump the badge by one line.
    ///
    /// # Errors
    ///
    /// - `AppError::Unauthorized` for visitors, before any backend call
    /// - `AppError::AlreadyPending` while the same add is outstanding
    /// - the backend error; the badge is left untouched
    #[instrument(skip(self, user), fields(user_id = ?user.map(|u| u.id)))]
    pub async fn add(
        &self,
        user: Option<&CurrentUser>,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartCount> {
        let user = user.ok_or_else(AppError::sign_in_required)?;
        if quantity == 0 {
            return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
        }

        let _guard = self.in_flight.try_acquire((user.id, product_id))?;

        if let Err(e) = self
            .client
            .add_to_cart(&user.token(), product_id, quantity)
            .await
        {
            warn!(error = %e, "Add to cart failed");
            return Err(e.into());
        }

        info!(quantity, "Added to cart");
        Ok(self
            .counts
            .increment(&self.client, user.id, &user.token(), 1)
            .await)
    }

    /// Remove a product line and drop the badge by one.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add`].
    #[instrument(skip(self, user), fields(user_id = ?user.map(|u| u.id)))]
    pub async fn remove(&self, user: Option<&CurrentUser>, product_id: ProductId) -> Result<CartCount> {
        let user = user.ok_or_else(AppError::sign_in_required)?;
        let _guard = self.in_flight.try_acquire((user.id, product_id))?;

        if let Err(e) = self.client.remove_from_cart(&user.token(), product_id).await {
            warn!(error = %e, "Remove from cart failed");
            return Err(e.into());
        }

        Ok(self
            .counts
            .decrement(&self.client, user.id, &user.token(), 1)
            .await)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for visitors, or the backend error.
    #[instrument(skip(self, user), fields(user_id = ?user.map(|u| u.id)))]
    pub async fn clear(&self, user: Option<&CurrentUser>) -> Result<()> {
        let user = user.ok_or_else(AppError::sign_in_required)?;
        self.client.clear_cart(&user.token()).await?;
        self.counts.reset(user.id).await;
        Ok(())
    }
}
