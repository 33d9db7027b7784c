//! `/cart` endpoints.

use reqwest::Method;
use respawn_core::ProductId;
use respawn_core::cart::{AddToCart, Cart};
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::token::AccessToken;

impl BackendClient {
    /// `GET /cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &AccessToken) -> Result<Cart, ApiError> {
        self.get("/cart", Some(token)).await
    }

    /// `POST /cart/add`. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (out of stock, bad token).
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        token: &AccessToken,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = AddToCart {
            product_id,
            quantity,
        };
        self.send_body_unit(Method::POST, "/cart/add", Some(token), &body)
            .await
    }

    /// `DELETE /cart/remove/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/cart/remove/{product_id}"), token)
            .await
    }

    /// `DELETE /cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &AccessToken) -> Result<(), ApiError> {
        self.delete("/cart", token).await
    }
}
