//! `/favorites` endpoints.

use reqwest::Method;
use respawn_core::ProductId;
use respawn_core::cart::FavoriteSet;
use respawn_core::catalog::Product;
use serde::Serialize;
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::token::AccessToken;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteBody {
    product_id: ProductId,
}

impl BackendClient {
    /// `GET /favorites`: the favorite products, in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn favorites(&self, token: &AccessToken) -> Result<Vec<Product>, ApiError> {
        self.get("/favorites", Some(token)).await
    }

    /// The favorite product ids only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn favorite_ids(&self, token: &AccessToken) -> Result<FavoriteSet, ApiError> {
        let products = self.favorites(token).await?;
        Ok(products.iter().map(|p| p.id).collect())
    }

    /// `POST /favorites`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_favorite(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.send_body_unit(
            Method::POST,
            "/favorites",
            Some(token),
            &FavoriteBody { product_id },
        )
        .await
    }

    /// `DELETE /favorites/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_favorite(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/favorites/{product_id}"), token)
            .await
    }
}
