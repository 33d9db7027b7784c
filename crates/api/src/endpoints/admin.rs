//! Back-office endpoints: user moderation, catalog writes, image upload.
//!
//! Catalog writes drop the local catalog cache so the next read goes to the
//! backend.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use respawn_core::account::User;
use respawn_core::catalog::{Category, CategoryInput, Product, ProductInput};
use respawn_core::{CategoryId, ModerationAction, ProductId, UserId};
use tracing::instrument;

use crate::client::BackendClient;
use crate::dto::{ImageRef, UploadResponse};
use crate::error::ApiError;
use crate::token::AccessToken;

impl BackendClient {
    /// `GET /users`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn users(&self, token: &AccessToken) -> Result<Vec<User>, ApiError> {
        self.get("/users", Some(token)).await
    }

    /// `PATCH /users/{id}/{ban|unban|suspend|unsuspend}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(user_id = %id, action = action.path_segment()))]
    pub async fn moderate_user(
        &self,
        token: &AccessToken,
        id: UserId,
        action: ModerationAction,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/users/{id}/{}", action.path_segment()))?;
        self.send_unit(self.request(Method::PATCH, url, Some(token)))
            .await
    }

    /// `POST /products`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the product.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        token: &AccessToken,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product = self
            .send_body(Method::POST, "/products", Some(token), input)
            .await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// `PUT /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &AccessToken,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product = self
            .send_body(Method::PUT, &format!("/products/{id}"), Some(token), input)
            .await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// `DELETE /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &AccessToken, id: ProductId) -> Result<(), ApiError> {
        self.delete(&format!("/products/{id}"), token).await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// `POST /categories`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the category.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        token: &AccessToken,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category = self
            .send_body(Method::POST, "/categories", Some(token), input)
            .await?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// `PUT /categories/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        token: &AccessToken,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category = self
            .send_body(Method::PUT, &format!("/categories/{id}"), Some(token), input)
            .await?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// `DELETE /categories/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn delete_category(
        &self,
        token: &AccessToken,
        id: CategoryId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/categories/{id}"), token).await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// `POST /upload` as `multipart/form-data` with a single `image` part.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidResponse` when the answer carries neither a
    /// URL nor inline data.
    #[instrument(skip(self, token, bytes), fields(file_name = %file_name, size = bytes.len()))]
    pub async fn upload_image(
        &self,
        token: &AccessToken,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageRef, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("image", part);

        let url = self.endpoint("/upload")?;
        let response: UploadResponse = self
            .send_json(self.request(Method::POST, url, Some(token)).multipart(form))
            .await?;

        response
            .into_image_ref()
            .ok_or_else(|| ApiError::InvalidResponse("upload returned no image".to_string()))
    }
}
