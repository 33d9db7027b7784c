//! Catalog reads. Public, cached when the client has a cache.

use reqwest::Method;
use respawn_core::catalog::{Category, Product};
use respawn_core::{CategoryId, ProductId};
use tracing::instrument;

use crate::cache::{CacheKey, CacheValue};
use crate::client::BackendClient;
use crate::error::ApiError;

impl BackendClient {
    /// `GET /categories`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get("/categories", None).await?;
        self.store(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// `GET /categories/id/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id);
        if let Some(CacheValue::Category(category)) = self.cached(&key).await {
            return Ok(*category);
        }

        let category: Category = self.get(&format!("/categories/id/{id}"), None).await?;
        self.store(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    /// `GET /categories/{id}/subcategories`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn subcategories(&self, id: CategoryId) -> Result<Vec<Category>, ApiError> {
        let key = CacheKey::Subcategories(id);
        if let Some(CacheValue::Categories(categories)) = self.cached(&key).await {
            return Ok(categories);
        }

        let categories: Vec<Category> = self
            .get(&format!("/categories/{id}/subcategories"), None)
            .await?;
        self.store(key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// `GET /products`. The backend returns the full collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cached(&CacheKey::Products).await {
            return Ok(products);
        }

        let products: Vec<Product> = self.get("/products", None).await?;
        self.store(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// `GET /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let product: Product = self.get(&format!("/products/{id}"), None).await?;
        self.store(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// `GET /products/{id}` straight from the backend, for price-sensitive
    /// reads like checkout. The cached copy is replaced with the answer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_fresh(&self, id: ProductId) -> Result<Product, ApiError> {
        let product: Product = self.get(&format!("/products/{id}"), None).await?;
        self.store(
            CacheKey::Product(id),
            CacheValue::Product(Box::new(product.clone())),
        )
        .await;
        Ok(product)
    }

    /// Uncached `GET /categories`, used as a readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or answers non-2xx.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let url = self.endpoint("/categories")?;
        self.send_unit(self.request(Method::GET, url, None)).await
    }
}
