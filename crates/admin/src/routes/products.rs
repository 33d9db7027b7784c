//! Product management.
//!
//! The listing reuses the storefront's filter/sort pipeline over the full
//! product list. Create and update take the specifications as the raw text
//! of the editor and reject anything that is not a JSON object before a
//! request is made.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use respawn_api::ImageRef;
use respawn_core::catalog::{Product, ProductInput, category_with_descendants, parse_specifications};
use respawn_core::listing::{ListingQuery, SortOrder};
use respawn_core::{CategoryId, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};

use super::ListResponse;
use crate::error::{AdminError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/{id}", get(show).put(update).delete(destroy))
}

/// Query of `GET /products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
}

/// Body of product create/update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Raw JSON text of the specifications editor.
    #[serde(default)]
    pub specifications: String,
}

impl ProductForm {
    /// Parse and validate into the backend payload.
    ///
    /// # Errors
    ///
    /// Returns `Catalog` for bad specifications or field rules and
    /// `BadRequest` for an image that is neither a URL nor a data URL.
    pub fn into_input(self) -> Result<ProductInput> {
        let specifications = parse_specifications(&self.specifications)?;
        let image_url = normalize_image(self.image_url.as_deref())?;

        let input = ProductInput {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            stock: self.stock,
            image_url,
            category_id: self.category_id,
            specifications,
        };
        input.validate()?;
        Ok(input)
    }
}

/// Blank stays empty; anything else must parse as an [`ImageRef`].
pub(crate) fn normalize_image(value: Option<&str>) -> Result<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => ImageRef::parse(value)
            .map(|image| Some(image.as_image_url()))
            .ok_or_else(|| {
                AdminError::BadRequest("Image must be a URL or an uploaded image".to_string())
            }),
    }
}

/// List products.
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ListResponse<Product>>> {
    let categories = match query.category {
        Some(root) => {
            let all = state.client().categories().await?;
            Some(category_with_descendants(root, &all))
        }
        None => None,
    };

    let listing = ListingQuery {
        search: query.search,
        categories,
        in_stock_only: query.in_stock.unwrap_or(false),
        sort: SortOrder::from_param(query.sort.as_deref()),
        ..ListingQuery::default()
    };

    let products = state.client().products().await?;
    Ok(Json(listing.apply(products).into()))
}

/// One product.
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.client().product(id).await?))
}

/// Create a product.
#[instrument(skip_all, fields(name = %form.name))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = form.into_input()?;
    let product = state.client().create_product(&admin.token(), &input).await?;
    info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product. The response replaces whatever the client held.
#[instrument(skip(admin, state, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(form): Json<ProductForm>,
) -> Result<Json<Product>> {
    let input = form.into_input()?;
    let product = state
        .client()
        .update_product(&admin.token(), id, &input)
        .await?;
    Ok(Json(product))
}

/// Delete a product.
#[instrument(skip(admin, state))]
pub async fn destroy(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.client().delete_product(&admin.token(), id).await?;
    info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
