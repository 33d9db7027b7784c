//! Category management.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use respawn_core::CategoryId;
use respawn_core::catalog::{Category, CategoryInput};
use serde::Deserialize;
use tracing::{info, instrument};

use super::ListResponse;
use super::products::normalize_image;
use crate::error::{AdminError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::filter::filter_categories;
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/{id}", get(show).put(update).delete(destroy))
}

/// Query of `GET /categories`.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub search: Option<String>,
}

/// Body of category create/update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

impl CategoryForm {
    /// Validate into the backend payload. `editing` is the id of the
    /// category being updated, which may not become its own parent.
    ///
    /// # Errors
    ///
    /// Returns `Catalog` for a blank name, `BadRequest` for a bad image or a
    /// self-referencing parent.
    pub fn into_input(self, editing: Option<CategoryId>) -> Result<CategoryInput> {
        if editing.is_some() && editing == self.parent_id {
            return Err(AdminError::BadRequest(
                "A category cannot be its own parent".to_string(),
            ));
        }

        let input = CategoryInput {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            image_url: normalize_image(self.image_url.as_deref())?,
            parent_id: self.parent_id,
        };
        input.validate()?;
        Ok(input)
    }
}

/// List categories.
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<ListResponse<Category>>> {
    let categories = state.client().categories().await?;
    Ok(Json(
        filter_categories(&categories, query.search.as_deref()).into(),
    ))
}

/// One category.
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    Ok(Json(state.client().category(id).await?))
}

/// Create a category.
#[instrument(skip_all, fields(name = %form.name))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(form): Json<CategoryForm>,
) -> Result<(StatusCode, Json<Category>)> {
    let input = form.into_input(None)?;
    let category = state
        .client()
        .create_category(&admin.token(), &input)
        .await?;
    info!(category_id = %category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category.
#[instrument(skip(admin, state, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(form): Json<CategoryForm>,
) -> Result<Json<Category>> {
    let input = form.into_input(Some(id))?;
    let category = state
        .client()
        .update_category(&admin.token(), id, &input)
        .await?;
    Ok(Json(category))
}

/// Delete a category.
#[instrument(skip(admin, state))]
pub async fn destroy(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    state.client().delete_category(&admin.token(), id).await?;
    info!(category_id = %id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
