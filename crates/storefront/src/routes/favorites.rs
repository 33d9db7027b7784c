//! Favorites route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use respawn_core::ProductId;
use respawn_core::cart::FavoriteSet;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::cart::action_failed;
use crate::routes::views::{Nav, ProductView, redirect_with, return_path};
use crate::state::AppState;

/// Toggle favorite form data.
#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteForm {
    pub product_id: ProductId,
    pub redirect: Option<String>,
}

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites/index.html")]
pub struct FavoritesTemplate {
    pub nav: Nav,
    pub products: Vec<ProductView>,
}

/// Display the favorite products.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<FavoritesTemplate> {
    let products = state.favorites().list(Some(&user)).await?;
    let favorites: FavoriteSet = products.iter().map(|p| p.id).collect();
    let nav = Nav::load(&state, Some(&user)).await;

    Ok(FavoritesTemplate {
        nav,
        products: ProductView::list(&products, &favorites),
    })
}

/// Flip a product's favorite state and return to the page.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ToggleFavoriteForm>,
) -> Response {
    let back = return_path(form.redirect.as_deref(), "/favorites");

    match state.favorites().toggle(Some(&user), form.product_id).await {
        Ok(_) => redirect_with(back, "success", "favorites_updated").into_response(),
        Err(e) => action_failed(back, &e),
    }
}
