//! JSON endpoints for in-page actions.
//!
//! These use [`OptionalAuth`] so a signed-out visitor gets the same 401 from
//! the service layer as any other unauthenticated call, before any backend
//! request is made.

use axum::{
    Json,
    extract::{Query, State},
};
use respawn_core::ProductId;
use respawn_core::account::Availability;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services::CartCount;
use crate::state::AppState;

/// Body of `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// Body of `POST /api/favorites/toggle`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteRequest {
    pub product_id: ProductId,
}

/// Response of `POST /api/favorites/toggle`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteResponse {
    pub product_id: ProductId,
    pub is_favorite: bool,
    pub favorite_count: usize,
}

/// Query of `GET /api/users/check`.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Add to cart and return the new badge.
#[instrument(skip_all, fields(product_id = %body.product_id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartCount>> {
    let count = state
        .cart()
        .add(user.as_ref(), body.product_id, body.quantity)
        .await?;
    Ok(Json(count))
}

/// Current cart badge. Visitors get zero.
pub async fn cart_count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Json<CartCount> {
    Json(state.cart().count(user.as_ref()).await)
}

/// Toggle a favorite.
#[instrument(skip_all, fields(product_id = %body.product_id))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<ToggleFavoriteRequest>,
) -> Result<Json<ToggleFavoriteResponse>> {
    let toggle = state
        .favorites()
        .toggle(user.as_ref(), body.product_id)
        .await?;

    Ok(Json(ToggleFavoriteResponse {
        product_id: body.product_id,
        is_favorite: toggle.is_favorite,
        favorite_count: toggle.favorites.len(),
    }))
}

/// Best-effort username/email availability.
///
/// A failed check reports both as available; the backend still enforces
/// uniqueness when the form is saved.
#[instrument(skip_all)]
pub async fn check_availability(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<AvailabilityQuery>,
) -> Json<Availability> {
    let token = user.as_ref().map(crate::models::CurrentUser::token);
    let username = query.username.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let email = query.email.as_deref().map(str::trim).filter(|v| !v.is_empty());

    if username.is_none() && email.is_none() {
        return Json(Availability {
            username_available: true,
            email_available: true,
        });
    }

    match state
        .client()
        .check_availability(token.as_ref(), username, email)
        .await
    {
        Ok(availability) => Json(availability),
        Err(e) => {
            warn!(error = %e, "Availability check failed");
            Json(Availability {
                username_available: true,
                email_available: true,
            })
        }
    }
}
