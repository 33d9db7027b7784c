//! Cart route handlers.
//!
//! Form posts redirect back with `?error=` or `?success=`; the JSON variants
//! used by product cards live in [`crate::routes::api`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use respawn_core::ProductId;
use respawn_core::cart::{Cart, CartItem};
use respawn_core::format_money;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::views::{MessageQuery, Nav, redirect_with, return_path};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id.to_string(),
            name: item.product.name.clone(),
            image_url: item.product.image_url.clone().filter(|u| !u.is_empty()),
            quantity: item.quantity,
            price: item.product.unit_price().display(),
            line_total: format!("${}", format_money(item.line_total())),
        }
    }
}

/// Sum of every line, formatted.
fn cart_total(cart: &Cart) -> String {
    let total: Decimal = cart.items.iter().map(CartItem::line_total).sum();
    format!("${}", format_money(total))
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    /// Page to return to.
    pub redirect: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Nav,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Redirect back after a failed cart or favorite action.
///
/// Sign-in failures send the visitor to the login page instead.
pub(crate) fn action_failed(back: &str, error: &AppError) -> Response {
    match error {
        AppError::Unauthorized(_) => Redirect::to("/auth/login").into_response(),
        AppError::AlreadyPending(_) => redirect_with(back, "error", "pending").into_response(),
        other => redirect_with(back, "error", &other.user_message()).into_response(),
    }
}

/// Display cart page.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(messages): Query<MessageQuery>,
) -> Result<CartShowTemplate> {
    let cart = state.cart().cart(Some(&user)).await?;
    let nav = Nav::load(&state, Some(&user)).await;

    Ok(CartShowTemplate {
        nav,
        lines: cart.items.iter().map(CartLineView::from).collect(),
        total: cart_total(&cart),
        error: messages.error_text(),
        success: messages.success_text(),
    })
}

/// Add an item and return to the page the form was on.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let back = return_path(form.redirect.as_deref(), "/cart");

    match state
        .cart()
        .add(Some(&user), form.product_id, form.quantity.unwrap_or(1))
        .await
    {
        Ok(_) => redirect_with(back, "success", "added").into_response(),
        Err(e) => action_failed(back, &e),
    }
}

/// Remove a line from the cart.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    match state.cart().remove(Some(&user), form.product_id).await {
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => action_failed("/cart", &e),
    }
}

/// Empty the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Response {
    match state.cart().clear(Some(&user)).await {
        Ok(()) => redirect_with("/cart", "success", "cart_cleared").into_response(),
        Err(e) => action_failed("/cart", &e),
    }
}
