//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page
//! GET  /health                   - Health check
//! GET  /health/ready             - Readiness (backend reachable)
//!
//! # Catalog
//! GET  /products                 - Product listing (?q=&category=&min=&max=&in_stock=&sort=&page=)
//! GET  /products/{id}            - Product detail with related products
//! GET  /categories               - Top-level categories
//! GET  /categories/{id}          - Category with subcategory roll-up
//!
//! # Cart & favorites (requires auth)
//! GET  /cart                     - Cart page
//! POST /cart/add                 - Add to cart, redirect back
//! POST /cart/remove              - Remove a line
//! POST /cart/clear               - Empty the cart
//! GET  /favorites                - Favorite products
//! POST /favorites/toggle         - Toggle a favorite, redirect back
//!
//! # Checkout & orders (requires auth)
//! GET  /checkout                 - Checkout (?product=&qty= for buy-now)
//! POST /checkout                 - Place order
//! GET  /orders                   - Order history
//! GET  /orders/{id}              - Order detail
//! POST /orders/{id}/cancel       - Cancel a non-final order
//!
//! # Auth
//! GET  /auth/login               - Login page
//! POST /auth/login               - Login action
//! GET  /auth/signup              - Signup page
//! POST /auth/signup              - Signup action (emails an OTP)
//! GET  /auth/verify              - OTP page
//! POST /auth/verify              - Verify OTP and sign in
//! GET  /auth/forgot-password     - Forgot password page
//! POST /auth/forgot-password     - Request reset code
//! GET  /auth/reset-password      - Reset password page
//! POST /auth/reset-password      - Reset password action
//! POST /auth/logout              - Logout action
//!
//! # Account (requires auth)
//! GET  /account                  - Profile and addresses
//! POST /account/profile          - Save profile
//! POST /account/addresses        - Add address
//! POST /account/addresses/{id}/delete - Delete address
//!
//! # JSON API
//! POST /api/cart/add             - Add to cart, returns badge
//! GET  /api/cart/count           - Cart badge
//! POST /api/favorites/toggle     - Toggle favorite
//! GET  /api/users/check          - Username/email availability
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod favorites;
pub mod home;
pub mod orders;
pub mod products;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/verify", get(auth::verify_page).post(auth::verify))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/toggle", post(favorites::toggle))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route("/addresses", post(account::add_address))
        .route("/addresses/{id}/delete", post(account::delete_address))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/add", post(api::add_to_cart))
        .route("/cart/count", get(api::cart_count))
        .route("/favorites/toggle", post(api::toggle_favorite))
        .route("/users/check", get(api::check_availability))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        // Cart, favorites and checkout
        .nest("/cart", cart_routes().layer(api_rate_limiter()))
        .nest("/favorites", favorite_routes().layer(api_rate_limiter()))
        .route("/checkout", get(checkout::show).post(checkout::place))
        .nest("/orders", order_routes())
        // Account routes
        .nest("/account", account_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // JSON API
        .nest("/api", api_routes())
}
