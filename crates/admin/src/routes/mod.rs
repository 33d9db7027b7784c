//! HTTP route handlers for admin.
//!
//! Every route speaks JSON and, apart from login, requires a signed-in admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /auth/login                 - Sign in (admin role required)
//! POST   /auth/logout                - Sign out
//! GET    /auth/me                    - Current admin
//!
//! # Dashboard
//! GET    /dashboard/graph/{period}   - Sales graph (week|month|year)
//! GET    /dashboard/weekly-profit    - Profit over the last 7 days
//! GET    /dashboard/status-breakdown - Order counts per status
//!
//! # Products
//! GET    /products                   - List (search, category, stock, sort)
//! POST   /products                   - Create
//! GET    /products/{id}              - Detail
//! PUT    /products/{id}              - Update
//! DELETE /products/{id}              - Delete
//!
//! # Categories
//! GET    /categories                 - List (search)
//! POST   /categories                 - Create
//! GET    /categories/{id}            - Detail
//! PUT    /categories/{id}            - Update
//! DELETE /categories/{id}            - Delete
//!
//! # Orders
//! GET    /orders                     - List (search, status)
//! GET    /orders/{id}                - Detail
//! PUT    /orders/{id}/status         - Change status (409 once final)
//!
//! # Users
//! GET    /users                      - List (search, status), cached
//! GET    /users/{id}                 - Detail
//! POST   /users/{id}/{action}        - ban | unban | suspend | unsuspend
//!
//! # Uploads
//! POST   /uploads                    - Multipart image upload
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod uploads;
pub mod users;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(orders::router())
        .merge(users::router())
        .merge(uploads::router())
}

/// Envelope for table endpoints.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub total: usize,
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}
