//! Order management.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use respawn_core::order::Order;
use respawn_core::{OrderId, OrderStatus};
use serde::Deserialize;
use tracing::instrument;

use super::ListResponse;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::services::filter::filter_orders;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", put(update_status))
}

/// Query of `GET /orders`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Body of `PUT /orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

/// List orders, newest first.
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ListResponse<Order>>> {
    let orders = state.orders().all(&admin.token()).await?;
    Ok(Json(
        filter_orders(&orders, query.search.as_deref(), query.status).into(),
    ))
}

/// One order.
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders().get(&admin.token(), id).await?))
}

/// Change an order's status. Final orders answer 409.
#[instrument(skip(admin, state))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Order>> {
    let order = state
        .orders()
        .update_status(&admin.token(), id, body.status)
        .await?;
    Ok(Json(order))
}
