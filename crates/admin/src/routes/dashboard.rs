//! Dashboard charts.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use respawn_core::OrderStatus;
use respawn_core::order::{GraphPeriod, GraphPoint, WeeklyProfit, status_breakdown};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AdminError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/graph/{period}", get(graph))
        .route("/dashboard/weekly-profit", get(weekly_profit))
        .route("/dashboard/status-breakdown", get(breakdown))
}

/// One slice of the status chart.
#[derive(Debug, Serialize)]
pub struct StatusSlice {
    pub status: OrderStatus,
    pub label: &'static str,
    pub count: usize,
}

/// Sales graph for a period.
#[instrument(skip(admin, state))]
pub async fn graph(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Vec<GraphPoint>>> {
    let period: GraphPeriod = period.parse().map_err(AdminError::BadRequest)?;
    let points = state.client().order_graph(&admin.token(), period).await?;
    Ok(Json(points))
}

/// Profit and order count over the last seven days.
pub async fn weekly_profit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<WeeklyProfit>> {
    Ok(Json(state.client().weekly_profit(&admin.token()).await?))
}

/// Order counts per status, computed from the full order list.
pub async fn breakdown(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusSlice>>> {
    let orders = state.orders().all(&admin.token()).await?;
    let slices = status_breakdown(&orders)
        .into_iter()
        .map(|(status, count)| StatusSlice {
            status,
            label: status.label(),
            count,
        })
        .collect();
    Ok(Json(slices))
}
