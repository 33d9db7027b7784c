//! Order history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use respawn_core::order::{Order, OrderItem};
use respawn_core::{OrderId, format_money};
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::cart::action_failed;
use crate::routes::views::{AddressView, MessageQuery, Nav, redirect_with};
use crate::state::AppState;

/// Order line display data for templates.
#[derive(Clone)]
pub struct OrderItemView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            price: format!("${}", format_money(item.price)),
            line_total: format!("${}", format_money(item.line_total())),
        }
    }
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status: &'static str,
    /// Lowercase status for CSS classes.
    pub status_class: String,
    pub placed_on: String,
    pub total: String,
    pub item_count: u32,
    pub items: Vec<OrderItemView>,
    pub address: AddressView,
    pub cancellable: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            status: order.status.label(),
            status_class: order.status.as_str().to_lowercase(),
            placed_on: order
                .created_at
                .map(|at| at.format("%B %-d, %Y").to_string())
                .unwrap_or_default(),
            total: format!("${}", format_money(order.total_price)),
            item_count: order.item_count(),
            items: order.items.iter().map(OrderItemView::from).collect(),
            address: AddressView::from(&order.shipping_address),
            cancellable: order.is_editable(),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub nav: Nav,
    pub orders: Vec<OrderView>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub nav: Nav,
    pub order: OrderView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Load one of the user's own orders; anyone else's is reported missing.
async fn own_order(state: &AppState, user: &CurrentUser, id: OrderId) -> Result<Order> {
    let order = state.client().order(&user.token(), id).await?;
    if order.user_id != user.id {
        return Err(AppError::NotFound(format!("order {id}")));
    }
    Ok(order)
}

/// Display the user's orders, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersTemplate> {
    let mut orders = state.client().user_orders(&user.token(), user.id).await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let nav = Nav::load(&state, Some(&user)).await;

    Ok(OrdersTemplate {
        nav,
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// Display one order.
#[instrument(skip(state, user, messages), fields(user_id = %user.id, order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Query(messages): Query<MessageQuery>,
) -> Result<OrderShowTemplate> {
    let order = own_order(&state, &user, id).await?;
    let nav = Nav::load(&state, Some(&user)).await;

    Ok(OrderShowTemplate {
        nav,
        order: OrderView::from(&order),
        error: messages.error_text(),
        success: messages.success_text(),
    })
}

/// Cancel an order that has not reached a final state.
#[instrument(skip(state, user), fields(user_id = %user.id, order_id = %id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Response {
    let back = format!("/orders/{id}");

    let attempt = async {
        let order = own_order(&state, &user, id).await?;
        if !order.is_editable() {
            return Err(AppError::Conflict(format!(
                "This order is {} and can no longer be cancelled.",
                order.status.label().to_lowercase()
            )));
        }
        Ok(state.client().cancel_order(&user.token(), id).await?)
    };

    match attempt.await {
        Ok(order) => {
            info!(status = %order.status, "Order cancelled");
            redirect_with(&back, "success", "order_cancelled").into_response()
        }
        Err(e) => action_failed(&back, &e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_view() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 12,
            "userId": 3,
            "status": "SHIPPED",
            "items": [
                {"productId": 1, "name": "Pad", "quantity": 2, "price": "10"},
                {"productId": 2, "name": "Cable", "quantity": 1, "price": "5.5"}
            ],
            "totalPrice": "25.5",
            "createdAt": "2026-03-04T10:00:00Z"
        }))
        .unwrap();

        let view = OrderView::from(&order);
        assert_eq!(view.total, "$25.50");
        assert_eq!(view.item_count, 3);
        assert_eq!(view.status, "Shipped");
        assert_eq!(view.status_class, "shipped");
        assert_eq!(view.placed_on, "March 4, 2026");
        assert!(view.cancellable);

        let delivered = Order {
            status: respawn_core::OrderStatus::Delivered,
            ..order
        };
        assert!(!OrderView::from(&delivered).cancellable);
    }
}
