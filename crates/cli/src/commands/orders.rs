//! Order history of the signed-in account.

use std::cmp::Reverse;

use respawn_core::order::Order;
use respawn_core::{OrderId, Price};

use super::{CliError, Context};
use crate::output::table;

/// Table rows for an order list.
pub fn order_rows(orders: &[Order]) -> Vec<Vec<String>> {
    orders
        .iter()
        .map(|order| {
            vec![
                format!("#{}", order.id),
                order
                    .created_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                order.status.label().to_string(),
                order.item_count().to_string(),
                Price::usd(order.total_price).display(),
            ]
        })
        .collect()
}

/// Detail view of one order.
pub fn order_lines(order: &Order) -> Vec<String> {
    let mut lines = vec![
        format!("Order #{} ({})", order.id, order.status.label()),
        format!(
            "Ship to {}, {}, {}",
            order.shipping_address.full_name,
            order.shipping_address.street,
            order.shipping_address.city
        ),
        String::new(),
    ];

    let rows: Vec<Vec<String>> = order
        .items
        .iter()
        .map(|item| {
            vec![
                item.name.clone(),
                item.quantity.to_string(),
                Price::usd(item.line_total()).display(),
            ]
        })
        .collect();
    lines.extend(table(&["ITEM", "QTY", "SUBTOTAL"], &rows));
    lines.push(format!("Total {}", Price::usd(order.total_price).display()));
    lines
}

/// List the account's orders, newest first.
///
/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let token = ctx.token()?;
    let user = ctx.client.profile(token).await?;
    let mut orders = ctx.client.user_orders(token, user.id).await?;
    orders.sort_by_key(|order| Reverse((order.created_at, order.id)));

    ctx.out.emit(&orders, || {
        if orders.is_empty() {
            return vec!["No orders yet".to_string()];
        }
        table(&["ORDER", "DATE", "STATUS", "ITEMS", "TOTAL"], &order_rows(&orders))
    })
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn show(ctx: &Context, id: OrderId) -> Result<(), CliError> {
    let order = ctx.client.order(ctx.token()?, id).await?;
    ctx.out.emit(&order, || order_lines(&order))
}

/// Cancel an order that has not been delivered or cancelled.
///
/// # Errors
///
/// Returns `Invalid` for a final order (checked before calling the backend),
/// otherwise the backend error.
pub async fn cancel(ctx: &Context, id: OrderId) -> Result<(), CliError> {
    let token = ctx.token()?;
    let order = ctx.client.order(token, id).await?;
    if !order.is_editable() {
        return Err(CliError::Invalid(format!(
            "Order #{id} is {} and cannot be cancelled",
            order.status.label().to_lowercase()
        )));
    }

    let cancelled = ctx.client.cancel_order(token, id).await?;
    tracing::info!(order_id = %id, "Order cancelled");
    ctx.out.emit(&cancelled, || {
        vec![format!("Order #{id} is now {}", cancelled.status.label().to_lowercase())]
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Order {
        serde_json::from_value(json!({
            "id": 1001,
            "userId": 7,
            "status": "SHIPPED",
            "items": [
                {"productId": 1, "name": "Controller", "quantity": 2, "price": "10.00"},
                {"productId": 2, "name": "Cable", "quantity": 1, "price": "5.50"}
            ],
            "shippingAddress": {
                "fullName": "Ada Lovelace",
                "street": "1 Loop Rd",
                "city": "London",
                "state": "LDN",
                "postalCode": "N1",
                "country": "UK"
            },
            "totalPrice": "25.50",
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_order_rows() {
        assert_eq!(
            order_rows(&[sample()]),
            vec![vec!["#1001", "2026-03-01", "Shipped", "3", "$25.50"]]
        );
    }

    #[test]
    fn test_order_lines() {
        let lines = order_lines(&sample());
        assert_eq!(lines.first().unwrap(), "Order #1001 (Shipped)");
        assert_eq!(lines.last().unwrap(), "Total $25.50");
        assert!(lines.iter().any(|line| line.starts_with("Controller  2")));
    }
}
