//! Orders, their line items and the payload posted at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::Address;
use crate::types::{OrderId, OrderStatus, PaymentMethod, ProductId, UserId};

/// A line item with the price captured when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An order as returned by the `/orders` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Address,
    pub total_price: Decimal,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether the order can still be edited or cancelled.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !self.status.is_final()
    }

    /// Sum of all item quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub total_price: Decimal,
    pub payment_method: PaymentMethod,
}

/// Body of the admin status update (`PUT /orders/{id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Reporting window for the revenue graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GraphPeriod {
    #[default]
    Week,
    Month,
    Year,
}

impl GraphPeriod {
    /// Path segment for `GET /orders/graph/{period}`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for GraphPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(format!("invalid graph period: {s}")),
        }
    }
}

/// One bucket of the revenue graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPoint {
    pub label: String,
    pub total: Decimal,
    #[serde(default)]
    pub orders: u32,
}

/// Response of `GET /orders/weekly-profit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProfit {
    pub profit: Decimal,
    #[serde(default)]
    pub orders: u32,
}

/// Count of orders per status, in lifecycle order.
#[must_use]
pub fn status_breakdown(orders: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| {
            let count = orders.iter().filter(|order| order.status == status).count();
            (status, count)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(1),
            user_id: UserId::new(1),
            status,
            items: vec![OrderItem {
                product_id: ProductId::new(9),
                name: "Controller".to_string(),
                quantity: 2,
                price: Decimal::new(5999, 2),
            }],
            shipping_address: Address::default(),
            total_price: Decimal::new(11998, 2),
            payment_method: Some(PaymentMethod::Visa),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_editable_only_before_final_state() {
        assert!(order(OrderStatus::Shipped).is_editable());
        assert!(!order(OrderStatus::Delivered).is_editable());
        assert!(!order(OrderStatus::Cancelled).is_editable());
    }

    #[test]
    fn test_status_breakdown_counts_every_status() {
        let orders = vec![
            order(OrderStatus::Pending),
            order(OrderStatus::Pending),
            order(OrderStatus::Delivered),
        ];
        let breakdown = status_breakdown(&orders);
        assert_eq!(breakdown.len(), 5);
        assert_eq!(breakdown[0], (OrderStatus::Pending, 2));
        assert_eq!(breakdown[3], (OrderStatus::Delivered, 1));
        assert_eq!(breakdown[4], (OrderStatus::Cancelled, 0));
    }

    #[test]
    fn test_new_order_wire_format() {
        let payload = NewOrder {
            user_id: UserId::new(3),
            items: order(OrderStatus::Pending).items,
            shipping_address: Address::default(),
            total_price: Decimal::new(11998, 2),
            payment_method: PaymentMethod::Paypal,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userId"], 3);
        assert_eq!(json["items"][0]["productId"], 9);
        assert_eq!(json["paymentMethod"], "paypal");
        assert!(json["shippingAddress"].is_object());
    }
}
