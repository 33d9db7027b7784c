//! Order management for the back-office.

use respawn_api::{AccessToken, BackendClient};
use respawn_core::order::Order;
use respawn_core::{OrderId, OrderStatus};
use tracing::{info, instrument};

use crate::error::{AdminError, Result};

/// Order listing and status transitions.
#[derive(Clone)]
pub struct OrderDesk {
    client: BackendClient,
}

impl OrderDesk {
    /// Create the service.
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Every order in the store.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn all(&self, token: &AccessToken) -> Result<Vec<Order>> {
        Ok(self.client.all_orders(token).await?)
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns the backend error (`NotFound` maps to 404).
    pub async fn get(&self, token: &AccessToken, id: OrderId) -> Result<Order> {
        Ok(self.client.order(token, id).await?)
    }

    /// Move an order to `status`.
    ///
    /// Delivered and cancelled orders are frozen: the current order is read
    /// first and a final one is refused with `Conflict` before any mutation
    /// is sent. Setting the status an order already has is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` for a final order, otherwise the backend error.
    #[instrument(skip(self, token), fields(order_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        token: &AccessToken,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order> {
        let current = self.client.order(token, id).await?;

        if current.status.is_final() {
            return Err(AdminError::Conflict(format!(
                "Order {id} is {} and can no longer change",
                current.status.label().to_lowercase()
            )));
        }
        if current.status == status {
            return Ok(current);
        }

        let updated = self.client.update_order_status(token, id, status).await?;
        info!(order_id = %id, from = %current.status, to = %updated.status, "Order status updated");
        Ok(updated)
    }
}
