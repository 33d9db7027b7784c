//! `/orders` endpoints: customer order flow and admin order management.

use reqwest::Method;
use respawn_core::order::{GraphPeriod, GraphPoint, NewOrder, Order, StatusUpdate, WeeklyProfit};
use respawn_core::{OrderId, OrderStatus, UserId};
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::token::AccessToken;

impl BackendClient {
    /// `POST /orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order.
    #[instrument(skip(self, token, order), fields(user_id = %order.user_id, items = order.items.len()))]
    pub async fn create_order(
        &self,
        token: &AccessToken,
        order: &NewOrder,
    ) -> Result<Order, ApiError> {
        self.send_body(Method::POST, "/orders", Some(token), order)
            .await
    }

    /// `GET /orders/user/{id}`: one customer's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn user_orders(
        &self,
        token: &AccessToken,
        user_id: UserId,
    ) -> Result<Vec<Order>, ApiError> {
        self.get(&format!("/orders/user/{user_id}"), Some(token))
            .await
    }

    /// `GET /orders` (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn all_orders(&self, token: &AccessToken) -> Result<Vec<Order>, ApiError> {
        self.get("/orders", Some(token)).await
    }

    /// `GET /orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn order(&self, token: &AccessToken, id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{id}"), Some(token)).await
    }

    /// `PUT /orders/{id}` (admin). Callers check [`OrderStatus::is_final`]
    /// on the current order first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        token: &AccessToken,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.send_body(
            Method::PUT,
            &format!("/orders/{id}"),
            Some(token),
            &StatusUpdate { status },
        )
        .await
    }

    /// `PATCH /orders/{id}/cancel`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn cancel_order(&self, token: &AccessToken, id: OrderId) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("/orders/{id}/cancel"))?;
        self.send_json(self.request(Method::PATCH, url, Some(token)))
            .await
    }

    /// `GET /orders/graph/{period}` (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(period = period.as_str()))]
    pub async fn order_graph(
        &self,
        token: &AccessToken,
        period: GraphPeriod,
    ) -> Result<Vec<GraphPoint>, ApiError> {
        self.get(&format!("/orders/graph/{}", period.as_str()), Some(token))
            .await
    }

    /// `GET /orders/weekly-profit` (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn weekly_profit(&self, token: &AccessToken) -> Result<WeeklyProfit, ApiError> {
        self.get("/orders/weekly-profit", Some(token)).await
    }
}
