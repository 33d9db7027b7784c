//! Checkout aggregation and order placement.
//!
//! A checkout is either "buy now" for a single product or the whole cart.
//! Everything is fetched fresh on every visit: profile first, then the
//! product or the cart.

use chrono::NaiveDate;
use respawn_api::BackendClient;
use respawn_core::ProductId;
use respawn_core::account::{Address, User};
use respawn_core::checkout::{
    CheckoutError, CheckoutLine, PaymentDetails, checkout_total, validate_order,
};
use respawn_core::order::{NewOrder, Order};
use rust_decimal::Decimal;
use tracing::{error, info, instrument};

use crate::error::{AppError, Result};
use crate::models::CurrentUser;
use crate::services::cart_count::CartCountRegistry;

/// What is being checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutSource {
    /// "Buy now" from a product page.
    Single { product_id: ProductId, quantity: u32 },
    /// Everything in the cart.
    Cart,
}

impl CheckoutSource {
    /// From the `?product=&qty=` query; no product means the cart. A missing
    /// quantity is one.
    #[must_use]
    pub fn from_query(product: Option<ProductId>, quantity: Option<u32>) -> Self {
        match product {
            Some(product_id) => Self::Single {
                product_id,
                quantity: quantity.unwrap_or(1),
            },
            None => Self::Cart,
        }
    }
}

/// Everything the checkout page shows.
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    pub source: CheckoutSource,
    pub lines: Vec<CheckoutLine>,
    pub total: Decimal,
    pub profile: User,
    pub default_address: Option<Address>,
}

/// Checkout for the signed-in user.
#[derive(Clone)]
pub struct CheckoutService {
    client: BackendClient,
    counts: CartCountRegistry,
}

impl CheckoutService {
    /// Create the service.
    #[must_use]
    pub const fn new(client: BackendClient, counts: CartCountRegistry) -> Self {
        Self { client, counts }
    }

    /// Load the profile and the lines being bought.
    ///
    /// # Errors
    ///
    /// - `AppError::Unauthorized` for visitors
    /// - `AppError::Checkout` for a zero quantity
    /// - the first backend error; later calls are not made
    #[instrument(skip(self, user), fields(user_id = ?user.map(|u| u.id)))]
    pub async fn assemble(
        &self,
        user: Option<&CurrentUser>,
        source: CheckoutSource,
    ) -> Result<CheckoutSummary> {
        let user = user.ok_or_else(AppError::sign_in_required)?;
        let token = user.token();

        if let CheckoutSource::Single { quantity: 0, .. } = source {
            return Err(CheckoutError::InvalidQuantity.into());
        }

        let profile = self.client.profile(&token).await?;

        let lines = match source {
            CheckoutSource::Single {
                product_id,
                quantity,
            } => {
                let product = self.client.product_fresh(product_id).await?;
                vec![CheckoutLine { product, quantity }]
            }
            CheckoutSource::Cart => self
                .client
                .cart(&token)
                .await?
                .items
                .into_iter()
                .map(|item| CheckoutLine {
                    product: item.product,
                    quantity: item.quantity,
                })
                .collect(),
        };

        let total = checkout_total(&lines);
        let default_address = profile.default_address().cloned();

        Ok(CheckoutSummary {
            source,
            lines,
            total,
            profile,
            default_address,
        })
    }

    /// Validate and submit the order.
    ///
    /// Payment is simulated and always succeeds once the details validate.
    /// After a cart checkout the cart is cleared; a failed clear is logged and
    /// the order still stands.
    ///
    /// # Errors
    ///
    /// - everything [`Self::assemble`] returns
    /// - `AppError::Checkout` for an incomplete address or invalid payment,
    ///   before the order is posted
    /// - the backend error from `POST /orders`
    #[instrument(skip(self, user, address, payment), fields(user_id = ?user.map(|u| u.id)))]
    pub async fn place_order(
        &self,
        user: Option<&CurrentUser>,
        source: CheckoutSource,
        address: Address,
        payment: &PaymentDetails,
        today: NaiveDate,
    ) -> Result<Order> {
        let summary = self.assemble(user, source).await?;
        let user = user.ok_or_else(AppError::sign_in_required)?;
        let token = user.token();

        validate_order(&summary.lines, &address, payment, today)?;

        let new_order = NewOrder {
            user_id: summary.profile.id,
            items: summary
                .lines
                .iter()
                .map(CheckoutLine::to_order_item)
                .collect(),
            shipping_address: address,
            total_price: summary.total,
            payment_method: payment.method,
        };

        let order = self.client.create_order(&token, &new_order).await?;
        info!(order_id = %order.id, total = %order.total_price, "Order placed");

        match source {
            CheckoutSource::Cart => {
                if let Err(e) = self.client.clear_cart(&token).await {
                    error!(error = %e, order_id = %order.id, "Order placed but cart clear failed");
                    // The backend cart still holds the items
                    let counter = self.counts.counter(user.id).await;
                    counter.refresh(&self.client, Some(&token)).await;
                } else {
                    self.counts.reset(user.id).await;
                }
            }
            CheckoutSource::Single { .. } => {
                let counter = self.counts.counter(user.id).await;
                counter.refresh(&self.client, Some(&token)).await;
            }
        }

        Ok(order)
    }
}
