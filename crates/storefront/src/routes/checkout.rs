//! Checkout route handlers.
//!
//! `GET /checkout` shows either a single product (`?product=&qty=`) or the
//! whole cart; `POST /checkout` validates and places the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use respawn_core::account::Address;
use respawn_core::checkout::{CheckoutLine, PaymentDetails};
use respawn_core::format_money;
use respawn_core::{PaymentMethod, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::views::{Nav, redirect_with};
use crate::services::CheckoutSource;
use crate::state::AppState;

// =============================================================================
// Query & Form Types
// =============================================================================

/// `?product=&qty=`; both optional. Blank values are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    pub product: Option<String>,
    pub qty: Option<String>,
    pub error: Option<String>,
}

impl CheckoutQuery {
    fn source(&self) -> Result<CheckoutSource> {
        source_from(self.product.as_deref(), self.qty.as_deref())
    }
}

fn source_from(product: Option<&str>, qty: Option<&str>) -> Result<CheckoutSource> {
    let product = match product.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => Some(
            p.parse::<ProductId>()
                .map_err(|_| AppError::BadRequest("Invalid product".to_string()))?,
        ),
        None => None,
    };
    let quantity = match qty.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => Some(
            q.parse::<u32>()
                .map_err(|_| AppError::BadRequest("Invalid quantity".to_string()))?,
        ),
        None => None,
    };
    Ok(CheckoutSource::from_query(product, quantity))
}

/// Checkout form data: the source, the shipping address and payment.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    pub product: Option<String>,
    pub qty: Option<String>,

    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    pub phone: Option<String>,

    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_expiry: String,
    #[serde(default)]
    pub card_cvv: String,
    #[serde(default)]
    pub paypal_email: String,
}

impl CheckoutForm {
    fn address(&self) -> Address {
        Address {
            id: None,
            full_name: self.full_name.trim().to_string(),
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
            is_default: false,
        }
    }

    fn payment(&self) -> Result<PaymentDetails> {
        let method = self
            .method
            .parse::<PaymentMethod>()
            .map_err(AppError::BadRequest)?;
        Ok(PaymentDetails {
            method,
            card_number: self.card_number.clone(),
            card_expiry: self.card_expiry.trim().to_string(),
            card_cvv: self.card_cvv.trim().to_string(),
            paypal_email: self.paypal_email.trim().to_string(),
        })
    }

    /// The checkout page URL this form was posted from.
    fn page_url(&self) -> String {
        match (&self.product, &self.qty) {
            (Some(product), qty) if !product.trim().is_empty() => format!(
                "/checkout?product={}&qty={}",
                urlencoding::encode(product.trim()),
                urlencoding::encode(qty.as_deref().unwrap_or("1").trim())
            ),
            _ => "/checkout".to_string(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout line display data for templates.
#[derive(Clone)]
pub struct CheckoutLineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CheckoutLine> for CheckoutLineView {
    fn from(line: &CheckoutLine) -> Self {
        Self {
            name: line.product.name.clone(),
            quantity: line.quantity,
            price: line.product.unit_price().display(),
            line_total: format!("${}", format_money(line.line_total())),
        }
    }
}

/// Payment method choice for the form.
#[derive(Clone)]
pub struct PaymentOption {
    pub value: &'static str,
    pub label: &'static str,
    pub available: bool,
}

const PAYMENT_OPTIONS: [(PaymentMethod, &str, &str); 3] = [
    (PaymentMethod::Visa, "visa", "Credit card"),
    (PaymentMethod::Paypal, "paypal", "PayPal"),
    (PaymentMethod::Crypto, "crypto", "Crypto (coming soon)"),
];

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub nav: Nav,
    pub lines: Vec<CheckoutLineView>,
    pub total: String,
    /// Prefilled from the default address.
    pub address: Address,
    pub product: String,
    pub qty: String,
    pub payment_options: Vec<PaymentOption>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<CheckoutQuery>,
) -> Result<Response> {
    let source = query.source()?;
    let summary = state.checkout().assemble(Some(&user), source).await?;

    if summary.lines.is_empty() {
        return Ok(redirect_with("/cart", "error", "Your cart is empty.").into_response());
    }

    let (product, qty) = match source {
        CheckoutSource::Single {
            product_id,
            quantity,
        } => (product_id.to_string(), quantity.to_string()),
        CheckoutSource::Cart => (String::new(), String::new()),
    };

    let nav = Nav::load(&state, Some(&user)).await;

    Ok(CheckoutTemplate {
        nav,
        lines: summary.lines.iter().map(CheckoutLineView::from).collect(),
        total: format!("${}", format_money(summary.total)),
        address: summary.default_address.unwrap_or_default(),
        product,
        qty,
        payment_options: PAYMENT_OPTIONS
            .into_iter()
            .map(|(method, value, label)| PaymentOption {
                value,
                label,
                available: method.is_available(),
            })
            .collect(),
        error: query.error,
    }
    .into_response())
}

/// Validate and place the order.
///
/// Validation failures return to the checkout page with the message; the
/// order is only posted once everything passes.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let back = form.page_url();

    let attempt = async {
        let source = source_from(form.product.as_deref(), form.qty.as_deref())?;
        let payment = form.payment()?;
        let today = chrono::Utc::now().date_naive();
        state
            .checkout()
            .place_order(Some(&user), source, form.address(), &payment, today)
            .await
    };

    match attempt.await {
        Ok(order) => {
            redirect_with(&format!("/orders/{}", order.id), "success", "order_placed")
                .into_response()
        }
        Err(AppError::Unauthorized(_)) => Redirect::to("/auth/login").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Checkout rejected");
            redirect_with(&back, "error", &e.user_message()).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_query_values() {
        assert_eq!(source_from(None, None).unwrap(), CheckoutSource::Cart);
        assert_eq!(source_from(Some(""), Some("")).unwrap(), CheckoutSource::Cart);
        assert_eq!(
            source_from(Some("7"), Some("2")).unwrap(),
            CheckoutSource::Single {
                product_id: ProductId::new(7),
                quantity: 2
            }
        );
        assert!(source_from(Some("seven"), None).is_err());
        assert!(source_from(Some("7"), Some("-1")).is_err());
    }

    #[test]
    fn test_form_page_url_keeps_source() {
        let form = CheckoutForm {
            product: Some("7".to_string()),
            qty: Some("2".to_string()),
            ..CheckoutForm::default()
        };
        assert_eq!(form.page_url(), "/checkout?product=7&qty=2");
        assert_eq!(CheckoutForm::default().page_url(), "/checkout");
    }

    #[test]
    fn test_form_payment_method() {
        let form = CheckoutForm {
            method: "paypal".to_string(),
            paypal_email: " buyer@example.com ".to_string(),
            ..CheckoutForm::default()
        };
        let payment = form.payment().unwrap();
        assert_eq!(payment.method, PaymentMethod::Paypal);
        assert_eq!(payment.paypal_email, "buyer@example.com");

        let form = CheckoutForm {
            method: "cash".to_string(),
            ..CheckoutForm::default()
        };
        assert!(form.payment().is_err());
    }
}
