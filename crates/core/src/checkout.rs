//! Checkout rules: totals, address completeness and payment validation.
//!
//! Payment is never charged anywhere; these checks only gate the order
//! submission form.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::account::Address;
use crate::catalog::Product;
use crate::order::OrderItem;
use crate::types::{Email, EmailError, PaymentMethod};

static VISA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^4\d{12}(?:\d{3})?$").expect("Invalid regex"));
static MASTERCARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:5[1-5]\d{2}|222[1-9]|22[3-9]\d|2[3-6]\d{2}|27[01]\d|2720)\d{12}$")
        .expect("Invalid regex")
});
static AMEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^3[47]\d{13}$").expect("Invalid regex"));
static EXPIRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/(\d{2})$").expect("Invalid regex"));
static CVV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("Invalid regex"));

/// Card network detected from the number prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
}

impl CardBrand {
    /// Lowercase brand name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
        }
    }
}

/// A product with the quantity being bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product: Product,
    pub quantity: u32,
}

impl CheckoutLine {
    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    /// Snapshot the line into an order item, capturing the current price.
    #[must_use]
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            product_id: self.product.id,
            name: self.product.name.clone(),
            quantity: self.quantity,
            price: self.product.price,
        }
    }
}

/// Payment fields submitted with the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    #[serde(default)]
    pub card_number: String,
    /// `MM/YY`.
    #[serde(default)]
    pub card_expiry: String,
    #[serde(default)]
    pub card_cvv: String,
    #[serde(default)]
    pub paypal_email: String,
}

/// Why payment details were rejected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentError {
    #[error("card number must be 16 digits")]
    CardNumber,
    #[error("expiry must be in MM/YY format")]
    ExpiryFormat,
    #[error("card has expired")]
    CardExpired,
    #[error("CVV must be 3 or 4 digits")]
    Cvv,
    #[error("invalid PayPal email: {0}")]
    PaypalEmail(#[from] EmailError),
    #[error("this payment method is not available")]
    MethodUnavailable,
}

/// Why an order could not be submitted.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CheckoutError {
    #[error("shipping address is incomplete (missing: {})", .missing.join(", "))]
    IncompleteAddress { missing: Vec<&'static str> },
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error("there is nothing to check out")]
    EmptyOrder,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// Sum of `price * quantity`, rounded to cents.
#[must_use]
pub fn checkout_total(lines: &[CheckoutLine]) -> Decimal {
    lines
        .iter()
        .map(CheckoutLine::line_total)
        .sum::<Decimal>()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Names of the required address fields that are blank.
#[must_use]
pub fn missing_address_fields(address: &Address) -> Vec<&'static str> {
    [
        ("fullName", &address.full_name),
        ("street", &address.street),
        ("city", &address.city),
        ("state", &address.state),
        ("postalCode", &address.postal_code),
        ("country", &address.country),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
}

/// All six required address fields are non-empty. Formats (postal code,
/// country, phone) are not checked.
#[must_use]
pub fn is_address_complete(address: &Address) -> bool {
    missing_address_fields(address).is_empty()
}

/// Strip the separators people type into card fields.
fn card_digits(number: &str) -> String {
    number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Detect the card network from the number. Spaces and dashes are ignored.
#[must_use]
pub fn classify_card(number: &str) -> Option<CardBrand> {
    let digits = card_digits(number);
    if VISA.is_match(&digits) {
        Some(CardBrand::Visa)
    } else if MASTERCARD.is_match(&digits) {
        Some(CardBrand::Mastercard)
    } else if AMEX.is_match(&digits) {
        Some(CardBrand::Amex)
    } else {
        None
    }
}

/// Check an `MM/YY` expiry against `today`; the current month is still valid.
///
/// # Errors
///
/// Returns [`PaymentError::ExpiryFormat`] or [`PaymentError::CardExpired`].
pub fn validate_expiry(expiry: &str, today: NaiveDate) -> Result<(), PaymentError> {
    let captures = EXPIRY
        .captures(expiry.trim())
        .ok_or(PaymentError::ExpiryFormat)?;

    let field = |index: usize| captures.get(index).map_or("", |m| m.as_str());
    let month: u32 = field(1).parse().map_err(|_| PaymentError::ExpiryFormat)?;
    let year: i32 = field(2).parse().map_err(|_| PaymentError::ExpiryFormat)?;
    let year = 2000 + year;

    if (year, month) < (today.year(), today.month()) {
        return Err(PaymentError::CardExpired);
    }
    Ok(())
}

/// Validate the payment form for the selected method.
///
/// # Errors
///
/// Returns the first failing rule for the method. `Crypto` always fails.
pub fn validate_payment(details: &PaymentDetails, today: NaiveDate) -> Result<(), PaymentError> {
    match details.method {
        PaymentMethod::Visa => {
            let digits = card_digits(&details.card_number);
            if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(PaymentError::CardNumber);
            }
            validate_expiry(&details.card_expiry, today)?;
            if !CVV.is_match(details.card_cvv.trim()) {
                return Err(PaymentError::Cvv);
            }
            Ok(())
        }
        PaymentMethod::Paypal => {
            Email::parse_mailbox(&details.paypal_email)?;
            Ok(())
        }
        PaymentMethod::Crypto => Err(PaymentError::MethodUnavailable),
    }
}

/// Validate everything the order form requires before it is posted.
///
/// # Errors
///
/// Returns [`CheckoutError`] describing the first problem found.
pub fn validate_order(
    lines: &[CheckoutLine],
    address: &Address,
    payment: &PaymentDetails,
    today: NaiveDate,
) -> Result<(), CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }
    if lines.iter().any(|line| line.quantity == 0) {
        return Err(CheckoutError::InvalidQuantity);
    }

    let missing = missing_address_fields(address);
    if !missing.is_empty() {
        return Err(CheckoutError::IncompleteAddress { missing });
    }

    validate_payment(payment, today)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::format_money;

    fn line(price: &str, quantity: u32) -> CheckoutLine {
        CheckoutLine {
            product: serde_json::from_value(serde_json::json!({
                "id": 1,
                "name": "Item",
                "price": price,
            }))
            .unwrap(),
            quantity,
        }
    }

    fn complete_address() -> Address {
        Address {
            full_name: "Ada Byron".to_string(),
            street: "1 Loop Rd".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            postal_code: "73301".to_string(),
            country: "US".to_string(),
            ..Address::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn visa(expiry: &str, cvv: &str) -> PaymentDetails {
        PaymentDetails {
            method: PaymentMethod::Visa,
            card_number: "4111 1111 1111 1111".to_string(),
            card_expiry: expiry.to_string(),
            card_cvv: cvv.to_string(),
            paypal_email: String::new(),
        }
    }

    #[test]
    fn test_checkout_total() {
        let total = checkout_total(&[line("10", 2), line("5.5", 1)]);
        assert_eq!(format_money(total), "25.50");
        assert_eq!(checkout_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_address_missing_postal_code_is_incomplete() {
        let mut address = complete_address();
        assert!(is_address_complete(&address));

        address.postal_code = "   ".to_string();
        assert!(!is_address_complete(&address));
        assert_eq!(missing_address_fields(&address), vec!["postalCode"]);
    }

    #[test]
    fn test_classify_card() {
        assert_eq!(classify_card("4111 1111 1111 1111"), Some(CardBrand::Visa));
        assert_eq!(classify_card("5500 0000 0000 0004"), Some(CardBrand::Mastercard));
        assert_eq!(classify_card("2221-0000-0000-0009"), Some(CardBrand::Mastercard));
        assert_eq!(classify_card("3782 822463 10005"), Some(CardBrand::Amex));
        assert_eq!(classify_card("1234 5678 9012 3456"), None);
        assert_eq!(classify_card(""), None);
    }

    #[test]
    fn test_visa_expiry_rules() {
        assert!(validate_payment(&visa("10/26", "123"), today()).is_ok());
        assert!(validate_payment(&visa("01/30", "1234"), today()).is_ok());
        assert!(matches!(
            validate_payment(&visa("09/26", "123"), today()),
            Err(PaymentError::CardExpired)
        ));
        assert!(matches!(
            validate_payment(&visa("13/26", "123"), today()),
            Err(PaymentError::ExpiryFormat)
        ));
    }

    #[test]
    fn test_visa_card_and_cvv_rules() {
        let mut details = visa("12/27", "12");
        assert!(matches!(
            validate_payment(&details, today()),
            Err(PaymentError::Cvv)
        ));

        details.card_cvv = "123".to_string();
        details.card_number = "4111 1111 1111".to_string();
        assert!(matches!(
            validate_payment(&details, today()),
            Err(PaymentError::CardNumber)
        ));
    }

    #[test]
    fn test_paypal_and_crypto() {
        let mut details = PaymentDetails {
            method: PaymentMethod::Paypal,
            paypal_email: "buyer@pay.example.com".to_string(),
            ..PaymentDetails::default()
        };
        assert!(validate_payment(&details, today()).is_ok());

        details.paypal_email = "buyer@nowhere".to_string();
        assert!(matches!(
            validate_payment(&details, today()),
            Err(PaymentError::PaypalEmail(_))
        ));

        details.method = PaymentMethod::Crypto;
        assert!(matches!(
            validate_payment(&details, today()),
            Err(PaymentError::MethodUnavailable)
        ));
    }

    #[test]
    fn test_validate_order() {
        let payment = visa("12/27", "123");
        assert!(validate_order(&[line("10", 1)], &complete_address(), &payment, today()).is_ok());

        assert!(matches!(
            validate_order(&[], &complete_address(), &payment, today()),
            Err(CheckoutError::EmptyOrder)
        ));
        assert!(matches!(
            validate_order(&[line("10", 0)], &complete_address(), &payment, today()),
            Err(CheckoutError::InvalidQuantity)
        ));

        let err = validate_order(&[line("10", 1)], &Address::default(), &payment, today())
            .unwrap_err();
        assert!(err.to_string().contains("fullName"));
    }

    #[test]
    fn test_to_order_item_snapshots_price() {
        let item = line("12.34", 3).to_order_item();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.price.to_string(), "12.34");
    }
}
