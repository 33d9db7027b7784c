//! Custom Askama template filters.

use std::borrow::Borrow;
use std::fmt::Display;

/// Below this many units the product page warns that stock is low.
pub const LOW_STOCK: i32 = 5;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Availability line for a stock level.
///
/// Usage in templates: `{{ product.stock|stock_label }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn stock_label(
    stock: impl Borrow<i32>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(describe_stock(*stock.borrow()))
}

/// `"Out of stock"`, `"Only 3 left"` or `"12 in stock"`.
#[must_use]
pub fn describe_stock(stock: i32) -> String {
    match stock {
        ..=0 => "Out of stock".to_string(),
        1..LOW_STOCK => format!("Only {stock} left"),
        _ => format!("{stock} in stock"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_stock() {
        assert_eq!(describe_stock(0), "Out of stock");
        assert_eq!(describe_stock(-2), "Out of stock");
        assert_eq!(describe_stock(3), "Only 3 left");
        assert_eq!(describe_stock(12), "12 in stock");
    }
}
