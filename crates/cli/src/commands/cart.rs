//! Cart and favorites of the signed-in account.

use respawn_core::cart::Cart;
use respawn_core::{Price, ProductId};
use rust_decimal::Decimal;

use super::{CliError, Context};
use crate::output::table;

/// Text rendering of a cart: one row per line plus a total.
pub fn cart_lines(cart: &Cart) -> Vec<String> {
    if cart.items.is_empty() {
        return vec!["Your cart is empty".to_string()];
    }

    let rows: Vec<Vec<String>> = cart
        .items
        .iter()
        .map(|item| {
            vec![
                item.product.id.to_string(),
                item.product.name.clone(),
                item.quantity.to_string(),
                Price::usd(item.line_total()).display(),
            ]
        })
        .collect();
    let total: Decimal = cart.items.iter().map(|item| item.line_total()).sum();

    let mut lines = table(&["ID", "PRODUCT", "QTY", "SUBTOTAL"], &rows);
    lines.push(format!(
        "{} items, total {}",
        cart.total_quantity(),
        Price::usd(total).display()
    ));
    lines
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn show(ctx: &Context) -> Result<(), CliError> {
    let cart = ctx.client.cart(ctx.token()?).await?;
    ctx.out.emit(&cart, || cart_lines(&cart))
}

/// Add `quantity` units of a product.
///
/// # Errors
///
/// Rejects a zero quantity; otherwise returns the backend error.
pub async fn add(ctx: &Context, product: ProductId, quantity: u32) -> Result<(), CliError> {
    if quantity == 0 {
        return Err(CliError::Invalid("Quantity must be at least 1".to_string()));
    }
    ctx.client
        .add_to_cart(ctx.token()?, product, quantity)
        .await?;
    ctx.out
        .message(&format!("Added {quantity} x product {product} to the cart"))
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn remove(ctx: &Context, product: ProductId) -> Result<(), CliError> {
    ctx.client.remove_from_cart(ctx.token()?, product).await?;
    ctx.out
        .message(&format!("Removed product {product} from the cart"))
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn clear(ctx: &Context) -> Result<(), CliError> {
    ctx.client.clear_cart(ctx.token()?).await?;
    ctx.out.message("Cart cleared")
}

/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn favorites(ctx: &Context) -> Result<(), CliError> {
    let products = ctx.client.favorites(ctx.token()?).await?;
    ctx.out.emit(&products, || {
        if products.is_empty() {
            return vec!["No favorites yet".to_string()];
        }
        table(
            &["ID", "NAME", "PRICE", "STOCK"],
            &super::catalog::product_rows(&products),
        )
    })
}

/// Flip a product's favorite flag based on the account's current favorites.
///
/// # Errors
///
/// Returns `MissingToken` without a token, otherwise the backend error.
pub async fn toggle_favorite(ctx: &Context, product: ProductId) -> Result<(), CliError> {
    let token = ctx.token()?;
    let favorites = ctx.client.favorite_ids(token).await?;

    let favorite = if favorites.contains(product) {
        ctx.client.remove_favorite(token, product).await?;
        false
    } else {
        ctx.client.add_favorite(token, product).await?;
        true
    };

    tracing::debug!(product_id = %product, favorite, "Favorite toggled");
    ctx.out.emit(
        &serde_json::json!({ "productId": product, "favorite": favorite }),
        || {
            vec![if favorite {
                format!("Product {product} added to favorites")
            } else {
                format!("Product {product} removed from favorites")
            }]
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_lines_total() {
        let cart: Cart = serde_json::from_value(json!({
            "items": [
                {"product": {"id": 1, "name": "Controller", "price": "10.00"}, "quantity": 2},
                {"product": {"id": 2, "name": "Cable", "price": "5.50"}, "quantity": 1}
            ]
        }))
        .unwrap();

        let lines = cart_lines(&cart);
        assert_eq!(lines.last().unwrap(), "3 items, total $25.50");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(cart_lines(&Cart::default()), vec!["Your cart is empty"]);
    }
}
