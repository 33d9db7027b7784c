//! Catalog browsing.

use respawn_core::catalog::{Category, Product, category_with_descendants};
use respawn_core::listing::{DEFAULT_PAGE_SIZE, ListingQuery, SortOrder, paginate};
use respawn_core::{CategoryId, Price, ProductId};

use super::{CliError, Context};
use crate::output::table;

/// Options of `catalog products`.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub sort: SortOrder,
    pub in_stock: bool,
    pub page: usize,
}

/// Table rows for a product list.
pub fn product_rows(products: &[Product]) -> Vec<Vec<String>> {
    products
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                Price::usd(p.price).display(),
                p.stock.to_string(),
            ]
        })
        .collect()
}

/// List products through the same filter/sort/paginate pipeline as the store.
///
/// # Errors
///
/// Returns the backend error.
pub async fn products(ctx: &Context, filter: &ProductFilter) -> Result<(), CliError> {
    let categories = match filter.category {
        Some(root) => Some(category_with_descendants(
            root,
            &ctx.client.categories().await?,
        )),
        None => None,
    };

    let query = ListingQuery {
        search: filter.search.clone(),
        categories,
        in_stock_only: filter.in_stock,
        sort: filter.sort,
        ..ListingQuery::default()
    };

    let page = paginate(
        query.apply(ctx.client.products().await?),
        filter.page,
        DEFAULT_PAGE_SIZE,
    );

    ctx.out.emit(&page.items, || {
        let mut lines = table(&["ID", "NAME", "PRICE", "STOCK"], &product_rows(&page.items));
        lines.push(format!(
            "page {} of {} ({} products, sorted by {})",
            page.page,
            page.total_pages.max(1),
            page.total_items,
            filter.sort.label().to_lowercase()
        ));
        lines
    })
}

/// List categories, children indented under their parent.
///
/// # Errors
///
/// Returns the backend error.
pub async fn categories(ctx: &Context) -> Result<(), CliError> {
    let categories = ctx.client.categories().await?;
    ctx.out.emit(&categories, || category_tree(&categories))
}

/// Render categories as an indented tree. Orphans (unknown parent) are shown
/// at the top level.
pub fn category_tree(categories: &[Category]) -> Vec<String> {
    fn walk(parent: Option<CategoryId>, depth: usize, all: &[Category], lines: &mut Vec<String>) {
        let mut children: Vec<&Category> =
            all.iter().filter(|c| c.parent_id == parent).collect();
        children.sort_by_key(|c| c.name.to_lowercase());
        for child in children {
            lines.push(format!("{}{}  {}", "  ".repeat(depth), child.id, child.name));
            if depth < all.len() {
                walk(Some(child.id), depth + 1, all, lines);
            }
        }
    }

    let mut lines = Vec::new();
    walk(None, 0, categories, &mut lines);

    let mut orphans: Vec<&Category> = categories
        .iter()
        .filter(|c| {
            c.parent_id
                .is_some_and(|parent| !categories.iter().any(|p| p.id == parent))
        })
        .collect();
    orphans.sort_by_key(|c| c.name.to_lowercase());
    for orphan in orphans {
        lines.push(format!("{}  {}", orphan.id, orphan.name));
        walk(Some(orphan.id), 1, categories, &mut lines);
    }
    lines
}

/// Show one product with its specifications.
///
/// # Errors
///
/// Returns the backend error (`NotFound` for an unknown id).
pub async fn show(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let product = ctx.client.product(id).await?;
    ctx.out.emit(&product, || {
        let mut lines = vec![
            format!("{} (#{})", product.name, product.id),
            format!(
                "{}  {}",
                Price::usd(product.price).display(),
                if product.in_stock() {
                    format!("{} in stock", product.stock)
                } else {
                    "out of stock".to_string()
                }
            ),
        ];
        if !product.description.is_empty() {
            lines.push(String::new());
            lines.push(product.description.clone());
        }
        if !product.specifications.is_empty() {
            lines.push(String::new());
            lines.extend(product.specifications.keys().map(|key| {
                format!("{key}: {}", product.spec_text(key).unwrap_or_default())
            }));
        }
        lines
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_category_tree() {
        let categories: Vec<Category> = serde_json::from_value(json!([
            {"id": 1, "name": "Games"},
            {"id": 2, "name": "PC", "parentId": 1},
            {"id": 3, "name": "Consoles", "parentId": 1},
            {"id": 4, "name": "Accessories"},
            {"id": 5, "name": "Lost", "parentId": 99}
        ]))
        .unwrap();

        assert_eq!(
            category_tree(&categories),
            vec!["4  Accessories", "1  Games", "  3  Consoles", "  2  PC", "5  Lost"]
        );
    }

    #[test]
    fn test_product_rows() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"id": 7, "name": "Headset", "price": "49.5", "stock": 3}
        ]))
        .unwrap();

        assert_eq!(
            product_rows(&products),
            vec![vec!["7", "Headset", "$49.50", "3"]]
        );
    }
}
