//! In-memory product listing: filter, sort and paginate.
//!
//! The backend has no server-side pagination or filtering; every page fetches
//! the full collection and narrows it here. One [`ListingQuery`] drives all
//! product grids (category pages, search, favorites).

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::CategoryId;

/// Products per page on storefront grids.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Sort order for product grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOrder {
    /// Backend order, unchanged.
    #[default]
    #[serde(rename = "featured")]
    Featured,
    #[serde(rename = "price-asc")]
    PriceLowHigh,
    #[serde(rename = "price-desc")]
    PriceHighLow,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "newest")]
    Newest,
}

impl SortOrder {
    /// Every sort order, in the order the sort dropdown shows them.
    pub const ALL: [Self; 5] = [
        Self::Featured,
        Self::PriceLowHigh,
        Self::PriceHighLow,
        Self::Name,
        Self::Newest,
    ];

    /// Query string value.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLowHigh => "price-asc",
            Self::PriceHighLow => "price-desc",
            Self::Name => "name",
            Self::Newest => "newest",
        }
    }

    /// Dropdown label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::PriceLowHigh => "Price: low to high",
            Self::PriceHighLow => "Price: high to low",
            Self::Name => "Name",
            Self::Newest => "Newest",
        }
    }

    /// Parse a query string value, falling back to `Featured`.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        param
            .and_then(|p| Self::ALL.into_iter().find(|sort| sort.as_param() == p))
            .unwrap_or_default()
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Featured => Ordering::Equal,
            Self::PriceLowHigh => a.price.cmp(&b.price),
            Self::PriceHighLow => b.price.cmp(&a.price),
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            // Products without a timestamp sort last.
            Self::Newest => b.created_at.cmp(&a.created_at),
        }
    }
}

/// Filters and sort applied to a fetched product collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
    /// Restrict to these categories (a category plus its subcategories).
    pub categories: Option<Vec<CategoryId>>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock_only: bool,
    pub sort: SortOrder,
}

impl ListingQuery {
    /// Whether a product passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(needle) = self.search.as_deref().map(str::trim)
            && !needle.is_empty()
        {
            let needle = needle.to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(categories) = &self.categories
            && !product
                .category_id
                .is_some_and(|id| categories.contains(&id))
        {
            return false;
        }

        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }

        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        !self.in_stock_only || product.in_stock()
    }

    /// Filter then sort. The sort is stable so `Featured` keeps backend order.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut filtered: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        let sort = self.sort;
        filtered.sort_by(|a, b| sort.compare(a, b));
        filtered
    }
}

/// One page of an in-memory collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, clamped to the available range.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a preceding page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice `items` into the requested 1-based page.
///
/// A page size of zero is treated as one; out-of-range pages clamp to the
/// last page.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, price: &str, stock: i32, category: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "description": format!("{name} description"),
            "price": price,
            "stock": stock,
            "categoryId": category,
        }))
        .unwrap()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Zelda", "59.99", 3, 1),
            product(2, "Gaming Laptop", "1499.00", 0, 2),
            product(3, "Mouse", "19.50", 10, 3),
            product(4, "Keyboard", "89.00", 5, 3),
            product(5, "Elden Ring", "39.99", 1, 1),
        ]
    }

    #[test]
    fn test_price_low_high_is_non_decreasing() {
        let query = ListingQuery {
            sort: SortOrder::PriceLowHigh,
            ..ListingQuery::default()
        };
        let sorted = query.apply(catalog());
        assert_eq!(sorted.len(), 5);
        assert!(sorted.windows(2).all(|w| w[0].price <= w[1].price));
    }

    #[test]
    fn test_price_high_low_is_non_increasing() {
        let query = ListingQuery {
            sort: SortOrder::PriceHighLow,
            ..ListingQuery::default()
        };
        let sorted = query.apply(catalog());
        assert!(sorted.windows(2).all(|w| w[0].price >= w[1].price));
    }

    #[test]
    fn test_featured_keeps_backend_order() {
        let ids: Vec<i64> = ListingQuery::default()
            .apply(catalog())
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let query = ListingQuery {
            search: Some("  RING ".to_string()),
            ..ListingQuery::default()
        };
        let found = query.apply(catalog());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Elden Ring");
    }

    #[test]
    fn test_category_price_and_stock_filters() {
        let query = ListingQuery {
            categories: Some(vec![CategoryId::new(2), CategoryId::new(3)]),
            max_price: Some("100".parse().unwrap()),
            in_stock_only: true,
            sort: SortOrder::Name,
            ..ListingQuery::default()
        };
        let names: Vec<String> = query.apply(catalog()).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Keyboard".to_string(), "Mouse".to_string()]);
    }

    #[test]
    fn test_sort_from_param() {
        assert_eq!(SortOrder::from_param(Some("price-desc")), SortOrder::PriceHighLow);
        assert_eq!(SortOrder::from_param(Some("bogus")), SortOrder::Featured);
        assert_eq!(SortOrder::from_param(None), SortOrder::Featured);
    }

    #[test]
    fn test_paginate_clamps_pages() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(items.clone(), 1, 12);
        assert_eq!(first.items.len(), 12);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(items.clone(), 99, 12);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![25]);

        let empty = paginate(Vec::<u32>::new(), 0, 0);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }
}
