//! In-memory filtering for admin tables.
//!
//! The backend returns whole collections; search is a case-insensitive
//! substring match over a few text columns, then an optional status filter.
//! Products go through [`respawn_core::listing::ListingQuery`] instead.

use std::cmp::Reverse;

use respawn_core::account::User;
use respawn_core::catalog::Category;
use respawn_core::order::Order;
use respawn_core::{AccountStatus, OrderStatus};

/// Lowercased, trimmed search term; blank means no search.
#[must_use]
pub fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn any_contains<'a>(fields: impl IntoIterator<Item = &'a str>, needle: &str) -> bool {
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Users matching `search` (username, email, names) and `status`, newest
/// first.
#[must_use]
pub fn filter_users(users: &[User], search: Option<&str>, status: Option<AccountStatus>) -> Vec<User> {
    let needle = normalize_search(search);
    let mut matched: Vec<User> = users
        .iter()
        .filter(|user| status.is_none_or(|s| user.status == s))
        .filter(|user| {
            needle.as_deref().is_none_or(|needle| {
                any_contains(
                    [
                        user.username.as_str(),
                        user.email.as_str(),
                        user.first_name.as_deref().unwrap_or_default(),
                        user.last_name.as_deref().unwrap_or_default(),
                    ],
                    needle,
                )
            })
        })
        .cloned()
        .collect();

    matched.sort_by_key(|user| Reverse((user.created_at, user.id)));
    matched
}

/// Orders matching `search` (order id, recipient, item names) and `status`,
/// newest first.
#[must_use]
pub fn filter_orders(orders: &[Order], search: Option<&str>, status: Option<OrderStatus>) -> Vec<Order> {
    let needle = normalize_search(search);
    let mut matched: Vec<Order> = orders
        .iter()
        .filter(|order| status.is_none_or(|s| order.status == s))
        .filter(|order| {
            needle.as_deref().is_none_or(|needle| {
                order.id.to_string() == needle.trim_start_matches('#')
                    || any_contains(
                        std::iter::once(order.shipping_address.full_name.as_str())
                            .chain(order.items.iter().map(|item| item.name.as_str())),
                        needle,
                    )
            })
        })
        .cloned()
        .collect();

    matched.sort_by_key(|order| Reverse((order.created_at, order.id)));
    matched
}

/// Categories matching `search` (name, description), by name.
#[must_use]
pub fn filter_categories(categories: &[Category], search: Option<&str>) -> Vec<Category> {
    let needle = normalize_search(search);
    let mut matched: Vec<Category> = categories
        .iter()
        .filter(|category| {
            needle.as_deref().is_none_or(|needle| {
                any_contains([category.name.as_str(), category.description.as_str()], needle)
            })
        })
        .cloned()
        .collect();

    matched.sort_by_cached_key(|category| category.name.to_lowercase());
    matched
}
