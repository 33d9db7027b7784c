//! Storefront services.
//!
//! Route handlers stay thin; these hold the logic between a request and the
//! backend client.

pub mod cart;
pub mod cart_count;
pub mod catalog;
pub mod checkout;
pub mod favorites;
pub mod inflight;

pub use cart::CartService;
pub use cart_count::{CartCount, CartCountRegistry, FailurePolicy};
pub use catalog::CatalogService;
pub use checkout::{CheckoutService, CheckoutSource, CheckoutSummary};
pub use favorites::{FavoriteToggle, FavoritesService};
pub use inflight::{AlreadyPending, InFlight};
