//! Business logic services for admin.
//!
//! # Services
//!
//! - `filter` - Search and status filters for the admin tables
//! - `orders` - Order listing and guarded status transitions
//! - `users` - Cached user list and moderation

pub mod filter;
pub mod orders;
pub mod users;

pub use orders::OrderDesk;
pub use users::UserDirectory;
