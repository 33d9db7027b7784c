//! Respawn Core - Shared domain types and pure logic.
//!
//! This crate is used by every Respawn component:
//! - `api` - HTTP client for the REST backend
//! - `storefront` - Public-facing store (games, PCs, laptops, accessories)
//! - `admin` - Back-office for catalog, orders and user moderation
//! - `cli` - Operator command-line tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Every entity mirrors a record owned by the REST backend; this
//! crate never treats its copies as canonical.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`catalog`] - Products, categories and free-form specifications
//! - [`cart`] - Cart items and favorite sets
//! - [`order`] - Orders, line items and the order payload sent at checkout
//! - [`account`] - User profiles and addresses
//! - [`listing`] - Shared in-memory filter/sort/paginate pipeline
//! - [`checkout`] - Totals, address completeness and payment validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod listing;
pub mod order;
pub mod types;

pub use types::*;
