//! Respawn REST backend client.
//!
//! # Architecture
//!
//! - One [`BackendClient`] per process, cheaply cloneable (`Arc` inside)
//! - The backend is the source of truth - NO local sync, direct API calls
//! - Every request goes through a single send path that attaches
//!   `Authorization: Bearer <token>` when an [`AccessToken`] is supplied
//! - No retries, no refresh-on-401, no queuing; failures surface as
//!   [`ApiError`] and the caller decides what to show
//! - Catalog reads (categories, products) are optionally cached in memory via
//!   `moka`
//!
//! # Example
//!
//! ```rust,ignore
//! use respawn_api::{AccessToken, ApiConfig, BackendClient};
//!
//! let client = BackendClient::new(&ApiConfig::new(base_url))?;
//!
//! let products = client.products().await?;
//! let token = AccessToken::new(auth.token);
//! client.add_to_cart(&token, products[0].id, 1).await?;
//! let cart = client.cart(&token).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod cache;
mod client;
mod config;
pub mod dto;
mod endpoints;
mod error;
mod token;

pub use client::BackendClient;
pub use config::ApiConfig;
pub use dto::*;
pub use error::ApiError;
pub use token::AccessToken;
