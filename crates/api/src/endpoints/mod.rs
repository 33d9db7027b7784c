//! Typed endpoint methods on [`crate::BackendClient`], grouped by area.

mod admin;
mod auth;
mod cart;
mod catalog;
mod favorites;
mod orders;
mod users;
