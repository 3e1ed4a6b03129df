//! Tsirushka Core - Shared domain types.
//!
//! This crate provides the types used across all Tsirushka components:
//! - `client` - API client, token store and cart store
//! - `storefront` - Catalog, cart, checkout and account controllers
//! - `admin` - Admin console list controllers
//! - `cli` - The `tsir` command-line frontend
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage,
//! no HTTP clients. Anything that touches the network or disk lives in
//! `tsirushka-client`.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, statuses, token claims, paging
//! - [`cart`] - The cart model and its quantity invariants
//! - [`checkout`] - Card validation and order payload assembly
//! - [`catalog`] - Catalog products and client-side filtering
//! - [`orders`] - Customer-facing order summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod types;

pub use cart::{Cart, CartLine, MAX_QUANTITY, MIN_QUANTITY};
pub use types::*;
