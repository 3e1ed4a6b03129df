//! Tsirushka Storefront - Page controllers for the public shop.
//!
//! Each controller owns the state of one page and talks to the backend
//! through the shared [`AppState`](tsirushka_client::AppState). Controllers
//! return view models; rendering is left to the caller.
//!
//! # Modules
//!
//! - [`pages`] - Catalog, product, cart, checkout, orders, auth and contact
//! - [`navbar`] - Links and the live cart badge
//! - [`error`] - Per-action error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod navbar;
pub mod pages;

pub use error::{AuthFlowError, CheckoutError, PageError};
pub use navbar::{CartBadge, NavLink, Navbar};
