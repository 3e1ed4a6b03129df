//! Tsirushka Admin - Controllers for the admin console.
//!
//! Every entity view (categories, customers, products, orders, contact
//! requests) is a [`list::ListController`] plus the row actions that entity
//! supports. Row actions that destroy or lock something ask through
//! [`tsirushka_client::Confirm`] first and refresh list and stats after a
//! success.
//!
//! # Access
//!
//! [`AdminConsole::open`] gates the views on the token's `roles` claim. That
//! check is for the UI only; the backend authorizes every admin request.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod categories;
pub mod console;
pub mod customers;
pub mod dashboard;
pub mod error;
pub mod list;
pub mod orders;
pub mod products;
pub mod requests;

pub use console::AdminConsole;
pub use error::AdminError;
pub use list::{AdminEntity, ListController, ListState};
