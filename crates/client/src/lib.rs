//! Tsirushka Client - Shared services for the storefront and admin console.
//!
//! Everything that touches the network or persistent state lives here:
//!
//! - [`config`] - Environment configuration
//! - [`storage`] - Key/value persistence (JSON files or in-memory)
//! - [`token`] - Bearer token store
//! - [`api`] - JSON REST client with uniform error surfacing
//! - [`cart_store`] - Persistent, observable cart
//! - [`session`] - Login and admin-role gating for protected views
//! - [`notice`] - User-facing notifications
//! - [`confirm`] - Confirmation before destructive actions
//! - [`state`] - The services bundled for controllers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart_store;
pub mod config;
pub mod confirm;
pub mod notice;
pub mod session;
pub mod state;
pub mod storage;
pub mod token;

pub use api::{ApiClient, ApiError, ApiResponse, RequestOptions};
pub use cart_store::{CartStore, CartSubscription};
pub use config::{ClientConfig, ConfigError};
pub use confirm::{AutoConfirm, Confirm};
pub use notice::{Notice, NoticeLevel};
pub use session::{Redirect, require_admin, require_session};
pub use state::AppState;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use token::TokenStore;
