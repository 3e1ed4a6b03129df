//! Core types for Tsirushka.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod claims;
pub mod email;
pub mod id;
pub mod money;
pub mod page;
pub mod status;

pub use claims::Claims;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Centimos;
pub use page::{ListQuery, Page};
pub use status::*;
