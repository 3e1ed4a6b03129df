//! One controller per storefront page.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod orders;
pub mod product;

pub use auth::AuthController;
pub use cart::{CartPage, CartView};
pub use catalog::CatalogController;
pub use checkout::CheckoutController;
