//! Cart page.

use tracing::info;
use tsirushka_client::{AppState, Confirm, Notice, Redirect, require_session};
use tsirushka_core::cart::parse_quantity_input;
use tsirushka_core::{Cart, CartLine, Centimos, ProductId};

use crate::error::PageError;

/// Path the login page returns to after a checkout redirect.
pub const CHECKOUT_PATH: &str = "checkout";

/// One row of the cart table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Centimos,
    pub quantity: u32,
    pub line_total: Centimos,
}

impl From<&CartLine> for CartRow {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
        }
    }
}

/// What the cart page shows.
///
/// There is no shipping on this page, so `total` equals `subtotal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub rows: Vec<CartRow>,
    pub subtotal: Centimos,
    pub total: Centimos,
}

impl CartView {
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        Self {
            rows: cart.lines().iter().map(CartRow::from).collect(),
            subtotal,
            total: subtotal,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cart page actions. Every action goes through the cart store, so other
/// subscribers (the navbar badge) update too.
#[derive(Debug, Clone)]
pub struct CartPage {
    state: AppState,
}

impl CartPage {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::from_cart(&self.state.cart().snapshot())
    }

    /// # Errors
    ///
    /// Returns the storage failure if the cart cannot be saved.
    pub fn increment(&self, id: &ProductId) -> Result<CartView, PageError> {
        self.state.cart().increment(id)?;
        Ok(self.view())
    }

    /// # Errors
    ///
    /// Returns the storage failure if the cart cannot be saved.
    pub fn decrement(&self, id: &ProductId) -> Result<CartView, PageError> {
        self.state.cart().decrement(id)?;
        Ok(self.view())
    }

    /// Apply a quantity typed into the row's box.
    ///
    /// # Errors
    ///
    /// Returns the storage failure if the cart cannot be saved.
    pub fn set_quantity_text(&self, id: &ProductId, input: &str) -> Result<CartView, PageError> {
        self.state
            .cart()
            .set_quantity(id, i64::from(parse_quantity_input(input)))?;
        Ok(self.view())
    }

    /// # Errors
    ///
    /// Returns the storage failure if the cart cannot be saved.
    pub fn remove(&self, id: &ProductId) -> Result<(Notice, CartView), PageError> {
        let removed = self.state.cart().remove(id)?;
        let notice = if removed {
            Notice::success("Producto eliminado")
        } else {
            Notice::info("El producto ya no estaba en el carrito")
        };
        Ok((notice, self.view()))
    }

    /// Empty the cart after confirmation.
    ///
    /// Returns `false` when the cart was already empty or the user declined.
    ///
    /// # Errors
    ///
    /// Returns the storage failure if the cart cannot be saved.
    pub fn clear(&self, confirm: &dyn Confirm) -> Result<bool, PageError> {
        if self.state.cart().is_empty() || !confirm.confirm("¿Vaciar carrito?") {
            return Ok(false);
        }
        self.state.cart().clear()?;
        info!("Cart cleared");
        Ok(true)
    }

    /// Check that checkout can start.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty cart, `Redirect::Login` back to checkout
    /// without a token.
    pub fn proceed_to_checkout(&self) -> Result<(), PageError> {
        if self.state.cart().is_empty() {
            return Err(PageError::Validation("Tu carrito está vacío".to_string()));
        }
        require_session(self.state.tokens(), CHECKOUT_PATH).map_err(|redirect| {
            info!("Checkout needs login");
            PageError::Redirect(redirect)
        })
    }
}

/// Whether `err` is the login redirect for checkout.
#[must_use]
pub fn is_login_redirect(err: &PageError) -> bool {
    matches!(err, PageError::Redirect(Redirect::Login { .. }))
}
