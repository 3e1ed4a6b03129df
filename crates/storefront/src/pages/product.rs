//! Product detail page.

use tracing::instrument;
use tsirushka_client::AppState;
use tsirushka_core::ProductId;
use tsirushka_core::catalog::CatalogProduct;

use crate::error::PageError;

/// Load one product.
///
/// # Errors
///
/// Returns the API failure, including the server's "not found" message.
#[instrument(skip(state))]
pub async fn load_product(state: &AppState, id: &ProductId) -> Result<CatalogProduct, PageError> {
    let path = format!("/catalogo/productos/{}", urlencoding::encode(id.as_str()));
    Ok(state.api().get_json(&path, false).await?)
}

/// Add one unit of a loaded product to the cart.
///
/// # Errors
///
/// `Validation` when out of stock; `Storage` if the cart cannot be saved.
pub fn add_to_cart(state: &AppState, product: &CatalogProduct) -> Result<u32, PageError> {
    if !product.in_stock() {
        return Err(PageError::Validation("Producto agotado".to_string()));
    }
    let cart = state.cart();
    cart.add(product.id.clone(), product.nombre.clone(), product.precio_centimos)?;
    Ok(cart
        .snapshot()
        .get(&product.id)
        .map_or(0, |line| line.quantity))
}
