//! "My orders", order detail and the post-checkout confirmation.

use tracing::instrument;
use tsirushka_client::{AppState, require_session};
use tsirushka_core::checkout::OrderConfirmation;
use tsirushka_core::orders::{CustomerOrder, OrderGroup};
use tsirushka_core::{OrderId, PaymentMethod};

use crate::error::PageError;

/// Login return path for the orders page.
pub const MY_ORDERS_PATH: &str = "mis-pedidos";

/// The customer's orders, newest as the server sends them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyOrders {
    pub orders: Vec<CustomerOrder>,
}

impl MyOrders {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders in one tab.
    pub fn in_group(&self, group: OrderGroup) -> impl Iterator<Item = &CustomerOrder> {
        self.orders
            .iter()
            .filter(move |o| OrderGroup::of(o.estado) == group)
    }
}

/// Load the logged-in customer's orders.
///
/// # Errors
///
/// `Redirect` to login without a token, otherwise the API failure.
#[instrument(skip(state))]
pub async fn my_orders(state: &AppState) -> Result<MyOrders, PageError> {
    require_session(state.tokens(), MY_ORDERS_PATH)?;
    let orders = state.api().get_json("/orders/mis-pedidos", true).await?;
    Ok(MyOrders { orders })
}

/// Load one of the customer's orders.
///
/// # Errors
///
/// `Redirect` to login without a token, otherwise the API failure.
#[instrument(skip(state))]
pub async fn order_detail(state: &AppState, id: &OrderId) -> Result<CustomerOrder, PageError> {
    require_session(state.tokens(), MY_ORDERS_PATH)?;
    let path = format!("/orders/{}", urlencoding::encode(id.as_str()));
    Ok(state.api().get_json(&path, true).await?)
}

/// The confirmation screen after placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationView {
    pub order: CustomerOrder,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    /// Payment instructions, one step per line.
    pub instructions: Vec<String>,
}

/// Fetch the new order and build the confirmation screen.
///
/// # Errors
///
/// `Redirect` to login without a token, otherwise the API failure.
pub async fn confirmation(
    state: &AppState,
    placed: &OrderConfirmation,
) -> Result<ConfirmationView, PageError> {
    let order = order_detail(state, &placed.order_id).await?;
    let instructions = match placed.method {
        PaymentMethod::Sinpe => {
            let destination = placed
                .sinpe_number
                .as_deref()
                .unwrap_or(&state.config().sinpe_number);
            let mut steps = vec![
                format!(
                    "Enviá el monto total de {} a {destination}",
                    order.total_centimos.display_crc()
                ),
                format!("Usá como referencia: {}", order.display_number()),
            ];
            if let Some(reference) = &placed.reference {
                steps.push(format!("Tu referencia ingresada: {reference}"));
            }
            steps
        }
        PaymentMethod::Tarjeta => vec![format!(
            "Pago con tarjeta registrado{}",
            placed
                .reference
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default()
        )],
    };

    Ok(ConfirmationView {
        order,
        method: placed.method,
        reference: placed.reference.clone(),
        instructions,
    })
}
