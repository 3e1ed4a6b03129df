//! Checkout page: quote, validate, place the order.

use chrono::NaiveDate;
use reqwest::Method;
use tracing::{info, instrument, warn};
use tsirushka_client::{AppState, require_session};
use tsirushka_core::checkout::{
    CheckoutForm, CheckoutSummary, DeliveryForm, OrderConfirmation, PlaceOrderRequest,
    PlaceOrderResponse, Quote, QuoteRequest,
};

use crate::error::CheckoutError;
use crate::pages::cart::CHECKOUT_PATH;

/// Checkout page state: the last quote, if one succeeded.
#[derive(Debug)]
pub struct CheckoutController {
    state: AppState,
    quote: Option<Quote>,
}

impl CheckoutController {
    /// Open the checkout page.
    ///
    /// # Errors
    ///
    /// `NotLoggedIn` with a login redirect back to checkout when no token is
    /// saved.
    pub fn open(state: AppState) -> Result<Self, CheckoutError> {
        require_session(state.tokens(), CHECKOUT_PATH).map_err(CheckoutError::NotLoggedIn)?;
        Ok(Self { state, quote: None })
    }

    /// Totals for the side panel, from the last quote when there is one.
    #[must_use]
    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary::new(&self.state.cart().snapshot(), self.quote.as_ref())
    }

    /// Ask the server to price the cart for `delivery`.
    ///
    /// A failed quote is not an error for the page: the summary falls back
    /// to the cart subtotal with shipping unknown.
    #[instrument(skip(self, delivery), fields(mode = ?delivery.mode))]
    pub async fn refresh_quote(&mut self, delivery: &DeliveryForm) -> CheckoutSummary {
        self.quote = None;
        let cart = self.state.cart().snapshot();
        let Some(request) = QuoteRequest::new(&cart, delivery) else {
            return self.summary();
        };

        match self
            .state
            .api()
            .send_json::<_, Quote>(Method::POST, "/checkout/quote", &request, true)
            .await
        {
            Ok(quote) => self.quote = Some(quote),
            Err(e) => warn!(error = %e, "Quote failed; showing subtotal only"),
        }
        self.summary()
    }

    /// Validate the form, place the order and clear the cart.
    ///
    /// `today` decides card expiry.
    ///
    /// # Errors
    ///
    /// `Form` for anything caught locally (no request is sent), `Api` when
    /// the server rejects the order.
    #[instrument(skip(self, form))]
    pub async fn place_order(
        &mut self,
        form: &CheckoutForm,
        today: NaiveDate,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let cart = self.state.cart().snapshot();
        let request = PlaceOrderRequest::assemble(
            &cart,
            form,
            today,
            &self.state.config().sinpe_number,
        )?;

        let reply: PlaceOrderResponse = self
            .state
            .api()
            .send_json(Method::POST, "/checkout/place-order", &request, true)
            .await?;
        info!(order_id = %reply.order_id, method = %request.pago.metodo, "Order placed");

        // The order exists now; a cart that fails to clear must not hide that.
        if let Err(e) = self.state.cart().clear() {
            warn!(error = %e, "Order placed but cart could not be cleared");
        }
        self.quote = None;

        Ok(OrderConfirmation::new(reply.order_id, &request.pago))
    }
}
