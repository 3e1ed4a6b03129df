//! Checkout payload assembly.
//!
//! Turns the cart plus the checkout form into the backend's quote and
//! place-order request bodies. Everything here is pure and validated locally;
//! the controller in `tsirushka-storefront` does the network calls.
//!
//! Prices never leave the client: items carry only `{id, cantidad}` and the
//! server re-prices the order.

pub mod card;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use card::{CardBrand, CardError, CardInput, ValidatedCard, format_card_number, format_expiry};

use crate::cart::{Cart, CartLine};
use crate::types::{Centimos, DeliveryMode, Email, OrderId, PaymentMethod, ProductId};

/// Default SINPE Móvil number customers transfer to.
pub const DEFAULT_SINPE_NUMBER: &str = "+506 8630-4400";

/// Local validation failures, reported before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutFormError {
    #[error("Tu carrito está vacío")]
    EmptyCart,
    #[error("El nombre es requerido")]
    MissingName,
    #[error("Email inválido: {0}")]
    InvalidEmail(String),
    #[error("Por favor completá todos los campos de dirección ({0})")]
    MissingAddressField(&'static str),
    #[error("{}", join_card_errors(.0))]
    InvalidCard(Vec<CardError>),
}

fn join_card_errors(errors: &[CardError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `{id, cantidad}` as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: ProductId,
    pub cantidad: u32,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product_id.clone(),
            cantidad: line.quantity,
        }
    }
}

fn order_items(cart: &Cart) -> Vec<OrderItem> {
    cart.lines().iter().map(OrderItem::from).collect()
}

/// Address form as typed by the customer.
#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    pub province: String,
    pub canton: String,
    pub district: String,
    pub exact: String,
    pub notes: String,
}

/// Delivery section of the checkout form.
#[derive(Debug, Clone, Default)]
pub struct DeliveryForm {
    pub mode: DeliveryMode,
    pub address: AddressForm,
}

/// Region used to price shipping on a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteAddress {
    pub provincia: String,
    pub canton: String,
    pub distrito: String,
}

/// Full shipping address on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub provincia: String,
    pub canton: String,
    pub distrito: String,
    pub direccion_exacta: String,
    pub notas: Option<String>,
}

/// `entrega` object. `direccion` is always serialized, as `null` for pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery<A> {
    pub modo: DeliveryMode,
    pub direccion: Option<A>,
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_owned())
}

impl DeliveryForm {
    /// Delivery for a quote request.
    ///
    /// Carries the region only when shipping and a province has been chosen.
    #[must_use]
    pub fn for_quote(&self) -> Delivery<QuoteAddress> {
        let direccion = match self.mode {
            DeliveryMode::Envio => non_empty(&self.address.province).map(|provincia| QuoteAddress {
                provincia,
                canton: self.address.canton.trim().to_owned(),
                distrito: self.address.district.trim().to_owned(),
            }),
            DeliveryMode::Retiro => None,
        };
        Delivery {
            modo: self.mode,
            direccion,
        }
    }

    /// Delivery for placing an order.
    ///
    /// Pickup ignores whatever is in the address form.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutFormError::MissingAddressField`] naming the first
    /// blank required field when shipping.
    pub fn for_order(&self) -> Result<Delivery<ShippingAddress>, CheckoutFormError> {
        if self.mode == DeliveryMode::Retiro {
            return Ok(Delivery {
                modo: self.mode,
                direccion: None,
            });
        }

        let a = &self.address;
        let required = |value: &str, field: &'static str| {
            non_empty(value).ok_or(CheckoutFormError::MissingAddressField(field))
        };
        Ok(Delivery {
            modo: self.mode,
            direccion: Some(ShippingAddress {
                provincia: required(&a.province, "provincia")?,
                canton: required(&a.canton, "cantón")?,
                distrito: required(&a.district, "distrito")?,
                direccion_exacta: required(&a.exact, "dirección exacta")?,
                notas: non_empty(&a.notes),
            }),
        })
    }
}

/// Bank transfer (SINPE Móvil) form.
#[derive(Debug, Clone, Default)]
pub struct TransferInput {
    pub reference: String,
    pub payer_phone: String,
    pub notes: String,
}

/// Payment section of the checkout form.
#[derive(Debug, Clone)]
pub enum PaymentInput {
    Card(CardInput),
    Transfer(TransferInput),
}

/// Method-specific payment details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PaymentExtra {
    #[serde(rename_all = "camelCase")]
    Card {
        tipo: CardBrand,
        ultimos_digitos: String,
        nombre_titular: String,
        expiracion: String,
        notas: String,
    },
    #[serde(rename_all = "camelCase")]
    Transfer {
        telefono_pagador: String,
        notas: String,
        destino: String,
    },
}

/// `pago` object of a place-order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentDescriptor {
    pub metodo: PaymentMethod,
    pub referencia: String,
    pub extra: PaymentExtra,
}

impl PaymentInput {
    /// Validate and convert into the wire descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutFormError::InvalidCard`] with every card problem.
    pub fn to_descriptor(
        &self,
        today: NaiveDate,
        sinpe_number: &str,
    ) -> Result<PaymentDescriptor, CheckoutFormError> {
        match self {
            Self::Card(card) => {
                let card = card.validate(today).map_err(CheckoutFormError::InvalidCard)?;
                Ok(PaymentDescriptor {
                    metodo: PaymentMethod::Tarjeta,
                    referencia: format!(
                        "{}-****{}",
                        card.brand.as_str().to_ascii_uppercase(),
                        card.last4
                    ),
                    extra: PaymentExtra::Card {
                        tipo: card.brand,
                        ultimos_digitos: card.last4,
                        nombre_titular: card.holder,
                        expiracion: card.expiry,
                        notas: card.notes,
                    },
                })
            }
            Self::Transfer(t) => Ok(PaymentDescriptor {
                metodo: PaymentMethod::Sinpe,
                referencia: t.reference.trim().to_owned(),
                extra: PaymentExtra::Transfer {
                    telefono_pagador: t.payer_phone.trim().to_owned(),
                    notas: t.notes.trim().to_owned(),
                    destino: sinpe_number.to_owned(),
                },
            }),
        }
    }
}

/// Customer contact details on the checkout form.
#[derive(Debug, Clone, Default)]
pub struct CustomerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// `cliente` object of a place-order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerInfo {
    pub nombre: String,
    pub email: Email,
    pub telefono: Option<String>,
}

impl CustomerForm {
    fn validate(&self) -> Result<CustomerInfo, CheckoutFormError> {
        let nombre = non_empty(&self.name).ok_or(CheckoutFormError::MissingName)?;
        let email = Email::parse(&self.email)
            .map_err(|e| CheckoutFormError::InvalidEmail(e.to_string()))?;
        Ok(CustomerInfo {
            nombre,
            email,
            telefono: non_empty(&self.phone),
        })
    }
}

/// The whole checkout form.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub customer: CustomerForm,
    pub delivery: DeliveryForm,
    pub payment: PaymentInput,
}

/// `POST /checkout/quote` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRequest {
    pub items: Vec<OrderItem>,
    pub entrega: Delivery<QuoteAddress>,
}

impl QuoteRequest {
    /// Build a quote request, or `None` for an empty cart.
    #[must_use]
    pub fn new(cart: &Cart, delivery: &DeliveryForm) -> Option<Self> {
        (!cart.is_empty()).then(|| Self {
            items: order_items(cart),
            entrega: delivery.for_quote(),
        })
    }
}

/// `POST /checkout/quote` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub subtotal_centimos: Centimos,
    pub envio_centimos: Centimos,
    pub total_centimos: Centimos,
}

/// `POST /checkout/place-order` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceOrderRequest {
    pub cliente: CustomerInfo,
    pub entrega: Delivery<ShippingAddress>,
    pub items: Vec<OrderItem>,
    pub pago: PaymentDescriptor,
}

impl PlaceOrderRequest {
    /// Validate the form against the cart and assemble the request.
    ///
    /// Checks run in the order the customer sees them: cart, address,
    /// payment, contact details.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutFormError`] encountered.
    pub fn assemble(
        cart: &Cart,
        form: &CheckoutForm,
        today: NaiveDate,
        sinpe_number: &str,
    ) -> Result<Self, CheckoutFormError> {
        if cart.is_empty() {
            return Err(CheckoutFormError::EmptyCart);
        }
        let entrega = form.delivery.for_order()?;
        let pago = form.payment.to_descriptor(today, sinpe_number)?;
        let cliente = form.customer.validate()?;

        Ok(Self {
            cliente,
            entrega,
            items: order_items(cart),
            pago,
        })
    }
}

/// `POST /checkout/place-order` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order_id: OrderId,
}

/// Totals shown beside the checkout form.
///
/// When the quote failed, `shipping` is `None` ("—") and the total is the
/// subtotal alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub lines: Vec<CartLine>,
    pub subtotal: Centimos,
    pub shipping: Option<Centimos>,
    pub total: Centimos,
}

impl CheckoutSummary {
    /// Summarize the cart, preferring server figures when a quote exists.
    #[must_use]
    pub fn new(cart: &Cart, quote: Option<&Quote>) -> Self {
        let lines = cart.lines().to_vec();
        match quote {
            Some(q) => Self {
                lines,
                subtotal: q.subtotal_centimos,
                shipping: Some(q.envio_centimos),
                total: q.total_centimos,
            },
            None => {
                let subtotal = cart.subtotal();
                Self {
                    lines,
                    subtotal,
                    shipping: None,
                    total: subtotal,
                }
            }
        }
    }

    /// Whether the figures came from a server quote.
    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        self.shipping.is_some()
    }
}

/// What the confirmation view shows after a successful order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    /// Store SINPE number, present only for transfer payments.
    pub sinpe_number: Option<String>,
}

impl OrderConfirmation {
    /// Build the confirmation from the placed request and the new order ID.
    #[must_use]
    pub fn new(order_id: OrderId, payment: &PaymentDescriptor) -> Self {
        let sinpe_number = match &payment.extra {
            PaymentExtra::Transfer { destino, .. } => Some(destino.clone()),
            PaymentExtra::Card { .. } => None,
        };
        Self {
            order_id,
            method: payment.metodo,
            reference: non_empty(&payment.referencia),
            sinpe_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(ProductId::new("p1"), "Barra 70%".into(), Centimos::new(350_000));
        cart.add(ProductId::new("p1"), "Barra 70%".into(), Centimos::new(350_000));
        cart
    }

    fn filled_address() -> AddressForm {
        AddressForm {
            province: "San José".into(),
            canton: "Escazú".into(),
            district: "San Rafael".into(),
            exact: "200 m norte de la iglesia".into(),
            notes: String::new(),
        }
    }

    fn form(mode: DeliveryMode, payment: PaymentInput) -> CheckoutForm {
        CheckoutForm {
            customer: CustomerForm {
                name: "Ana Mora".into(),
                email: "ana@correo.cr".into(),
                phone: String::new(),
            },
            delivery: DeliveryForm {
                mode,
                address: filled_address(),
            },
            payment,
        }
    }

    fn sinpe() -> PaymentInput {
        PaymentInput::Transfer(TransferInput {
            reference: "REF123".into(),
            payer_phone: "8888-0000".into(),
            notes: String::new(),
        })
    }

    #[test]
    fn test_pickup_serializes_null_address_even_with_form_filled() {
        let request = PlaceOrderRequest::assemble(
            &cart(),
            &form(DeliveryMode::Retiro, sinpe()),
            today(),
            DEFAULT_SINPE_NUMBER,
        )
        .expect("valid");
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["entrega"], json!({"modo": "RETIRO", "direccion": null}));
    }

    #[test]
    fn test_items_carry_only_id_and_quantity() {
        let request = PlaceOrderRequest::assemble(
            &cart(),
            &form(DeliveryMode::Envio, sinpe()),
            today(),
            DEFAULT_SINPE_NUMBER,
        )
        .expect("valid");
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["items"], json!([{"id": "p1", "cantidad": 2}]));
        assert_eq!(json["entrega"]["direccion"]["direccionExacta"], "200 m norte de la iglesia");
        assert_eq!(json["entrega"]["direccion"]["notas"], Value::Null);
        assert_eq!(json["cliente"]["telefono"], Value::Null);
    }

    #[test]
    fn test_shipping_requires_every_address_field() {
        let mut f = form(DeliveryMode::Envio, sinpe());
        f.delivery.address.district = "  ".into();
        let err = PlaceOrderRequest::assemble(&cart(), &f, today(), DEFAULT_SINPE_NUMBER)
            .expect_err("missing district");
        assert_eq!(err, CheckoutFormError::MissingAddressField("distrito"));
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let err = PlaceOrderRequest::assemble(
            &Cart::new(),
            &form(DeliveryMode::Retiro, sinpe()),
            today(),
            DEFAULT_SINPE_NUMBER,
        )
        .expect_err("empty");
        assert_eq!(err, CheckoutFormError::EmptyCart);
    }

    #[test]
    fn test_card_descriptor_hides_number_and_cvv() {
        let payment = PaymentInput::Card(CardInput {
            number: "5500 0000 0000 0004".into(),
            holder: "Ana Mora".into(),
            expiry: "04/27".into(),
            cvv: "321".into(),
            notes: String::new(),
        });
        let descriptor = payment.to_descriptor(today(), DEFAULT_SINPE_NUMBER).expect("valid");
        assert_eq!(descriptor.referencia, "MASTERCARD-****0004");

        let json = serde_json::to_string(&descriptor).expect("serialize");
        assert!(!json.contains("5500000000000004"));
        assert!(!json.contains("321"));
        assert!(json.contains(r#""ultimosDigitos":"0004""#));
    }

    #[test]
    fn test_invalid_card_reports_all_errors() {
        let payment = PaymentInput::Card(CardInput {
            number: "123".into(),
            holder: "Ana".into(),
            expiry: "13/25".into(),
            cvv: "1".into(),
            notes: String::new(),
        });
        let err = payment
            .to_descriptor(today(), DEFAULT_SINPE_NUMBER)
            .expect_err("invalid");
        assert_eq!(
            err.to_string(),
            "Número de tarjeta inválido, Mes de expiración inválido, CVV inválido"
        );
    }

    #[test]
    fn test_transfer_descriptor_carries_destination() {
        let descriptor = sinpe().to_descriptor(today(), "+506 1111-2222").expect("valid");
        let json = serde_json::to_value(&descriptor).expect("serialize");
        assert_eq!(json["metodo"], "SINPE");
        assert_eq!(json["extra"]["destino"], "+506 1111-2222");
        assert_eq!(json["extra"]["telefonoPagador"], "8888-0000");
    }

    #[test]
    fn test_quote_address_only_with_province() {
        let mut delivery = DeliveryForm {
            mode: DeliveryMode::Envio,
            address: AddressForm::default(),
        };
        assert_eq!(delivery.for_quote().direccion, None);

        delivery.address.province = "Cartago".into();
        let quote = QuoteRequest::new(&cart(), &delivery).expect("non-empty");
        let json = serde_json::to_value(&quote).expect("serialize");
        assert_eq!(
            json["entrega"],
            json!({"modo": "ENVIO", "direccion": {"provincia": "Cartago", "canton": "", "distrito": ""}})
        );
    }

    #[test]
    fn test_quote_request_none_for_empty_cart() {
        assert!(QuoteRequest::new(&Cart::new(), &DeliveryForm::default()).is_none());
    }

    #[test]
    fn test_summary_falls_back_to_subtotal() {
        let summary = CheckoutSummary::new(&cart(), None);
        assert_eq!(summary.subtotal, Centimos::new(700_000));
        assert_eq!(summary.total, Centimos::new(700_000));
        assert!(!summary.is_quoted());

        let quote = Quote {
            subtotal_centimos: Centimos::new(700_000),
            envio_centimos: Centimos::new(250_000),
            total_centimos: Centimos::new(950_000),
        };
        let summary = CheckoutSummary::new(&cart(), Some(&quote));
        assert_eq!(summary.shipping, Some(Centimos::new(250_000)));
        assert_eq!(summary.total, Centimos::new(950_000));
    }

    #[test]
    fn test_confirmation_includes_sinpe_only_for_transfer() {
        let descriptor = sinpe().to_descriptor(today(), DEFAULT_SINPE_NUMBER).expect("valid");
        let confirmation = OrderConfirmation::new(OrderId::new("77"), &descriptor);
        assert_eq!(confirmation.sinpe_number.as_deref(), Some(DEFAULT_SINPE_NUMBER));
        assert_eq!(confirmation.reference.as_deref(), Some("REF123"));
    }
}
