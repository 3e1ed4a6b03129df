//! Cart and checkout.
//!
//! # Usage
//!
//! ```bash
//! tsir cart add 12
//! tsir cart set 12 3
//! tsir checkout quote --province "San José" --canton Escazú --district "San Rafael"
//! tsir checkout place --name "Ana Mora" --email ana@correo.cr \
//!     --pickup --pay sinpe --sinpe-ref 123456
//! ```

use std::io::Write;

use chrono::Local;
use clap::{Args, Subcommand, ValueEnum};
use tsirushka_client::{AppState, Confirm, Notice};
use tsirushka_core::checkout::{
    AddressForm, CardInput, CheckoutForm, CustomerForm, DeliveryForm, PaymentInput, TransferInput,
};
use tsirushka_core::{DeliveryMode, ProductId};
use tsirushka_storefront::pages::{CartPage, CheckoutController, orders, product};

use crate::error::CliError;
use crate::render;

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add { id: String },
    /// One more unit
    Inc { id: String },
    /// One less unit (never below 1)
    Dec { id: String },
    /// Set the quantity (clamped to 1..=999)
    Set { id: String, quantity: String },
    /// Remove a line
    Remove { id: String },
    /// Empty the cart
    Clear,
}

pub async fn cart(
    state: &AppState,
    command: CartCommand,
    confirm: &dyn Confirm,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let page = CartPage::new(state.clone());
    let view = match command {
        CartCommand::Show => page.view(),
        CartCommand::Add { id } => {
            let p = product::load_product(state, &ProductId::new(id)).await?;
            product::add_to_cart(state, &p)?;
            render::notice(out, &Notice::success(format!("{} agregado al carrito", p.nombre)))?;
            page.view()
        }
        CartCommand::Inc { id } => page.increment(&ProductId::new(id))?,
        CartCommand::Dec { id } => page.decrement(&ProductId::new(id))?,
        CartCommand::Set { id, quantity } => page.set_quantity_text(&ProductId::new(id), &quantity)?,
        CartCommand::Remove { id } => {
            let (notice, view) = page.remove(&ProductId::new(id))?;
            render::notice(out, &notice)?;
            view
        }
        CartCommand::Clear => {
            if page.clear(confirm)? {
                render::notice(out, &Notice::info("Carrito vaciado"))?;
            }
            page.view()
        }
    };
    render::cart(out, &view)?;
    Ok(())
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Subcommand)]
pub enum CheckoutCommand {
    /// Price the cart for a delivery option
    Quote(DeliveryArgs),
    /// Place the order
    Place(PlaceArgs),
}

#[derive(Args)]
pub struct DeliveryArgs {
    /// Pick up at the store instead of shipping
    #[arg(long)]
    pub pickup: bool,
    #[arg(long, default_value = "")]
    pub province: String,
    #[arg(long, default_value = "")]
    pub canton: String,
    #[arg(long, default_value = "")]
    pub district: String,
    /// Exact address
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub address_notes: String,
}

impl DeliveryArgs {
    fn form(&self) -> DeliveryForm {
        DeliveryForm {
            mode: if self.pickup {
                DeliveryMode::Retiro
            } else {
                DeliveryMode::Envio
            },
            address: AddressForm {
                province: self.province.clone(),
                canton: self.canton.clone(),
                district: self.district.clone(),
                exact: self.address.clone(),
                notes: self.address_notes.clone(),
            },
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PayMethod {
    Card,
    Sinpe,
}

#[derive(Args)]
pub struct PlaceArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,

    #[command(flatten)]
    pub delivery: DeliveryArgs,

    #[arg(long, value_enum)]
    pub pay: PayMethod,

    #[arg(long, default_value = "")]
    pub card_number: String,
    #[arg(long, default_value = "")]
    pub card_holder: String,
    /// MM/YY
    #[arg(long, default_value = "")]
    pub card_expiry: String,
    #[arg(long, env = "TSIR_CARD_CVV", hide_env_values = true, default_value = "")]
    pub card_cvv: String,

    /// SINPE Móvil transfer reference
    #[arg(long, default_value = "")]
    pub sinpe_ref: String,
    #[arg(long, default_value = "")]
    pub payer_phone: String,

    #[arg(long, default_value = "")]
    pub payment_notes: String,
}

impl PlaceArgs {
    fn form(self) -> CheckoutForm {
        let payment = match self.pay {
            PayMethod::Card => PaymentInput::Card(CardInput {
                number: self.card_number,
                holder: self.card_holder,
                expiry: self.card_expiry,
                cvv: self.card_cvv,
                notes: self.payment_notes,
            }),
            PayMethod::Sinpe => PaymentInput::Transfer(TransferInput {
                reference: self.sinpe_ref,
                payer_phone: self.payer_phone,
                notes: self.payment_notes,
            }),
        };
        CheckoutForm {
            customer: CustomerForm {
                name: self.name,
                email: self.email,
                phone: self.phone,
            },
            delivery: self.delivery.form(),
            payment,
        }
    }
}

pub async fn checkout(
    state: &AppState,
    command: CheckoutCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut controller = CheckoutController::open(state.clone())?;
    match command {
        CheckoutCommand::Quote(delivery) => {
            let summary = controller.refresh_quote(&delivery.form()).await;
            if !summary.is_quoted() {
                render::notice(out, &Notice::warn("No se pudo calcular el envío"))?;
            }
            render::summary(out, &summary)?;
        }
        CheckoutCommand::Place(args) => {
            let form = args.form();
            let summary = controller.refresh_quote(&form.delivery).await;
            render::summary(out, &summary)?;

            let today = Local::now().date_naive();
            let placed = controller.place_order(&form, today).await?;
            match orders::confirmation(state, &placed).await {
                Ok(view) => render::confirmation(out, &view)?,
                Err(e) => {
                    tracing::warn!(error = %e, "Order placed but could not be loaded");
                    render::notice(
                        out,
                        &Notice::success(format!("Pedido creado: {}", placed.order_id)),
                    )?;
                }
            }
        }
    }
    Ok(())
}
