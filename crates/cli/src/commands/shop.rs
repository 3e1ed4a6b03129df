//! Catalog, product detail, "my orders" and the contact form.

use std::io::Write;

use clap::{Args, Subcommand};
use tsirushka_client::{AppState, Notice};
use tsirushka_core::catalog::SortBy;
use tsirushka_core::orders::OrderGroup;
use tsirushka_core::{CategoryId, Centimos, OrderId, ProductId};
use tsirushka_storefront::pages::contact::{self, ContactForm};
use tsirushka_storefront::pages::{CatalogController, orders, product};

use crate::error::CliError;
use crate::render;

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List products with optional filters
    List(CatalogListArgs),
    /// Show one product
    Show {
        id: String,
        /// Also add one unit to the cart
        #[arg(long)]
        add: bool,
    },
    /// List categories
    Categories,
}

#[derive(Args)]
pub struct CatalogListArgs {
    /// Search text
    #[arg(short, long)]
    pub q: Option<String>,

    /// Category id
    #[arg(short, long)]
    pub category: Option<String>,

    /// Minimum price in colones
    #[arg(long)]
    pub min: Option<u64>,

    /// Maximum price in colones
    #[arg(long)]
    pub max: Option<u64>,

    /// Include products without stock
    #[arg(long)]
    pub all: bool,

    /// nombre-asc, nombre-desc, precio-asc, precio-desc or nuevo
    #[arg(short, long, default_value = "nombre-asc")]
    pub sort: SortBy,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

pub async fn catalog(
    state: &AppState,
    command: CatalogCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        CatalogCommand::List(args) => {
            let mut controller = CatalogController::new(state.clone());
            controller.search(args.q).await?;
            controller.set_category(args.category.map(CategoryId::new));
            controller.set_price_range(
                args.min.map(Centimos::from_colones),
                args.max.map(Centimos::from_colones),
            );
            controller.set_in_stock_only(!args.all);
            controller.set_sort(args.sort);
            for _ in 1..args.page {
                if !controller.next_page() {
                    break;
                }
            }
            render::catalog(out, &controller.view())?;
        }
        CatalogCommand::Show { id, add } => {
            let p = product::load_product(state, &ProductId::new(id)).await?;
            render::product(out, &p)?;
            if add {
                let qty = product::add_to_cart(state, &p)?;
                render::notice(out, &Notice::success(format!("{} en el carrito: {qty}", p.nombre)))?;
            }
        }
        CatalogCommand::Categories => {
            let mut controller = CatalogController::new(state.clone());
            for c in controller.load_categories().await? {
                writeln!(out, "{:<8} {}", c.id, c.nombre)?;
            }
        }
    }
    Ok(())
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List your orders
    List {
        /// en-proceso, enviados, entregados or cancelados
        #[arg(short, long, value_parser = parse_group)]
        group: Option<OrderGroup>,
    },
    /// Show one of your orders
    Show { id: String },
}

fn parse_group(s: &str) -> Result<OrderGroup, String> {
    match s {
        "en-proceso" => Ok(OrderGroup::InProgress),
        "enviados" => Ok(OrderGroup::Shipped),
        "entregados" => Ok(OrderGroup::Delivered),
        "cancelados" => Ok(OrderGroup::Cancelled),
        other => Err(format!("grupo desconocido: {other}")),
    }
}

pub async fn orders(
    state: &AppState,
    command: OrdersCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        OrdersCommand::List { group } => {
            let mut mine = orders::my_orders(state).await?;
            if let Some(group) = group {
                mine.orders.retain(|o| OrderGroup::of(o.estado) == group);
            }
            render::my_orders(out, &mine)?;
        }
        OrdersCommand::Show { id } => {
            let order = orders::order_detail(state, &OrderId::new(id)).await?;
            render::order(out, &order)?;
        }
    }
    Ok(())
}

#[derive(Args)]
pub struct ContactArgs {
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(short, long)]
    pub subject: String,
    #[arg(short, long)]
    pub message: String,
}

pub async fn contact(state: &AppState, args: ContactArgs, out: &mut impl Write) -> Result<(), CliError> {
    let form = ContactForm {
        name: args.name,
        email: args.email,
        phone: args.phone,
        subject: args.subject,
        message: args.message,
    };
    contact::submit(state, &form).await?;
    render::notice(out, &Notice::success("¡Gracias! Te contactaremos pronto."))?;
    Ok(())
}
