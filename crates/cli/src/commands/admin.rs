//! Admin console commands.
//!
//! Every command passes the admin role gate first. Destructive actions ask
//! for confirmation unless `--yes` is given.
//!
//! # Usage
//!
//! ```bash
//! tsir admin dashboard
//! tsir admin orders list --status PENDIENTE
//! tsir admin orders action 41 confirmar
//! tsir admin products list --status bajo-stock
//! tsir --yes admin categories delete 3
//! ```

use std::io::Write;

use clap::{Args, Subcommand};
use tsirushka_admin::categories::{AdminCategory, CategoryInput};
use tsirushka_admin::customers::{AdminCustomer, BlockAction, CustomerUpdate};
use tsirushka_admin::orders::{AdminOrder, OrderTransition};
use tsirushka_admin::products::{AdminProduct, ProductInput};
use tsirushka_admin::requests::ContactRequest;
use tsirushka_admin::{AdminConsole, AdminEntity, ListController};
use tsirushka_client::{AppState, Confirm, Notice};
use tsirushka_core::{
    CategoryId, Centimos, ContactRequestId, ContactRequestStatus, CustomerId, DeliveryMode, OrderId,
    ProductId,
};

use crate::error::CliError;
use crate::render;

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Counters, latest orders and low stock
    Dashboard,
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage contact requests
    Requests {
        #[command(subcommand)]
        action: RequestAction,
    },
}

/// Search, filter and page for list commands.
#[derive(Args, Default)]
pub struct ListArgs {
    /// Search text
    #[arg(short, long)]
    pub q: Option<String>,
    /// Status filter
    #[arg(short, long)]
    pub status: Option<String>,
    /// Category filter
    #[arg(short, long)]
    pub category: Option<String>,
    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    List,
    Create(CategoryArgs),
    Update {
        id: String,
        #[command(flatten)]
        input: CategoryArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Args)]
pub struct CategoryArgs {
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Subcommand)]
pub enum CustomerAction {
    List(ListArgs),
    Update {
        id: String,
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    Block {
        id: String,
    },
    Unblock {
        id: String,
    },
    /// Order history of one customer
    Orders {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products; `--status` takes activo, inactivo or bajo-stock
    List(ListArgs),
    /// Categories available to products
    Categories,
    Show {
        id: String,
    },
    Create(ProductArgs),
    Update {
        id: String,
        #[command(flatten)]
        input: ProductArgs,
    },
    Activate {
        id: String,
    },
    Deactivate {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(short, long)]
    pub name: String,
    /// Price in colones
    #[arg(long)]
    pub price: u64,
    #[arg(long, default_value_t = 0)]
    pub stock: i64,
    #[arg(long, default_value_t = 5)]
    pub min_stock: i64,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    /// Create or leave the product inactive
    #[arg(long)]
    pub inactive: bool,
}

impl ProductArgs {
    fn input(self) -> ProductInput {
        ProductInput {
            nombre: self.name,
            categoria_id: self.category.map(CategoryId::new),
            precio_centimos: Centimos::from_colones(self.price),
            stock: self.stock,
            stock_minimo: self.min_stock,
            descripcion: self.description,
            imagen_url: self.image_url,
            activo: !self.inactive,
        }
    }
}

#[derive(Subcommand)]
pub enum OrderAction {
    List(ListArgs),
    Show {
        id: String,
    },
    /// Replace the internal notes
    Notes {
        id: String,
        notes: String,
    },
    /// confirmar, preparar, enviar, entregar or cancelar
    Action {
        id: String,
        transition: OrderTransition,
    },
}

#[derive(Subcommand)]
pub enum RequestAction {
    List(ListArgs),
    Show {
        id: String,
    },
    Notes {
        id: String,
        notes: String,
    },
    /// Set status: PENDIENTE, LEIDA or RESUELTA
    Mark {
        id: String,
        status: ContactRequestStatus,
    },
    Delete {
        id: String,
    },
}

pub async fn run(
    state: &AppState,
    command: AdminCommand,
    confirm: &dyn Confirm,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let console = AdminConsole::open(state.clone())?;
    match command {
        AdminCommand::Dashboard => render::dashboard(out, &console.dashboard().await)?,
        AdminCommand::Categories { action } => categories(&console, action, confirm, out).await?,
        AdminCommand::Customers { action } => customers(&console, action, confirm, out).await?,
        AdminCommand::Products { action } => products(&console, action, confirm, out).await?,
        AdminCommand::Orders { action } => orders(&console, action, confirm, out).await?,
        AdminCommand::Requests { action } => requests(&console, action, confirm, out).await?,
    }
    Ok(())
}

/// Apply the list arguments and load list and stats.
async fn show_list<E: AdminEntity>(
    list: &ListController<E>,
    args: &ListArgs,
    stats: impl FnOnce(&E::Stats) -> Vec<(&'static str, String)>,
    row: impl FnMut(&E::Row) -> String,
    out: &mut impl Write,
) -> Result<(), CliError> {
    list.preset(
        args.q.as_deref(),
        args.status.as_deref(),
        args.category.as_deref(),
        args.page.saturating_sub(1),
    );
    let state = list.mount().await;
    if E::HAS_STATS {
        let pairs = list.stats().map(|s| stats(&s));
        render::stats(out, pairs.as_deref())?;
    }
    render::list(out, &state, row)?;
    Ok(())
}

fn done(out: &mut impl Write, message: &str) -> Result<(), CliError> {
    render::notice(out, &Notice::success(message))?;
    Ok(())
}

async fn categories(
    console: &AdminConsole,
    action: CategoryAction,
    confirm: &dyn Confirm,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let admin = console.categories();
    match action {
        CategoryAction::List => {
            show_list(
                admin.list(),
                &ListArgs::default(),
                |s| vec![("Total", s.total.to_string())],
                category_row,
                out,
            )
            .await?;
        }
        CategoryAction::Create(args) => {
            admin.create(&category_input(args)).await?;
            done(out, "Categoría creada")?;
        }
        CategoryAction::Update { id, input } => {
            admin.update(&CategoryId::new(id), &category_input(input)).await?;
            done(out, "Categoría actualizada")?;
        }
        CategoryAction::Delete { id } => {
            admin.delete(&CategoryId::new(id), confirm).await?;
            done(out, "Categoría eliminada")?;
        }
    }
    Ok(())
}

fn category_input(args: CategoryArgs) -> CategoryInput {
    CategoryInput {
        nombre: args.name,
        descripcion: args.description,
    }
}

fn category_row(c: &AdminCategory) -> String {
    format!(
        "{:<6} {:<24} {:<20} {} productos",
        c.id,
        c.nombre,
        c.slug.as_deref().unwrap_or("-"),
        c.cantidad_productos
    )
}

async fn customers(
    console: &AdminConsole,
    action: CustomerAction,
    confirm: &dyn Confirm,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let admin = console.customers();
    match action {
        CustomerAction::List(args) => {
            show_list(
                admin.list(),
                &args,
                |s| {
                    vec![
                        ("Total", s.total.to_string()),
                        ("Activos", s.activos.to_string()),
                        ("Bloqueados", s.bloqueados.to_string()),
                        ("Verificados", s.verificados.to_string()),
                    ]
                },
                customer_row,
                out,
            )
            .await?;
        }
        CustomerAction::Update { id, name, phone } => {
            let update = CustomerUpdate {
                nombre_completo: name,
                telefono: phone,
            };
            admin.update(&CustomerId::new(id), &update).await?;
            done(out, "Cliente actualizado")?;
        }
        CustomerAction::Block { id } => {
            admin
                .set_blocked(&CustomerId::new(id), BlockAction::Block, confirm)
                .await?;
            done(out, "Cliente bloqueado")?;
        }
        CustomerAction::Unblock { id } => {
            admin
                .set_blocked(&CustomerId::new(id), BlockAction::Unblock, confirm)
                .await?;
            done(out, "Cliente desbloqueado")?;
        }
        CustomerAction::Orders { id } => {
            let page = admin.orders(&CustomerId::new(id)).await?;
            if page.is_empty() {
                writeln!(out, "Este cliente aún no ha realizado pedidos")?;
            }
            for o in &page.items {
                writeln!(
                    out,
                    "{:<12} {:<12} {:>12} {}",
                    o.numero,
                    o.fecha.as_deref().unwrap_or("-"),
                    o.total.display_crc(),
                    o.estado
                )?;
            }
        }
    }
    Ok(())
}

fn customer_row(c: &AdminCustomer) -> String {
    let verified = if c.email_verificado { "✓" } else { " " };
    format!(
        "{:<6} {:<24} {:<28}{verified} {:<10} {} pedidos",
        c.id, c.nombre_completo, c.email, c.estado, c.cantidad_pedidos
    )
}

async fn products(
    console: &AdminConsole,
    action: ProductAction,
    confirm: &dyn Confirm,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let admin = console.products();
    match action {
        ProductAction::List(args) => {
            show_list(admin.list(), &args, |_| Vec::new(), product_row, out).await?;
        }
        ProductAction::Categories => {
            for c in admin.categories().await? {
                writeln!(out, "{:<6} {}", c.id, c.nombre)?;
            }
        }
        ProductAction::Show { id } => {
            let p = admin.get(&ProductId::new(id)).await?;
            writeln!(out, "{}", product_row(&p))?;
            if let Some(description) = &p.descripcion {
                writeln!(out, "{description}")?;
            }
        }
        ProductAction::Create(args) => {
            admin.create(&args.input()).await?;
            done(out, "Producto creado")?;
        }
        ProductAction::Update { id, input } => {
            admin.update(&ProductId::new(id), &input.input()).await?;
            done(out, "Producto actualizado")?;
        }
        ProductAction::Activate { id } => {
            admin.set_active(&ProductId::new(id), true, confirm).await?;
            done(out, "Producto activado")?;
        }
        ProductAction::Deactivate { id } => {
            admin.set_active(&ProductId::new(id), false, confirm).await?;
            done(out, "Producto inactivado")?;
        }
        ProductAction::Delete { id } => {
            admin.delete(&ProductId::new(id), confirm).await?;
            done(out, "Producto eliminado")?;
        }
    }
    Ok(())
}

fn product_row(p: &AdminProduct) -> String {
    let active = if p.activo { "Activo" } else { "Inactivo" };
    format!(
        "{:<6} {:<28} {:>12} stock {:>4} [{}] {active}",
        p.id,
        p.nombre,
        p.precio_centimos.display_crc(),
        p.stock,
        p.stock_label()
    )
}

async fn orders(
    console: &AdminConsole,
    action: OrderAction,
    confirm: &dyn Confirm,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let admin = console.orders();
    match action {
        OrderAction::List(args) => {
            show_list(
                admin.list(),
                &args,
                |s| {
                    vec![
                        ("Total", s.total.to_string()),
                        ("Pendientes", s.pendientes.to_string()),
                        ("En proceso", s.in_progress().to_string()),
                        ("Ventas", s.ventas_totales_centimos.display_crc()),
                    ]
                },
                order_row,
                out,
            )
            .await?;
        }
        OrderAction::Show { id } => {
            let o = admin.detail(&OrderId::new(id)).await?;
            order_detail(out, &o)?;
        }
        OrderAction::Notes { id, notes } => {
            admin.save_notes(&OrderId::new(id), &notes).await?;
            done(out, "Notas guardadas")?;
        }
        OrderAction::Action { id, transition } => {
            admin.transition(&OrderId::new(id), transition, confirm).await?;
            done(out, &format!("Pedido {}", transition.target().label()))?;
        }
    }
    Ok(())
}

fn order_row(o: &AdminOrder) -> String {
    format!(
        "{:<6} {:<12} {:<24} {:<14} {:>12}",
        o.id,
        o.display_number(),
        o.cliente_nombre.as_deref().unwrap_or("-"),
        o.estado.label(),
        o.total_centimos.display_crc()
    )
}

fn order_detail(out: &mut impl Write, o: &AdminOrder) -> std::io::Result<()> {
    writeln!(out, "Pedido {} · {}", o.display_number(), o.estado.label())?;
    writeln!(
        out,
        "Cliente: {} <{}> {}",
        o.cliente_nombre.as_deref().unwrap_or("-"),
        o.cliente_email.as_deref().unwrap_or("-"),
        o.cliente_telefono.as_deref().unwrap_or("")
    )?;
    match o.modo_entrega {
        Some(DeliveryMode::Envio) => writeln!(out, "Entrega: envío")?,
        Some(DeliveryMode::Retiro) => writeln!(out, "Entrega: retiro en tienda")?,
        None => {}
    }
    if let Some(address) = &o.direccion {
        writeln!(out, "Dirección: {address}")?;
    }
    for line in &o.items {
        writeln!(
            out,
            "  {} x{} @ {} = {}",
            line.producto_nombre,
            line.cantidad,
            line.precio_unitario_centimos.display_crc(),
            line.subtotal_centimos.display_crc()
        )?;
    }
    writeln!(out, "Subtotal: {}", o.subtotal_centimos.display_crc())?;
    writeln!(out, "Envío:    {}", o.envio_centimos.display_crc())?;
    writeln!(out, "Total:    {}", o.total_centimos.display_crc())?;
    if let Some(notes) = &o.notas_internas {
        writeln!(out, "Notas: {notes}")?;
    }
    let actions: Vec<&str> = o.available_transitions().iter().map(|t| t.segment()).collect();
    if !actions.is_empty() {
        writeln!(out, "Acciones: {}", actions.join(", "))?;
    }
    Ok(())
}

async fn requests(
    console: &AdminConsole,
    action: RequestAction,
    confirm: &dyn Confirm,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let admin = console.requests();
    match action {
        RequestAction::List(args) => {
            show_list(
                admin.list(),
                &args,
                |s| {
                    vec![
                        ("Total", s.total.to_string()),
                        ("Pendientes", s.pendientes.to_string()),
                        ("Leídas", s.leidas.to_string()),
                        ("Resueltas", s.resueltas.to_string()),
                    ]
                },
                request_row,
                out,
            )
            .await?;
        }
        RequestAction::Show { id } => {
            let r = admin.detail(&ContactRequestId::new(id)).await?;
            writeln!(out, "{} · {}", r.asunto, r.estado)?;
            writeln!(
                out,
                "De: {} <{}> {}",
                r.solicitante_nombre,
                r.solicitante_email,
                r.solicitante_telefono.as_deref().unwrap_or("")
            )?;
            writeln!(out, "\n{}", r.mensaje)?;
            if let Some(url) = &r.adjunto_url {
                writeln!(out, "Adjunto: {url}")?;
            }
            if let Some(notes) = &r.notas_internas {
                writeln!(out, "Notas: {notes}")?;
            }
        }
        RequestAction::Notes { id, notes } => {
            admin.save_notes(&ContactRequestId::new(id), &notes).await?;
            done(out, "Notas guardadas")?;
        }
        RequestAction::Mark { id, status } => {
            admin.mark(&ContactRequestId::new(id), status).await?;
            done(out, "Estado actualizado")?;
        }
        RequestAction::Delete { id } => {
            admin.delete(&ContactRequestId::new(id), confirm).await?;
            done(out, "Solicitud eliminada")?;
        }
    }
    Ok(())
}

fn request_row(r: &ContactRequest) -> String {
    format!(
        "{:<6} {:<10} {:<24} {:<32} {}",
        r.id,
        r.estado,
        r.solicitante_nombre,
        r.asunto,
        r.created_at.as_deref().unwrap_or("")
    )
}
