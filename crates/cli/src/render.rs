//! Plain-text views.
//!
//! Every function writes to any `io::Write` so output can be checked in
//! tests; `main` hands them a locked stdout.

use std::io::{self, Write};

use tsirushka_admin::ListState;
use tsirushka_admin::dashboard::{Dashboard, Panel};
use tsirushka_client::Notice;
use tsirushka_core::Page;
use tsirushka_core::catalog::{CatalogPage, CatalogProduct};
use tsirushka_core::checkout::CheckoutSummary;
use tsirushka_core::orders::{CustomerOrder, status_description};
use tsirushka_storefront::Navbar;
use tsirushka_storefront::pages::CartView;
use tsirushka_storefront::pages::orders::{ConfirmationView, MyOrders};

const UNAVAILABLE: &str = "—";

pub fn notice(out: &mut impl Write, notice: &Notice) -> io::Result<()> {
    writeln!(out, "{notice}")
}

pub fn navbar(out: &mut impl Write, nav: &Navbar) -> io::Result<()> {
    let links: Vec<&str> = nav.links.iter().map(|l| l.label()).collect();
    write!(out, "{}", links.join(" | "))?;
    if let Some(count) = nav.cart_badge {
        write!(out, " ({count})")?;
    }
    writeln!(out)
}

// =============================================================================
// Storefront
// =============================================================================

pub fn catalog(out: &mut impl Write, page: &CatalogPage) -> io::Result<()> {
    if page.products.is_empty() {
        return writeln!(out, "No se encontraron productos");
    }
    for p in &page.products {
        let stock = if p.in_stock() { "" } else { "  [agotado]" };
        writeln!(
            out,
            "{:<8} {:<32} {:>12}{stock}",
            p.id,
            p.nombre,
            p.precio_centimos.display_crc()
        )?;
    }
    writeln!(
        out,
        "Página {} de {} · {} productos",
        page.page + 1,
        page.total_pages.max(1),
        page.matched
    )
}

pub fn product(out: &mut impl Write, p: &CatalogProduct) -> io::Result<()> {
    writeln!(out, "{} ({})", p.nombre, p.id)?;
    writeln!(out, "Precio: {}", p.precio_centimos.display_crc())?;
    if let Some(category) = &p.categoria_nombre {
        writeln!(out, "Categoría: {category}")?;
    }
    let stock = if p.in_stock() {
        format!("{} disponibles", p.stock)
    } else {
        "Agotado".to_string()
    };
    writeln!(out, "Stock: {stock}")?;
    if let Some(description) = &p.descripcion {
        writeln!(out, "\n{description}")?;
    }
    Ok(())
}

pub fn cart(out: &mut impl Write, view: &CartView) -> io::Result<()> {
    if view.is_empty() {
        return writeln!(out, "Tu carrito está vacío");
    }
    for row in &view.rows {
        writeln!(
            out,
            "{:<8} {:<28} {:>4} x {:>10} = {:>10}",
            row.product_id,
            row.name,
            row.quantity,
            row.unit_price.display_crc(),
            row.line_total.display_crc()
        )?;
    }
    writeln!(out, "Subtotal: {}", view.subtotal.display_crc())?;
    writeln!(out, "Total:    {}", view.total.display_crc())
}

pub fn summary(out: &mut impl Write, summary: &CheckoutSummary) -> io::Result<()> {
    for line in &summary.lines {
        writeln!(
            out,
            "{} x{}  {}",
            line.name,
            line.quantity,
            line.line_total().display_crc()
        )?;
    }
    writeln!(out, "Subtotal: {}", summary.subtotal.display_crc())?;
    let shipping = summary
        .shipping
        .map_or_else(|| UNAVAILABLE.to_string(), |s| s.display_crc());
    writeln!(out, "Envío:    {shipping}")?;
    writeln!(out, "Total:    {}", summary.total.display_crc())
}

pub fn confirmation(out: &mut impl Write, view: &ConfirmationView) -> io::Result<()> {
    writeln!(out, "¡Pedido recibido! #{}", view.order.display_number())?;
    writeln!(out, "Método de pago: {}", view.method)?;
    for step in &view.instructions {
        writeln!(out, "  - {step}")?;
    }
    order(out, &view.order)
}

pub fn my_orders(out: &mut impl Write, orders: &MyOrders) -> io::Result<()> {
    if orders.is_empty() {
        return writeln!(out, "Aún no tenés pedidos");
    }
    for o in &orders.orders {
        writeln!(
            out,
            "#{:<12} {:<16} {:>3} artículos {:>12}",
            o.display_number(),
            o.estado.label(),
            o.item_count(),
            o.total_centimos.display_crc()
        )?;
    }
    Ok(())
}

pub fn order(out: &mut impl Write, o: &CustomerOrder) -> io::Result<()> {
    writeln!(out, "Pedido #{} · {}", o.display_number(), o.estado.label())?;
    writeln!(out, "{}", status_description(o.estado))?;
    if let Some(created) = &o.created_at {
        writeln!(out, "Fecha: {created}")?;
    }
    for line in &o.items {
        writeln!(
            out,
            "  {} x{}  {}",
            line.producto_nombre,
            line.cantidad,
            line.subtotal_centimos.display_crc()
        )?;
    }
    writeln!(out, "Subtotal: {}", o.subtotal_centimos.display_crc())?;
    writeln!(out, "Envío:    {}", o.envio_centimos.display_crc())?;
    writeln!(out, "Total:    {}", o.total_centimos.display_crc())
}

// =============================================================================
// Admin
// =============================================================================

/// A list view: rows, or the loading/error placeholder, then the pager.
pub fn list<T>(
    out: &mut impl Write,
    state: &ListState<T>,
    mut row: impl FnMut(&T) -> String,
) -> io::Result<()> {
    match state {
        ListState::Idle => Ok(()),
        ListState::Loading => writeln!(out, "Cargando…"),
        ListState::Error(message) => writeln!(out, "Error al cargar: {message}"),
        ListState::Loaded(page) if page.is_empty() => writeln!(out, "No hay resultados"),
        ListState::Loaded(page) => {
            for item in &page.items {
                writeln!(out, "{}", row(item))?;
            }
            pager(out, page)
        }
    }
}

fn pager<T>(out: &mut impl Write, page: &Page<T>) -> io::Result<()> {
    let pages = page.total_pages();
    if pages > 1 {
        writeln!(out, "Página {} de {pages} · {} en total", page.page + 1, page.total)?;
    }
    Ok(())
}

/// `label: value` pairs of a stats panel, or a placeholder when it failed.
pub fn stats(out: &mut impl Write, stats: Option<&[(&str, String)]>) -> io::Result<()> {
    let Some(stats) = stats else {
        return writeln!(out, "Estadísticas: {UNAVAILABLE}");
    };
    let parts: Vec<String> = stats.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    writeln!(out, "{}", parts.join(" · "))
}

pub fn dashboard(out: &mut impl Write, d: &Dashboard) -> io::Result<()> {
    let count = |panel: &Panel<u64>| {
        panel
            .ready()
            .map_or_else(|| UNAVAILABLE.to_string(), u64::to_string)
    };
    writeln!(out, "Productos:       {}", count(&d.product_total))?;
    writeln!(out, "Bajo stock:      {}", count(&d.low_stock_total))?;

    match &d.order_stats {
        Panel::Ready(s) => {
            writeln!(out, "Pedidos:         {}", s.total)?;
            writeln!(out, "  Pendientes:    {}", s.pendientes)?;
            writeln!(out, "  En proceso:    {}", s.in_progress())?;
            writeln!(out, "  Ventas:        {}", s.ventas_totales_centimos.display_crc())?;
        }
        Panel::Unavailable(_) => writeln!(out, "Pedidos:         {UNAVAILABLE}")?,
    }

    writeln!(out, "\nÚltimos pedidos")?;
    match &d.latest_orders {
        Panel::Ready(orders) if orders.is_empty() => writeln!(out, "  No hay pedidos")?,
        Panel::Ready(orders) => {
            for o in orders {
                writeln!(
                    out,
                    "  {:<12} {:<24} {:<12} {:>12}",
                    o.display_number(),
                    o.cliente_nombre.as_deref().unwrap_or("-"),
                    o.estado.label(),
                    o.total_centimos.display_crc()
                )?;
            }
        }
        Panel::Unavailable(reason) => writeln!(out, "  No disponible: {reason}")?,
    }

    writeln!(out, "\nProductos con bajo stock")?;
    match &d.low_stock {
        Panel::Ready(products) if products.is_empty() => writeln!(out, "  Todo en orden")?,
        Panel::Ready(products) => {
            for p in products {
                writeln!(out, "  {:<32} {:>4} (mín. {})", p.nombre, p.stock, p.min_stock())?;
            }
        }
        Panel::Unavailable(reason) => writeln!(out, "  No disponible: {reason}")?,
    }
    Ok(())
}
