//! Admin dashboard: counters, latest orders and low-stock products.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};
use tsirushka_client::AppState;
use tsirushka_core::Page;

use crate::orders::{AdminOrder, OrderStats};
use crate::products::AdminProduct;

const LATEST_ORDERS: &str = "/admin/pedidos?page=0&size=5";
const PRODUCT_COUNT: &str = "/admin/productos?page=0&size=1";
const LOW_STOCK_COUNT: &str = "/admin/productos?lowStock=true&size=1";
const LOW_STOCK_PRODUCTS: &str = "/admin/productos?lowStock=true&size=5";
const ORDER_STATS: &str = "/admin/pedidos/stats";

/// One dashboard panel. A failed panel shows as unavailable without
/// affecting the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> Panel<T> {
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub product_total: Panel<u64>,
    pub low_stock_total: Panel<u64>,
    pub order_stats: Panel<OrderStats>,
    pub latest_orders: Panel<Vec<AdminOrder>>,
    pub low_stock: Panel<Vec<AdminProduct>>,
}

/// Only the `total` of a page is needed for counters.
#[derive(Deserialize)]
struct Total {
    #[serde(default)]
    total: u64,
}

/// Load every panel concurrently.
#[instrument(skip(state))]
pub async fn load(state: &AppState) -> Dashboard {
    let (product_total, low_stock_total, order_stats, latest_orders, low_stock) = tokio::join!(
        panel::<Total>(state, PRODUCT_COUNT),
        panel::<Total>(state, LOW_STOCK_COUNT),
        panel::<OrderStats>(state, ORDER_STATS),
        panel::<Page<AdminOrder>>(state, LATEST_ORDERS),
        panel::<Page<AdminProduct>>(state, LOW_STOCK_PRODUCTS),
    );

    Dashboard {
        product_total: map(product_total, |t| t.total),
        low_stock_total: map(low_stock_total, |t| t.total),
        order_stats,
        latest_orders: map(latest_orders, |p| p.items),
        low_stock: map(low_stock, |p| p.items),
    }
}

async fn panel<T: DeserializeOwned>(state: &AppState, path: &str) -> Panel<T> {
    match state.api().get_json(path, true).await {
        Ok(value) => Panel::Ready(value),
        Err(e) => {
            warn!(path, error = %e, "Dashboard panel failed");
            Panel::Unavailable(e.to_string())
        }
    }
}

fn map<T, U>(panel: Panel<T>, f: impl FnOnce(T) -> U) -> Panel<U> {
    match panel {
        Panel::Ready(value) => Panel::Ready(f(value)),
        Panel::Unavailable(reason) => Panel::Unavailable(reason),
    }
}
