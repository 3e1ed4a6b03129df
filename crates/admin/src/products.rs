//! Product management.
//!
//! Search and category filters go to the server. The active/inactive/low
//! stock filter is applied to the fetched page only, so a filtered page can
//! hold fewer rows than the page size.

use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use tsirushka_client::{AppState, Confirm};
use tsirushka_core::{Centimos, CategoryId, ListQuery, Page, ProductId};

use crate::error::AdminError;
use crate::list::{AdminEntity, ListController, confirm_or_cancel, item_path};

/// Minimum stock used when a product does not set its own.
pub const DEFAULT_MIN_STOCK: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProduct {
    pub id: ProductId,
    #[serde(default)]
    pub sku: Option<String>,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub precio_centimos: Centimos,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub stock_minimo: Option<i64>,
    #[serde(default)]
    pub activo: bool,
    #[serde(default)]
    pub categoria_id: Option<CategoryId>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub imagen_url: Option<String>,
}

impl AdminProduct {
    #[must_use]
    pub fn min_stock(&self) -> i64 {
        self.stock_minimo.filter(|m| *m > 0).unwrap_or(DEFAULT_MIN_STOCK)
    }

    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.stock < self.min_stock()
    }

    /// Stock badge text.
    #[must_use]
    pub fn stock_label(&self) -> &'static str {
        if self.stock <= 0 {
            "Agotado"
        } else if self.is_low_stock() {
            "Bajo"
        } else {
            "OK"
        }
    }
}

/// Local filter on the fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatusFilter {
    Active,
    Inactive,
    LowStock,
}

impl ProductStatusFilter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "activo",
            Self::Inactive => "inactivo",
            Self::LowStock => "bajo-stock",
        }
    }

    #[must_use]
    pub fn matches(self, product: &AdminProduct) -> bool {
        match self {
            Self::Active => product.activo,
            Self::Inactive => !product.activo,
            Self::LowStock => product.is_low_stock(),
        }
    }
}

impl FromStr for ProductStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "activo" => Ok(Self::Active),
            "inactivo" => Ok(Self::Inactive),
            "bajo-stock" => Ok(Self::LowStock),
            other => Err(format!("invalid product filter: {other}")),
        }
    }
}

/// A category choice for the product form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub nombre: String,
}

/// Create/edit form, already in wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub nombre: String,
    pub categoria_id: Option<CategoryId>,
    pub precio_centimos: Centimos,
    pub stock: i64,
    pub stock_minimo: i64,
    pub descripcion: Option<String>,
    pub imagen_url: Option<String>,
    pub activo: bool,
}

impl Default for ProductInput {
    fn default() -> Self {
        Self {
            nombre: String::new(),
            categoria_id: None,
            precio_centimos: Centimos::ZERO,
            stock: 0,
            stock_minimo: DEFAULT_MIN_STOCK,
            descripcion: None,
            imagen_url: None,
            activo: true,
        }
    }
}

impl ProductInput {
    fn validated(&self) -> Result<Self, AdminError> {
        let nombre = self.nombre.trim();
        if nombre.is_empty() {
            return Err(AdminError::Validation("El nombre es requerido".into()));
        }
        if self.stock < 0 {
            return Err(AdminError::Validation("El stock no puede ser negativo".into()));
        }
        let trimmed = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Ok(Self {
            nombre: nombre.to_owned(),
            categoria_id: self.categoria_id.clone(),
            precio_centimos: self.precio_centimos,
            stock: self.stock,
            stock_minimo: if self.stock_minimo > 0 {
                self.stock_minimo
            } else {
                DEFAULT_MIN_STOCK
            },
            descripcion: trimmed(&self.descripcion),
            imagen_url: trimmed(&self.imagen_url),
            activo: self.activo,
        })
    }
}

pub struct Products;

impl AdminEntity for Products {
    type Row = AdminProduct;
    type Stats = ();
    const LABEL: &'static str = "product";
    const PATH: &'static str = "/admin/productos";
    const HAS_STATS: bool = false;

    fn list_pairs(query: &ListQuery) -> Vec<(&'static str, String)> {
        // `estado` is a local filter here.
        query
            .to_pairs()
            .into_iter()
            .filter(|(key, _)| *key != "estado")
            .collect()
    }

    fn post_filter(query: &ListQuery, mut page: Page<AdminProduct>) -> Page<AdminProduct> {
        if let Some(filter) = query
            .status
            .as_deref()
            .and_then(|s| s.parse::<ProductStatusFilter>().ok())
        {
            page.items.retain(|p| filter.matches(p));
        }
        page
    }
}

#[derive(Debug)]
pub struct ProductsAdmin {
    list: ListController<Products>,
}

impl ProductsAdmin {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            list: ListController::new(state),
        }
    }

    #[must_use]
    pub const fn list(&self) -> &ListController<Products> {
        &self.list
    }

    /// Categories for the form and the filter.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn categories(&self) -> Result<Vec<CategoryOption>, AdminError> {
        let path = format!("{}/categorias", Products::PATH);
        Ok(self.list.app().api().get_json(&path, true).await?)
    }

    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn get(&self, id: &ProductId) -> Result<AdminProduct, AdminError> {
        let path = item_path(Products::PATH, id.as_str());
        Ok(self.list.app().api().get_json(&path, true).await?)
    }

    /// # Errors
    ///
    /// `Validation` for a blank name or negative stock, otherwise the API
    /// failure.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &ProductInput) -> Result<(), AdminError> {
        let body = input.validated()?;
        self.list
            .action_with(Method::POST, Products::PATH, &body)
            .await?;
        info!(nombre = %body.nombre, "Product created");
        Ok(())
    }

    /// # Errors
    ///
    /// `Validation` for a blank name or negative stock, otherwise the API
    /// failure.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &ProductId, input: &ProductInput) -> Result<(), AdminError> {
        let body = input.validated()?;
        let path = item_path(Products::PATH, id.as_str());
        self.list.action_with(Method::PUT, &path, &body).await?;
        info!("Product updated");
        Ok(())
    }

    /// Activate or deactivate after confirmation.
    ///
    /// # Errors
    ///
    /// `Cancelled` when declined, otherwise the API failure.
    #[instrument(skip(self, confirm))]
    pub async fn set_active(
        &self,
        id: &ProductId,
        active: bool,
        confirm: &dyn Confirm,
    ) -> Result<(), AdminError> {
        let verb = if active { "activar" } else { "inactivar" };
        confirm_or_cancel(confirm, &format!("¿Seguro que deseas {verb} este producto?"))?;
        let path = format!("{}/{verb}", item_path(Products::PATH, id.as_str()));
        self.list.action(Method::PATCH, &path).await?;
        info!(active, "Product status changed");
        Ok(())
    }

    /// Delete after confirmation.
    ///
    /// # Errors
    ///
    /// `Cancelled` when declined, otherwise the API failure.
    #[instrument(skip(self, confirm))]
    pub async fn delete(&self, id: &ProductId, confirm: &dyn Confirm) -> Result<(), AdminError> {
        confirm_or_cancel(confirm, "¿Eliminar este producto?")?;
        let path = item_path(Products::PATH, id.as_str());
        self.list.action(Method::DELETE, &path).await?;
        info!("Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, min: Option<i64>, activo: bool) -> AdminProduct {
        AdminProduct {
            id: ProductId::new("p"),
            sku: None,
            nombre: "Barra 70%".into(),
            descripcion: None,
            precio_centimos: Centimos::new(350_000),
            stock,
            stock_minimo: min,
            activo,
            categoria_id: None,
            categoria: None,
            imagen_url: None,
        }
    }

    #[test]
    fn test_low_stock_uses_default_minimum() {
        assert!(product(4, None, true).is_low_stock());
        assert!(!product(5, None, true).is_low_stock());
        assert!(product(9, Some(10), true).is_low_stock());
        assert_eq!(product(0, None, true).stock_label(), "Agotado");
    }

    #[test]
    fn test_status_filter_is_local() {
        let query = ListQuery {
            status: Some("inactivo".into()),
            ..ListQuery::default()
        };
        assert!(Products::list_pairs(&query).iter().all(|(k, _)| *k != "estado"));

        let page = Page::single(vec![product(10, None, true), product(10, None, false)]);
        let filtered = Products::post_filter(&query, page);
        assert_eq!(filtered.items.len(), 1);
        assert!(!filtered.items[0].activo);
    }

    #[test]
    fn test_input_defaults_min_stock() {
        let input = ProductInput {
            nombre: "Nibs".into(),
            stock_minimo: 0,
            ..ProductInput::default()
        };
        assert_eq!(input.validated().expect("valid").stock_minimo, 5);

        let negative = ProductInput {
            nombre: "Nibs".into(),
            stock: -1,
            ..ProductInput::default()
        };
        assert!(negative.validated().is_err());
    }
}
