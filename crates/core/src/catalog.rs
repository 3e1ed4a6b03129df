//! Catalog products and the storefront's client-side filtering.
//!
//! The catalog page fetches the whole product list once and then filters,
//! sorts and paginates locally, so these helpers are pure functions over a
//! slice of [`CatalogProduct`].

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Centimos, ProductId};

/// Default number of products per catalog page.
pub const CATALOG_PAGE_SIZE: usize = 12;

/// A product as listed in the public catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: ProductId,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub precio_centimos: Centimos,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub categoria_id: Option<CategoryId>,
    #[serde(default)]
    pub categoria_nombre: Option<String>,
    #[serde(default)]
    pub imagen_url: Option<String>,
}

impl CatalogProduct {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A public catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCategory {
    pub id: CategoryId,
    pub nombre: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Catalog sort orders offered in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    /// Reverse of server order, which lists oldest first.
    Newest,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nombre-asc" => Ok(Self::NameAsc),
            "nombre-desc" => Ok(Self::NameDesc),
            "precio-asc" => Ok(Self::PriceAsc),
            "precio-desc" => Ok(Self::PriceDesc),
            "nuevo" => Ok(Self::Newest),
            _ => Err(format!("invalid sort: {s}")),
        }
    }
}

/// Sidebar filter state for the catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Free-text search; sent to the server as `q`.
    pub q: Option<String>,
    pub category: Option<CategoryId>,
    pub min_price: Option<Centimos>,
    pub max_price: Option<Centimos>,
    pub in_stock_only: bool,
    pub sort: SortBy,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            q: None,
            category: None,
            min_price: None,
            max_price: None,
            in_stock_only: true,
            sort: SortBy::default(),
        }
    }
}

impl CatalogFilter {
    fn matches(&self, p: &CatalogProduct) -> bool {
        self.category
            .as_ref()
            .is_none_or(|c| p.categoria_id.as_ref() == Some(c))
            && self.min_price.is_none_or(|min| p.precio_centimos >= min)
            && self.max_price.is_none_or(|max| p.precio_centimos <= max)
            && (!self.in_stock_only || p.in_stock())
    }

    /// Filter and sort the fetched products.
    #[must_use]
    pub fn apply(&self, products: &[CatalogProduct]) -> Vec<CatalogProduct> {
        let mut out: Vec<_> = products.iter().filter(|p| self.matches(p)).cloned().collect();
        match self.sort {
            SortBy::NameAsc => out.sort_by_cached_key(|p| p.nombre.to_lowercase()),
            SortBy::NameDesc => {
                out.sort_by_cached_key(|p| p.nombre.to_lowercase());
                out.reverse();
            }
            SortBy::PriceAsc => out.sort_by_key(|p| p.precio_centimos),
            SortBy::PriceDesc => out.sort_by(|a, b| b.precio_centimos.cmp(&a.precio_centimos)),
            SortBy::Newest => out.reverse(),
        }
        out
    }
}

/// A window over the filtered catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub products: Vec<CatalogProduct>,
    /// Number of products after filtering, across all pages.
    pub matched: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Slice a filtered list into page `page` of `size` products.
#[must_use]
pub fn paginate(filtered: Vec<CatalogProduct>, page: usize, size: usize) -> CatalogPage {
    let matched = filtered.len();
    let size = size.max(1);
    let products = filtered.into_iter().skip(page.saturating_mul(size)).take(size).collect();
    CatalogPage {
        products,
        matched,
        page,
        total_pages: matched.div_ceil(size),
    }
}
