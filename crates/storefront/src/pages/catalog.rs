//! Catalog page: categories sidebar, filters and the product grid.
//!
//! Products are fetched once per search term. Category, price and stock
//! filters, sorting and pagination all run locally over that list.

use tracing::{debug, instrument};
use tsirushka_client::AppState;
use tsirushka_client::api::with_query;
use tsirushka_core::catalog::{CatalogCategory, CatalogFilter, CatalogPage, CatalogProduct, SortBy, paginate};
use tsirushka_core::{CategoryId, Centimos, Page, ProductId};

use crate::error::PageError;

/// How many products one catalog fetch asks for.
const FETCH_SIZE: u32 = 1000;

/// Catalog page state.
#[derive(Debug)]
pub struct CatalogController {
    state: AppState,
    categories: Vec<CatalogCategory>,
    products: Vec<CatalogProduct>,
    filter: CatalogFilter,
    page: usize,
}

impl CatalogController {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            categories: Vec::new(),
            products: Vec::new(),
            filter: CatalogFilter::default(),
            page: 0,
        }
    }

    /// Fetch the category list for the sidebar.
    ///
    /// # Errors
    ///
    /// Returns the API failure; the grid still works without categories.
    #[instrument(skip(self))]
    pub async fn load_categories(&mut self) -> Result<&[CatalogCategory], PageError> {
        self.categories = self
            .state
            .api()
            .get_json("/catalogo/categorias", false)
            .await?;
        Ok(&self.categories)
    }

    /// Fetch products matching the current search term.
    ///
    /// # Errors
    ///
    /// Returns the API failure and leaves the previous list in place.
    #[instrument(skip(self), fields(q = ?self.filter.q))]
    pub async fn load_products(&mut self) -> Result<CatalogPage, PageError> {
        let path = with_query(
            "/catalogo/productos",
            [
                ("page", Some("0".to_string())),
                ("size", Some(FETCH_SIZE.to_string())),
                ("q", self.filter.q.clone()),
            ],
        );
        let page: Page<CatalogProduct> = self.state.api().get_json(&path, false).await?;
        debug!(fetched = page.items.len(), "Catalog loaded");
        self.products = page.items;
        Ok(self.view())
    }

    /// The visible window after filtering, sorting and paginating.
    #[must_use]
    pub fn view(&self) -> CatalogPage {
        let filtered = self.filter.apply(&self.products);
        paginate(filtered, self.page, self.state.config().catalog_page_size)
    }

    #[must_use]
    pub fn categories(&self) -> &[CatalogCategory] {
        &self.categories
    }

    #[must_use]
    pub const fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    /// Change the search term and refetch.
    ///
    /// # Errors
    ///
    /// As for [`load_products`](Self::load_products).
    pub async fn search(&mut self, q: Option<String>) -> Result<CatalogPage, PageError> {
        self.filter.q = q.filter(|q| !q.trim().is_empty());
        self.page = 0;
        self.load_products().await
    }

    pub fn set_category(&mut self, category: Option<CategoryId>) {
        self.filter.category = category;
        self.page = 0;
    }

    pub fn set_price_range(&mut self, min: Option<Centimos>, max: Option<Centimos>) {
        self.filter.min_price = min;
        self.filter.max_price = max;
        self.page = 0;
    }

    pub fn set_in_stock_only(&mut self, in_stock_only: bool) {
        self.filter.in_stock_only = in_stock_only;
        self.page = 0;
    }

    pub fn set_sort(&mut self, sort: SortBy) {
        self.filter.sort = sort;
        self.page = 0;
    }

    /// Reset every filter except the search term.
    pub fn clear_filters(&mut self) {
        self.filter = CatalogFilter {
            q: self.filter.q.take(),
            ..CatalogFilter::default()
        };
        self.page = 0;
    }

    /// Move to the next page if there is one.
    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.view().total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous page if there is one.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Add one unit of a listed product to the cart.
    ///
    /// # Errors
    ///
    /// `Validation` if the product is not in the fetched list or is out of
    /// stock; `Storage` if the cart cannot be saved.
    pub fn add_to_cart(&self, product_id: &ProductId) -> Result<(), PageError> {
        let product = self
            .products
            .iter()
            .find(|p| &p.id == product_id)
            .ok_or_else(|| PageError::Validation("Producto no encontrado".to_string()))?;
        if !product.in_stock() {
            return Err(PageError::Validation("Producto agotado".to_string()));
        }
        self.state
            .cart()
            .add(product.id.clone(), product.nombre.clone(), product.precio_centimos)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use serde_json::json;
    use tsirushka_client::{ClientConfig, MemoryStorage};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn controller(server: &MockServer) -> CatalogController {
        let config = ClientConfig::new(server.uri(), PathBuf::from("/nonexistent"));
        CatalogController::new(AppState::new(config, Arc::new(MemoryStorage::new())))
    }

    async fn mount_products(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/catalogo/productos"))
            .and(query_param("q", "cacao"))
            .and(query_param("size", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": 1, "nombre": "Polvo de cacao", "precioCentimos": 90_000, "stock": 4, "categoriaId": 2},
                    {"id": 2, "nombre": "Barra de cacao", "precioCentimos": 350_000, "stock": 0, "categoriaId": 1},
                    {"id": 3, "nombre": "Nibs de cacao", "precioCentimos": 150_000, "stock": 9, "categoriaId": 1},
                ],
                "total": 3,
                "page": 0,
                "size": 1000,
            })))
            .mount(server)
            .await;
    }

    fn names(page: &CatalogPage) -> Vec<&str> {
        page.products.iter().map(|p| p.nombre.as_str()).collect()
    }

    #[tokio::test]
    async fn test_search_fetches_then_filters_locally() {
        let server = MockServer::start().await;
        mount_products(&server).await;
        let mut catalog = controller(&server);

        let page = catalog.search(Some("cacao".into())).await.expect("catalog");
        assert_eq!(names(&page), ["Nibs de cacao", "Polvo de cacao"]);
        assert_eq!(page.matched, 2);

        catalog.set_category(Some(CategoryId::new("1")));
        catalog.set_in_stock_only(false);
        catalog.set_sort(SortBy::PriceDesc);
        assert_eq!(names(&catalog.view()), ["Barra de cacao", "Nibs de cacao"]);

        catalog.clear_filters();
        assert_eq!(catalog.filter().q.as_deref(), Some("cacao"));
        assert_eq!(catalog.view().matched, 2);
    }

    #[tokio::test]
    async fn test_out_of_stock_product_is_not_added() {
        let server = MockServer::start().await;
        mount_products(&server).await;
        let mut catalog = controller(&server);
        catalog.search(Some("cacao".into())).await.expect("catalog");

        let err = catalog.add_to_cart(&ProductId::new("2")).expect_err("sold out");
        assert_eq!(err.to_string(), "Producto agotado");

        catalog.add_to_cart(&ProductId::new("3")).expect("add");
        assert_eq!(catalog.state.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_list() {
        let server = MockServer::start().await;
        mount_products(&server).await;
        Mock::given(method("GET"))
            .and(path("/catalogo/productos"))
            .and(query_param("q", "trufas"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "caído"})))
            .mount(&server)
            .await;
        let mut catalog = controller(&server);
        catalog.search(Some("cacao".into())).await.expect("catalog");

        let err = catalog.search(Some("trufas".into())).await.expect_err("server down");
        assert_eq!(err.to_string(), "caído");
        assert_eq!(catalog.view().matched, 2);
    }
}
