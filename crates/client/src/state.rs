//! Shared services handed to every controller.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart_store::CartStore;
use crate::config::ClientConfig;
use crate::storage::{FileStorage, Storage};
use crate::token::TokenStore;

/// Configuration plus the token store, API client and cart store.
///
/// Cheaply cloneable via `Arc`. Controllers borrow it; none of them keep
/// state of their own beyond the view they manage.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: ClientConfig,
    api: ApiClient,
    cart: CartStore,
}

impl AppState {
    /// Build the services over `storage`.
    #[must_use]
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> Self {
        let tokens = TokenStore::new(storage.clone());
        let api = ApiClient::new(&config.api_base_url, tokens);
        let cart = CartStore::open(storage);
        Self {
            inner: Arc::new(AppStateInner { config, api, cart }),
        }
    }

    /// Build the services persisting to `config.data_dir`.
    #[must_use]
    pub fn with_file_storage(config: ClientConfig) -> Self {
        let storage = Arc::new(FileStorage::new(config.data_dir.clone()));
        Self::new(config, storage)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        self.inner.api.tokens()
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }
}
