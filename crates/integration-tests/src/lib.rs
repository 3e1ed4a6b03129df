//! End-to-end tests for the Tsirushka client crates.
//!
//! Each test starts a [`wiremock`] server standing in for the backend and
//! an [`AppState`] that persists to a temporary directory, so token and cart
//! survive a "restart" exactly as they would on disk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tsirushka-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_flow` - Login, cart, checkout, my orders
//! - `admin_console` - Role gate, dashboard and list actions

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use tsirushka_client::{AppState, ClientConfig};
use wiremock::MockServer;

/// A mock backend plus a client state pointed at it.
pub struct TestShop {
    pub server: MockServer,
    pub state: AppState,
    dir: TempDir,
}

impl TestShop {
    /// Start a mock server and a file-backed state in a fresh temp dir.
    ///
    /// # Panics
    ///
    /// Panics if the temp dir cannot be created.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        #[allow(clippy::expect_used)]
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = state_for(&server, &dir);
        Self { server, state, dir }
    }

    /// A second state over the same data dir, as after restarting the app.
    #[must_use]
    pub fn reopen(&self) -> AppState {
        state_for(&self.server, &self.dir)
    }

    /// Save a token carrying `roles` as if a login had happened.
    ///
    /// # Panics
    ///
    /// Panics if the token cannot be written.
    pub fn log_in_as(&self, sub: &str, roles: &str) {
        #[allow(clippy::expect_used)]
        self.state
            .tokens()
            .save(&SecretString::from(token(&json!({"sub": sub, "roles": roles}))))
            .expect("Failed to save token");
    }
}

fn state_for(server: &MockServer, dir: &TempDir) -> AppState {
    AppState::with_file_storage(ClientConfig::new(server.uri(), dir.path().to_path_buf()))
}

/// An unsigned JWT-shaped token with `claims` as payload.
#[must_use]
pub fn token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.firma")
}

/// A catalog product as `GET /catalogo/productos/{id}` returns it.
#[must_use]
pub fn catalog_product(id: u32, nombre: &str, precio_centimos: u64, stock: i64) -> Value {
    json!({
        "id": id,
        "nombre": nombre,
        "precioCentimos": precio_centimos,
        "stock": stock,
        "categoriaId": 1,
        "categoriaNombre": "Barras",
    })
}

/// A `{items, total, page, size}` envelope.
#[must_use]
pub fn page(items: Vec<Value>, total: u64, page: u32, size: u32) -> Value {
    json!({"items": items, "total": total, "page": page, "size": size})
}

#[cfg(test)]
mod tests {
    use tsirushka_core::Claims;

    use super::*;

    #[test]
    fn test_token_decodes_to_claims() {
        let claims = Claims::decode(&token(&json!({"sub": "ana", "roles": "ROLE_ADMIN"})));
        assert!(claims.is_some_and(|c| c.is_admin()));
    }
}
