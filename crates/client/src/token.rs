//! Bearer token persistence.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;
use tsirushka_core::Claims;

use crate::storage::{Storage, StorageError};

/// Storage key the token lives under.
pub const TOKEN_KEY: &str = "tsir.jwt";

/// Reads and writes the login token.
///
/// The token is opaque to the client apart from the best-effort
/// [`Claims`] decode used to decide which links and views to show.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The saved token, if any.
    ///
    /// An unreadable store is treated as logged out.
    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        match self.storage.get(TOKEN_KEY) {
            Ok(value) => value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "Could not read token; treating as logged out");
                None
            }
        }
    }

    /// Whether a token is saved.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.get().is_some()
    }

    /// Save a new token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be persisted.
    pub fn save(&self, token: &SecretString) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, token.expose_secret())
    }

    /// Forget the token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)
    }

    /// Unverified claims of the saved token.
    #[must_use]
    pub fn claims(&self) -> Option<Claims> {
        self.get().and_then(|t| Claims::decode(t.expose_secret()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_save_get_clear() {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        assert!(!tokens.is_logged_in());

        tokens.save(&SecretString::from("abc.def.ghi")).expect("save");
        assert_eq!(
            tokens.get().map(|t| t.expose_secret().to_owned()).as_deref(),
            Some("abc.def.ghi")
        );

        tokens.clear().expect("clear");
        assert!(tokens.get().is_none());
    }

    #[test]
    fn test_blank_token_is_logged_out() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "  ").expect("set");
        assert!(!TokenStore::new(storage).is_logged_in());
    }

    #[test]
    fn test_debug_does_not_leak() {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        tokens.save(&SecretString::from("secret-token")).expect("save");
        assert!(!format!("{tokens:?}").contains("secret-token"));
    }
}
