//! Login and role gating for protected views.
//!
//! These guards decide what the client *shows*. They read the saved token's
//! claims without verifying its signature, so they are a UX hint and not a
//! security boundary: the backend re-checks every protected request.

use tsirushka_core::Claims;

use crate::notice::Notice;
use crate::token::TokenStore;

/// Where to send the user instead of the requested view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Not logged in. Come back to `return_to` after login.
    Login { return_to: String },
    /// Logged in without the needed role.
    Landing { notice: Notice },
}

/// Allow the view only with an admin token.
///
/// # Errors
///
/// Returns `Redirect::Login` without a token and `Redirect::Landing` when
/// the token's roles lack `ADMIN`/`ROLE_ADMIN`.
pub fn require_admin(tokens: &TokenStore, return_to: &str) -> Result<Claims, Redirect> {
    if !tokens.is_logged_in() {
        return Err(Redirect::Login {
            return_to: return_to.to_owned(),
        });
    }
    match tokens.claims() {
        Some(claims) if claims.is_admin() => Ok(claims),
        _ => Err(Redirect::Landing {
            notice: Notice::error("Acceso denegado: se requieren permisos de administrador"),
        }),
    }
}

/// Allow the view with any token.
///
/// # Errors
///
/// Returns `Redirect::Login` carrying `return_to` when no token is saved.
pub fn require_session(tokens: &TokenStore, return_to: &str) -> Result<(), Redirect> {
    if tokens.is_logged_in() {
        Ok(())
    } else {
        Err(Redirect::Login {
            return_to: return_to.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use secrecy::SecretString;

    use super::*;
    use crate::storage::MemoryStorage;

    fn store_with(payload: Option<&str>) -> TokenStore {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        if let Some(payload) = payload {
            let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload));
            tokens.save(&SecretString::from(token)).expect("save");
        }
        tokens
    }

    #[test]
    fn test_no_token_goes_to_login() {
        let err = require_admin(&store_with(None), "admin").expect_err("redirect");
        assert_eq!(
            err,
            Redirect::Login {
                return_to: "admin".into()
            }
        );
    }

    #[test]
    fn test_non_admin_goes_to_landing() {
        let tokens = store_with(Some(r#"{"sub":"ana","roles":"ROLE_USER"}"#));
        assert!(matches!(
            require_admin(&tokens, "admin"),
            Err(Redirect::Landing { .. })
        ));
        assert!(require_session(&tokens, "checkout").is_ok());
    }

    #[test]
    fn test_undecodable_token_is_not_admin() {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        tokens.save(&SecretString::from("opaque")).expect("save");
        assert!(matches!(
            require_admin(&tokens, "admin"),
            Err(Redirect::Landing { .. })
        ));
    }

    #[test]
    fn test_admin_token_passes() {
        let tokens = store_with(Some(r#"{"sub":"root","roles":"ROLE_USER,ROLE_ADMIN"}"#));
        let claims = require_admin(&tokens, "admin").expect("admin");
        assert_eq!(claims.sub.as_deref(), Some("root"));
    }
}
