//! Storefront error types.
//!
//! Each error is scoped to the user action that produced it. Callers turn
//! them into a [`Notice`] with [`user_message`](AuthFlowError::user_message)
//! or `to_string()`; nothing here is fatal.

use thiserror::Error;
use tsirushka_client::{ApiError, Notice, Redirect, StorageError};
use tsirushka_core::checkout::CheckoutFormError;

/// Login, registration and logout failures.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// A required field was blank.
    #[error("Por favor completa todos los campos")]
    MissingFields,

    /// Password shorter than the minimum.
    #[error("La contraseña debe tener al menos {min} caracteres")]
    WeakPassword { min: usize },

    /// The server accepted the login but sent no token.
    #[error("No se recibió el token de autenticación")]
    MissingToken,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthFlowError {
    /// The message to show, with known server wording mapped to friendlier
    /// text.
    #[must_use]
    pub fn user_message(&self) -> String {
        let Self::Api(err) = self else {
            return self.to_string();
        };
        if matches!(err, ApiError::Transport(_)) {
            return "No se pudo conectar al servidor. Verifica tu conexión.".to_string();
        }

        let raw = err.to_string();
        if raw.contains("inválidos") {
            "Usuario o contraseña incorrectos".to_string()
        } else if raw.contains("bloqueado") {
            "Tu cuenta está bloqueada. Contacta al administrador.".to_string()
        } else if raw.contains("ya registrado") || raw.contains("already exists") {
            "Este email ya está registrado".to_string()
        } else if raw.contains("HTTP 500") {
            "Error del servidor. Intenta de nuevo más tarde.".to_string()
        } else {
            raw
        }
    }

    /// The failure as an error notice.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::MissingFields | Self::WeakPassword { .. } => Notice::warn(self.user_message()),
            _ => Notice::error(self.user_message()),
        }
    }
}

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Caught locally before any request.
    #[error(transparent)]
    Form(#[from] CheckoutFormError),

    /// Checkout needs a login.
    #[error("Ingresá para continuar al checkout")]
    NotLoggedIn(Redirect),

    #[error("No se pudo crear el pedido: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CheckoutError {
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Form(_) | Self::NotLoggedIn(_) => Notice::warn(self.to_string()),
            Self::Api(_) | Self::Storage(_) => Notice::error(self.to_string()),
        }
    }
}

/// Failures on the remaining pages (catalog, product, cart, orders, contact).
#[derive(Debug, Error)]
pub enum PageError {
    /// Input rejected before sending.
    #[error("{0}")]
    Validation(String),

    /// The view needs a login or a role.
    #[error("Redirect required")]
    Redirect(Redirect),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<Redirect> for PageError {
    fn from(redirect: Redirect) -> Self {
        Self::Redirect(redirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, message: &str) -> AuthFlowError {
        AuthFlowError::Api(ApiError::Http {
            status,
            message: message.into(),
        })
    }

    #[test]
    fn test_known_server_messages_are_mapped() {
        assert_eq!(
            http(401, "Usuario o contraseña inválidos").user_message(),
            "Usuario o contraseña incorrectos"
        );
        assert_eq!(
            http(403, "Usuario bloqueado").user_message(),
            "Tu cuenta está bloqueada. Contacta al administrador."
        );
        assert_eq!(
            http(409, "Email ya registrado").user_message(),
            "Este email ya está registrado"
        );
        assert_eq!(
            http(500, "HTTP 500").user_message(),
            "Error del servidor. Intenta de nuevo más tarde."
        );
    }

    #[test]
    fn test_unknown_message_passes_through() {
        assert_eq!(http(400, "Email inválido").user_message(), "Email inválido");
        assert_eq!(
            AuthFlowError::WeakPassword { min: 6 }.user_message(),
            "La contraseña debe tener al menos 6 caracteres"
        );
    }
}
