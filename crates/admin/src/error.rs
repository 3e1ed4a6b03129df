//! Unified error handling for admin.

use thiserror::Error;
use tsirushka_client::{ApiError, Notice, Redirect};

/// Error type for admin actions.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The backend rejected the call or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The user declined the confirmation; nothing was sent.
    #[error("Acción cancelada")]
    Cancelled,

    /// Form input rejected before submission.
    #[error("{0}")]
    Validation(String),

    /// The admin views are not available with the saved token.
    #[error("Acceso no permitido")]
    Redirect(Redirect),
}

impl From<Redirect> for AdminError {
    fn from(redirect: Redirect) -> Self {
        Self::Redirect(redirect)
    }
}

impl AdminError {
    /// The notification to show for this failure, prefixed with what was
    /// being attempted.
    #[must_use]
    pub fn notice(&self, action: &str) -> Notice {
        match self {
            Self::Cancelled => Notice::info("Acción cancelada"),
            Self::Validation(msg) => Notice::warn(msg.clone()),
            Self::Redirect(Redirect::Landing { notice }) => notice.clone(),
            Self::Redirect(Redirect::Login { .. }) => {
                Notice::warn("Iniciá sesión para continuar")
            }
            Self::Api(e) => Notice::error(format!("Error al {action}: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use tsirushka_client::NoticeLevel;

    use super::*;

    #[test]
    fn test_api_error_keeps_server_message() {
        let err = AdminError::from(ApiError::Http {
            status: 409,
            message: "La categoría tiene productos".into(),
        });
        assert_eq!(err.to_string(), "La categoría tiene productos");

        let notice = err.notice("eliminar la categoría");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(
            notice.message,
            "Error al eliminar la categoría: La categoría tiene productos"
        );
    }

    #[test]
    fn test_cancelled_is_informational() {
        assert_eq!(AdminError::Cancelled.notice("x").level, NoticeLevel::Info);
    }
}
