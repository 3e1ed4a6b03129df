//! Errors surfaced by `tsir` commands.

use thiserror::Error;
use tsirushka_admin::AdminError;
use tsirushka_client::{ConfigError, Redirect};
use tsirushka_storefront::{AuthFlowError, CheckoutError, PageError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The command needs a saved token.
    #[error("Iniciá sesión primero: tsir login (volver a: {return_to})")]
    LoginRequired { return_to: String },

    /// Logged in without the role the command needs.
    #[error("{0}")]
    Forbidden(String),

    /// Bad arguments or input rejected before sending.
    #[error("{0}")]
    Invalid(String),

    /// Any other failure, already phrased for the user.
    #[error("{0}")]
    Failed(String),

    #[error("Error de salida: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Redirect> for CliError {
    fn from(redirect: Redirect) -> Self {
        match redirect {
            Redirect::Login { return_to } => Self::LoginRequired { return_to },
            Redirect::Landing { notice } => Self::Forbidden(notice.message),
        }
    }
}

impl From<PageError> for CliError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Redirect(redirect) => redirect.into(),
            PageError::Validation(msg) => Self::Invalid(msg),
            other => Self::Failed(other.to_string()),
        }
    }
}

impl From<AuthFlowError> for CliError {
    fn from(err: AuthFlowError) -> Self {
        Self::Failed(err.user_message())
    }
}

impl From<CheckoutError> for CliError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::NotLoggedIn(redirect) => redirect.into(),
            CheckoutError::Form(form) => Self::Invalid(form.to_string()),
            other => Self::Failed(other.to_string()),
        }
    }
}

impl From<AdminError> for CliError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Redirect(redirect) => redirect.into(),
            AdminError::Validation(msg) => Self::Invalid(msg),
            other => Self::Failed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tsirushka_client::Notice;

    use super::*;

    #[test]
    fn test_redirects_become_readable_errors() {
        let err = CliError::from(PageError::Redirect(Redirect::Login {
            return_to: "mis-pedidos".into(),
        }));
        assert!(err.to_string().contains("tsir login"));

        let err = CliError::from(AdminError::Redirect(Redirect::Landing {
            notice: Notice::error("Acceso denegado"),
        }));
        assert_eq!(err.to_string(), "Acceso denegado");
    }
}
