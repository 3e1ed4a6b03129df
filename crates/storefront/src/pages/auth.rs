//! Login, registration and logout.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use tsirushka_client::AppState;
use tsirushka_core::Claims;

use crate::error::AuthFlowError;

/// Shortest password the registration form accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    nombre_completo: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Drives the login and registration forms.
#[derive(Debug, Clone)]
pub struct AuthController {
    state: AppState,
}

impl AuthController {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Log in and save the token.
    ///
    /// Returns the token's (unverified) claims, or default claims when the
    /// token is opaque.
    ///
    /// # Errors
    ///
    /// `MissingFields` for a blank email or password, `MissingToken` when the
    /// reply has no `accessToken`, otherwise the API or storage failure.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Claims, AuthFlowError> {
        let email = email.trim();
        if email.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthFlowError::MissingFields);
        }

        let reply: LoginResponse = self
            .state
            .api()
            .send_json(
                Method::POST,
                "/auth/login",
                &LoginRequest {
                    email,
                    password: password.expose_secret(),
                },
                false,
            )
            .await?;

        let token = reply
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthFlowError::MissingToken)?;
        let claims = Claims::decode(&token).unwrap_or_default();
        self.state.tokens().save(&SecretString::from(token))?;

        info!(admin = claims.is_admin(), "Logged in");
        Ok(claims)
    }

    /// Create an account, then log in with it.
    ///
    /// # Errors
    ///
    /// `MissingFields` for any blank field, `WeakPassword` under
    /// [`MIN_PASSWORD_LEN`] characters, otherwise as for
    /// [`login`](Self::login).
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Claims, AuthFlowError> {
        let full_name = full_name.trim();
        let email = email.trim();
        let secret = password.expose_secret();
        if full_name.is_empty() || email.is_empty() || secret.is_empty() {
            return Err(AuthFlowError::MissingFields);
        }
        if secret.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthFlowError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        let body = serde_json::to_value(RegisterRequest {
            nombre_completo: full_name,
            email,
            password: secret,
        })
        .map_err(|e| tsirushka_client::ApiError::Decode(e.to_string()))?;
        self.state
            .api()
            .send_unit(Method::POST, "/auth/register", Some(&body), false)
            .await?;
        info!("Account created");

        self.login(email, password).await
    }

    /// Forget the saved token.
    ///
    /// # Errors
    ///
    /// Returns the storage failure if the token cannot be removed.
    pub fn logout(&self) -> Result<(), AuthFlowError> {
        self.state.tokens().clear()?;
        info!("Logged out");
        Ok(())
    }
}
