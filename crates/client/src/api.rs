//! JSON REST client for the Tsirushka backend.
//!
//! Every call is a single request: no retries, no timeout, no caching. A
//! failure is returned to the caller, which shows it to the user.
//!
//! # Error messages
//!
//! For a non-success status the message is taken, in order, from:
//!
//! 1. a JSON body's `message` field, then its `error` field, then the compact
//!    JSON text itself
//! 2. a non-JSON body's raw text
//! 3. `HTTP <status>`
//!
//! [`ApiError::Http`] displays exactly that message.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::token::TokenStore;

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never got an answer (DNS, refused connection, reset).
    #[error("No se pudo conectar con el servidor: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Respuesta inesperada del servidor: {0}")]
    Decode(String),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status, for `Http` errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials (401 or 403).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// HTTP 204.
    Empty,
    /// A body served as `application/json`.
    Json(Value),
    /// Any other body.
    Text(String),
}

impl ApiResponse {
    /// Deserialize a JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body is not JSON or does not match
    /// `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Self::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
            }
            Self::Empty => Err(ApiError::Decode("empty response body".to_string())),
            Self::Text(text) => serde_json::from_str(&text)
                .map_err(|e| ApiError::Decode(format!("expected JSON: {e}"))),
        }
    }
}

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Extra headers, sent as-is.
    pub headers: HeaderMap,
    /// JSON body. Sets `Content-Type: application/json` when present.
    pub body: Option<Value>,
    /// Attach `Authorization: Bearer <token>` when a token is saved.
    pub requires_auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            requires_auth: false,
        }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Send with the saved bearer token.
    #[must_use]
    pub const fn auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?);
        Ok(self)
    }
}

/// Backend API client.
///
/// Cheap to clone; clones share the connection pool and token store.
#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

#[derive(Debug)]
struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a client for `base_url`. A trailing `/` is ignored.
    #[must_use]
    pub fn new(base_url: &str, tokens: TokenStore) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_owned(),
                tokens,
            }),
        }
    }

    /// The token store this client authenticates with.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Issue one request to `{base}{path}`.
    ///
    /// A missing token on an authenticated request is not an error here; the
    /// server rejects the call and that rejection is surfaced.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` for non-success statuses and
    /// `ApiError::Transport` when the server cannot be reached.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{path}", self.inner.base_url);
        let url = reqwest::Url::parse(&url).map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))?;

        let mut request = self
            .inner
            .http
            .request(options.method.clone(), url)
            .headers(options.headers);

        if options.requires_auth {
            if let Some(token) = self.inner.tokens.get() {
                request = request.bearer_auth(token.expose_secret());
            }
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed to reach server");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), "Response received");
        let is_json = is_json_content(response.headers());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, is_json, &body);
            debug!(status = status.as_u16(), %message, "API error");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse::Empty);
        }

        let text = response.text().await.map_err(ApiError::Transport)?;
        if is_json {
            serde_json::from_str(&text)
                .map(ApiResponse::Json)
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Ok(ApiResponse::Text(text))
        }
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also `ApiError::Decode` on a shape mismatch.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, auth: bool) -> Result<T, ApiError> {
        let mut options = RequestOptions::new(Method::GET);
        options.requires_auth = auth;
        self.request(path, options).await?.into_json()
    }

    /// Send a JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also `ApiError::Decode` on a shape mismatch.
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: bool,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut options = RequestOptions::new(method).json(body)?;
        options.requires_auth = auth;
        self.request(path, options).await?.into_json()
    }

    /// Send a request whose reply body is ignored.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn send_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        auth: bool,
    ) -> Result<(), ApiError> {
        let options = RequestOptions {
            method,
            body: body.cloned(),
            requires_auth: auth,
            ..RequestOptions::default()
        };
        self.request(path, options).await.map(|_| ())
    }
}

fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

/// Pick the most useful message out of an error response.
fn error_message(status: StatusCode, is_json: bool, body: &str) -> String {
    let fallback = || format!("HTTP {}", status.as_u16());

    if is_json {
        return match serde_json::from_str::<Value>(body) {
            Ok(value) => ["message", "error"]
                .iter()
                .find_map(|key| scalar_message(value.get(key)?))
                .unwrap_or_else(|| value.to_string()),
            Err(_) => fallback(),
        };
    }

    let text = body.trim();
    if text.is_empty() {
        fallback()
    } else {
        text.to_owned()
    }
}

/// A usable message field: a non-empty string, a non-zero number, or `true`.
fn scalar_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}

/// Build `path?k=v&...`, skipping absent and blank values.
#[must_use]
pub fn with_query<'a, I>(path: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<String>)>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            serializer.append_pair(key, v.trim());
            any = true;
        }
    }
    if any {
        format!("{path}?{}", serializer.finish())
    } else {
        path.to_owned()
    }
}
