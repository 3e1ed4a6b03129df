//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TSIR_API_BASE_URL` - Base URL of the backend REST API
//!
//! ## Optional
//! - `TSIR_DATA_DIR` - Where the token and cart are persisted
//!   (default: `<platform data dir>/tsirushka`)
//! - `TSIR_SINPE_NUMBER` - SINPE Móvil number shown for transfers
//!   (default: `+506 8630-4400`)
//! - `TSIR_ADMIN_PAGE_SIZE` - Rows per admin list page (default: 10)
//! - `TSIR_CATALOG_PAGE_SIZE` - Products per catalog page (default: 12)

use std::path::PathBuf;

use thiserror::Error;
use tsirushka_core::ListQuery;
use tsirushka_core::catalog::CATALOG_PAGE_SIZE;
use tsirushka_core::checkout::DEFAULT_SINPE_NUMBER;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_base_url: String,
    /// Directory for persisted client state.
    pub data_dir: PathBuf,
    /// Store SINPE Móvil destination number.
    pub sinpe_number: String,
    /// Rows per admin list page.
    pub admin_page_size: u32,
    /// Products per catalog page.
    pub catalog_page_size: usize,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or not a URL, or if a
    /// page size is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_required_env("TSIR_API_BASE_URL")?)?;
        let data_dir = get_optional_env("TSIR_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let sinpe_number = get_env_or_default("TSIR_SINPE_NUMBER", DEFAULT_SINPE_NUMBER);
        let admin_page_size = parse_page_size(
            "TSIR_ADMIN_PAGE_SIZE",
            &get_env_or_default("TSIR_ADMIN_PAGE_SIZE", &ListQuery::DEFAULT_SIZE.to_string()),
        )?;
        let catalog_page_size = parse_page_size(
            "TSIR_CATALOG_PAGE_SIZE",
            &get_env_or_default("TSIR_CATALOG_PAGE_SIZE", &CATALOG_PAGE_SIZE.to_string()),
        )?;

        Ok(Self {
            api_base_url,
            data_dir,
            sinpe_number,
            admin_page_size,
            catalog_page_size: catalog_page_size as usize,
        })
    }

    /// Configuration pointing at `base_url` with every other setting at its
    /// default. Used by tests and embedding callers.
    #[must_use]
    pub fn new(base_url: impl Into<String>, data_dir: PathBuf) -> Self {
        let base: String = base_url.into();
        Self {
            api_base_url: base.trim_end_matches('/').to_owned(),
            data_dir,
            sinpe_number: DEFAULT_SINPE_NUMBER.to_owned(),
            admin_page_size: ListQuery::DEFAULT_SIZE,
            catalog_page_size: CATALOG_PAGE_SIZE,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tsirushka")
}

/// Validate the base URL and strip any trailing slash so paths join cleanly.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    Url::parse(trimmed).map_err(|e| {
        ConfigError::InvalidEnvVar("TSIR_API_BASE_URL".to_string(), e.to_string())
    })?;
    Ok(trimmed.trim_end_matches('/').to_owned())
}

fn parse_page_size(key: &str, raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(
            parse_base_url("https://api.tsirushka.cr/api/").expect("valid"),
            "https://api.tsirushka.cr/api"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let err = parse_base_url("not a url").expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "TSIR_API_BASE_URL"));
    }

    #[test]
    fn test_page_size_must_be_positive() {
        assert_eq!(parse_page_size("X", "25").expect("valid"), 25);
        assert!(parse_page_size("X", "0").is_err());
        assert!(parse_page_size("X", "ten").is_err());
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("http://localhost:8080/", PathBuf::from("/tmp/x"));
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.sinpe_number, "+506 8630-4400");
        assert_eq!(config.admin_page_size, 10);
        assert_eq!(config.catalog_page_size, 12);
    }
}
