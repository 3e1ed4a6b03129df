//! Email addresses entered in storefront forms.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons a form email was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Nothing was entered (after trimming).
    #[error("el email es requerido")]
    Empty,
    /// Longer than the RFC 5321 limit.
    #[error("el email no puede superar {max} caracteres")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Not of the form `local@domain`.
    #[error("el email no es válido")]
    Malformed,
}

/// A trimmed email address with a `local@domain` shape.
///
/// Only the shape is checked here. Whether the account exists, or the
/// address is deliverable, is the backend's business.
///
/// ```
/// use tsirushka_core::Email;
///
/// let email = Email::parse("  ana@tsirushka.cr ").unwrap();
/// assert_eq!(email.as_str(), "ana@tsirushka.cr");
/// assert!(Email::parse("ana@").is_err());
/// assert!(Email::parse("ana @x.cr").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Trim and validate a form value.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the trimmed value is empty, too long, has
    /// whitespace inside it, or is not exactly one non-empty local part and
    /// one non-empty domain around a single `@`.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let email = Email::parse("\tcliente@correo.cr\n").expect("valid");
        assert_eq!(email.as_str(), "cliente@correo.cr");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for bad in ["sin-arroba", "@correo.cr", "ana@", "a@b@c", "ana maria@correo.cr"] {
            assert_eq!(Email::parse(bad), Err(EmailError::Malformed), "{bad}");
        }
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = format!("{}@correo.cr", "a".repeat(250));
        assert!(matches!(Email::parse(&long), Err(EmailError::TooLong { .. })));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email: Email = "ana@tsirushka.cr".parse().expect("valid");
        let json = serde_json::to_string(&email).expect("serialize");
        assert_eq!(json, r#""ana@tsirushka.cr""#);
    }
}
