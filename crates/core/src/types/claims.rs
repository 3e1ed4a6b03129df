//! Unverified bearer-token claims used for UI gating.
//!
//! The token's signature is **not** checked here and cannot be, since the
//! signing key lives on the server. Claims decoded by this module only decide
//! what to *show* (an "Admin" link, a redirect to login). They are not a
//! security boundary: every protected endpoint re-checks the token server-side.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Role names that grant access to the admin console UI.
const ADMIN_ROLES: &[&str] = &["ADMIN", "ROLE_ADMIN"];

/// Subject and roles read from a JWT payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Token subject, usually the account email.
    #[serde(default)]
    pub sub: Option<String>,
    /// Comma-separated role list, e.g. `"ROLE_USER,ROLE_ADMIN"`.
    #[serde(default)]
    pub roles: Option<String>,
}

impl Claims {
    /// Decode the payload segment of a JWT without verifying it.
    ///
    /// Only the second dot-separated segment is read; whatever follows it
    /// is ignored. Returns `None` if there is no second segment or it is not
    /// base64url-encoded JSON.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        let payload = token.trim().split('.').nth(1)?;

        // Tolerate padded payloads from non-conforming issuers.
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Iterate over normalized (trimmed, uppercased) role names.
    pub fn role_names(&self) -> impl Iterator<Item = String> + '_ {
        self.roles
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|r| r.trim().to_ascii_uppercase())
            .filter(|r| !r.is_empty())
    }

    /// Whether the roles claim contains `ADMIN` or `ROLE_ADMIN`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role_names()
            .any(|role| ADMIN_ROLES.contains(&role.as_str()))
    }
}
