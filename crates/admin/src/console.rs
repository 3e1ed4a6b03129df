//! Entry point for the admin views.

use tracing::info;
use tsirushka_client::{AppState, require_admin};
use tsirushka_core::Claims;

use crate::categories::CategoriesAdmin;
use crate::customers::CustomersAdmin;
use crate::dashboard::{self, Dashboard};
use crate::error::AdminError;
use crate::orders::OrdersAdmin;
use crate::products::ProductsAdmin;
use crate::requests::ContactRequestsAdmin;

/// Login return path for the admin views.
pub const ADMIN_PATH: &str = "admin";

/// The admin console, available once the role gate passes.
///
/// The gate reads unverified token claims. It hides the console from
/// non-admins; the backend still rejects their requests on its own.
#[derive(Debug, Clone)]
pub struct AdminConsole {
    state: AppState,
    claims: Claims,
}

impl AdminConsole {
    /// # Errors
    ///
    /// `Redirect` to login without a token, or to the landing page with a
    /// notice when the token is not an admin's.
    pub fn open(state: AppState) -> Result<Self, AdminError> {
        let claims = require_admin(state.tokens(), ADMIN_PATH)?;
        info!(sub = claims.sub.as_deref().unwrap_or("-"), "Admin console opened");
        Ok(Self { state, claims })
    }

    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    pub async fn dashboard(&self) -> Dashboard {
        dashboard::load(&self.state).await
    }

    #[must_use]
    pub fn categories(&self) -> CategoriesAdmin {
        CategoriesAdmin::new(self.state.clone())
    }

    #[must_use]
    pub fn customers(&self) -> CustomersAdmin {
        CustomersAdmin::new(self.state.clone())
    }

    #[must_use]
    pub fn products(&self) -> ProductsAdmin {
        ProductsAdmin::new(self.state.clone())
    }

    #[must_use]
    pub fn orders(&self) -> OrdersAdmin {
        OrdersAdmin::new(self.state.clone())
    }

    #[must_use]
    pub fn requests(&self) -> ContactRequestsAdmin {
        ContactRequestsAdmin::new(self.state.clone())
    }
}
