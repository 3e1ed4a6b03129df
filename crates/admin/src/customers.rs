//! Customer management: edit, block/unblock, order history.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use tsirushka_client::{AppState, Confirm};
use tsirushka_core::{Centimos, CustomerId, CustomerStatus, Page};

use crate::error::AdminError;
use crate::list::{AdminEntity, ListController, confirm_or_cancel, item_path};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCustomer {
    pub id: CustomerId,
    pub nombre_completo: String,
    pub email: String,
    #[serde(default)]
    pub email_verificado: bool,
    #[serde(default)]
    pub estado: CustomerStatus,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub cantidad_pedidos: u64,
}

impl AdminCustomer {
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.estado == CustomerStatus::Bloqueado
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct CustomerStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub activos: u64,
    #[serde(default)]
    pub bloqueados: u64,
    #[serde(default)]
    pub verificados: u64,
}

/// One row of a customer's order history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerOrderRow {
    pub numero: String,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub total: Centimos,
    pub estado: String,
}

/// Edit form. Name and email are the only identity fields; the email
/// itself is not editable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub nombre_completo: String,
    pub telefono: Option<String>,
}

/// Block or unblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAction {
    Block,
    Unblock,
}

impl BlockAction {
    const fn segment(self) -> &'static str {
        match self {
            Self::Block => "bloquear",
            Self::Unblock => "desbloquear",
        }
    }

    /// The action that flips `status`.
    #[must_use]
    pub const fn toggling(status: CustomerStatus) -> Self {
        match status {
            CustomerStatus::Activo => Self::Block,
            CustomerStatus::Bloqueado => Self::Unblock,
        }
    }
}

pub struct Customers;

impl AdminEntity for Customers {
    type Row = AdminCustomer;
    type Stats = CustomerStats;
    const LABEL: &'static str = "customer";
    const PATH: &'static str = "/admin/clientes";
}

#[derive(Debug)]
pub struct CustomersAdmin {
    list: ListController<Customers>,
}

impl CustomersAdmin {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            list: ListController::new(state),
        }
    }

    #[must_use]
    pub const fn list(&self) -> &ListController<Customers> {
        &self.list
    }

    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn get(&self, id: &CustomerId) -> Result<AdminCustomer, AdminError> {
        let path = item_path(Customers::PATH, id.as_str());
        Ok(self.list.app().api().get_json(&path, true).await?)
    }

    /// # Errors
    ///
    /// `Validation` for a blank name, otherwise the API failure.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: &CustomerId, update: &CustomerUpdate) -> Result<(), AdminError> {
        let nombre_completo = update.nombre_completo.trim();
        if nombre_completo.is_empty() {
            return Err(AdminError::Validation("El nombre es requerido".into()));
        }
        let body = CustomerUpdate {
            nombre_completo: nombre_completo.to_owned(),
            telefono: update
                .telefono
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned),
        };
        let path = item_path(Customers::PATH, id.as_str());
        self.list.action_with(Method::PUT, &path, &body).await?;
        info!("Customer updated");
        Ok(())
    }

    /// Block or unblock after confirmation.
    ///
    /// # Errors
    ///
    /// `Cancelled` when declined, otherwise the API failure.
    #[instrument(skip(self, confirm))]
    pub async fn set_blocked(
        &self,
        id: &CustomerId,
        action: BlockAction,
        confirm: &dyn Confirm,
    ) -> Result<(), AdminError> {
        let verb = action.segment();
        confirm_or_cancel(confirm, &format!("¿Seguro que deseas {verb} este cliente?"))?;
        let path = format!("{}/{verb}", item_path(Customers::PATH, id.as_str()));
        self.list.action(Method::PATCH, &path).await?;
        info!(action = verb, "Customer status changed");
        Ok(())
    }

    /// The customer's orders.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn orders(&self, id: &CustomerId) -> Result<Page<CustomerOrderRow>, AdminError> {
        let path = format!("{}/pedidos", item_path(Customers::PATH, id.as_str()));
        Ok(self.list.app().api().get_json(&path, true).await?)
    }
}
