//! Category management.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use tsirushka_client::{AppState, Confirm};
use tsirushka_core::CategoryId;

use crate::error::AdminError;
use crate::list::{AdminEntity, ListController, confirm_or_cancel, item_path};

/// A category row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCategory {
    pub id: CategoryId,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub cantidad_productos: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct CategoryStats {
    #[serde(default)]
    pub total: u64,
}

/// Create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CategoryInput {
    pub nombre: String,
    pub descripcion: Option<String>,
}

impl CategoryInput {
    fn validated(&self) -> Result<Self, AdminError> {
        let nombre = self.nombre.trim();
        if nombre.is_empty() {
            return Err(AdminError::Validation("El nombre es requerido".into()));
        }
        Ok(Self {
            nombre: nombre.to_owned(),
            descripcion: self
                .descripcion
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
        })
    }
}

pub struct Categories;

impl AdminEntity for Categories {
    type Row = AdminCategory;
    type Stats = CategoryStats;
    const LABEL: &'static str = "category";
    const PATH: &'static str = "/admin/categorias";
    const PAGINATED: bool = false;
}

/// The categories view.
#[derive(Debug)]
pub struct CategoriesAdmin {
    list: ListController<Categories>,
}

impl CategoriesAdmin {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            list: ListController::new(state),
        }
    }

    #[must_use]
    pub const fn list(&self) -> &ListController<Categories> {
        &self.list
    }

    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn get(&self, id: &CategoryId) -> Result<AdminCategory, AdminError> {
        let path = item_path(Categories::PATH, id.as_str());
        Ok(self.list.app().api().get_json(&path, true).await?)
    }

    /// # Errors
    ///
    /// `Validation` for a blank name, otherwise the API failure.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &CategoryInput) -> Result<(), AdminError> {
        let body = input.validated()?;
        self.list
            .action_with(Method::POST, Categories::PATH, &body)
            .await?;
        info!(nombre = %body.nombre, "Category created");
        Ok(())
    }

    /// # Errors
    ///
    /// `Validation` for a blank name, otherwise the API failure.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &CategoryId, input: &CategoryInput) -> Result<(), AdminError> {
        let body = input.validated()?;
        let path = item_path(Categories::PATH, id.as_str());
        self.list.action_with(Method::PUT, &path, &body).await?;
        info!("Category updated");
        Ok(())
    }

    /// Delete after confirmation.
    ///
    /// # Errors
    ///
    /// `Cancelled` when declined, otherwise the API failure.
    #[instrument(skip(self, confirm))]
    pub async fn delete(&self, id: &CategoryId, confirm: &dyn Confirm) -> Result<(), AdminError> {
        confirm_or_cancel(confirm, "¿Eliminar esta categoría?")?;
        let path = item_path(Categories::PATH, id.as_str());
        self.list.action(Method::DELETE, &path).await?;
        info!("Category deleted");
        Ok(())
    }
}
