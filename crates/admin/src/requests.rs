//! Contact requests (solicitudes) sent from the public contact form.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use tsirushka_client::{AppState, Confirm};
use tsirushka_core::{ContactRequestId, ContactRequestStatus};

use crate::error::AdminError;
use crate::list::{AdminEntity, ListController, confirm_or_cancel, item_path};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub id: ContactRequestId,
    pub solicitante_nombre: String,
    pub solicitante_email: String,
    #[serde(default)]
    pub solicitante_telefono: Option<String>,
    #[serde(default)]
    pub asunto: String,
    #[serde(default)]
    pub mensaje: String,
    #[serde(default)]
    pub estado: ContactRequestStatus,
    #[serde(default)]
    pub notas_internas: Option<String>,
    #[serde(default)]
    pub adjunto_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ContactRequestStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pendientes: u64,
    #[serde(default)]
    pub leidas: u64,
    #[serde(default)]
    pub resueltas: u64,
}

/// Path segment that moves a request to `status`.
#[must_use]
pub const fn mark_segment(status: ContactRequestStatus) -> &'static str {
    match status {
        ContactRequestStatus::Pendiente => "marcar-pendiente",
        ContactRequestStatus::Leida => "marcar-leida",
        ContactRequestStatus::Resuelta => "marcar-resuelta",
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotesBody<'a> {
    notas_internas: &'a str,
}

pub struct ContactRequests;

impl AdminEntity for ContactRequests {
    type Row = ContactRequest;
    type Stats = ContactRequestStats;
    const LABEL: &'static str = "contact_request";
    const PATH: &'static str = "/admin/solicitudes";
}

#[derive(Debug)]
pub struct ContactRequestsAdmin {
    list: ListController<ContactRequests>,
}

impl ContactRequestsAdmin {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            list: ListController::new(state),
        }
    }

    #[must_use]
    pub const fn list(&self) -> &ListController<ContactRequests> {
        &self.list
    }

    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn detail(&self, id: &ContactRequestId) -> Result<ContactRequest, AdminError> {
        let path = item_path(ContactRequests::PATH, id.as_str());
        Ok(self.list.app().api().get_json(&path, true).await?)
    }

    /// # Errors
    ///
    /// Returns the API failure.
    #[instrument(skip(self, notes))]
    pub async fn save_notes(&self, id: &ContactRequestId, notes: &str) -> Result<(), AdminError> {
        let path = format!("{}/notas", item_path(ContactRequests::PATH, id.as_str()));
        let body = NotesBody {
            notas_internas: notes.trim(),
        };
        self.list.action_with(Method::PATCH, &path, &body).await?;
        info!("Contact request notes saved");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the API failure.
    #[instrument(skip(self))]
    pub async fn mark(
        &self,
        id: &ContactRequestId,
        status: ContactRequestStatus,
    ) -> Result<(), AdminError> {
        let path = format!(
            "{}/{}",
            item_path(ContactRequests::PATH, id.as_str()),
            mark_segment(status)
        );
        self.list.action(Method::PATCH, &path).await?;
        info!(%status, "Contact request marked");
        Ok(())
    }

    /// Delete after confirmation.
    ///
    /// # Errors
    ///
    /// `Cancelled` when declined, otherwise the API failure.
    #[instrument(skip(self, confirm))]
    pub async fn delete(
        &self,
        id: &ContactRequestId,
        confirm: &dyn Confirm,
    ) -> Result<(), AdminError> {
        confirm_or_cancel(confirm, "¿Eliminar esta solicitud?")?;
        let path = item_path(ContactRequests::PATH, id.as_str());
        self.list.action(Method::DELETE, &path).await?;
        info!("Contact request deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_parses() {
        let row: ContactRequest = serde_json::from_str(
            r#"{"id":12,"solicitanteNombre":"Luis","solicitanteEmail":"luis@correo.cr",
                "asunto":"Mayoreo","mensaje":"Hola","estado":"LEIDA","adjuntoUrl":null}"#,
        )
        .expect("parse");
        assert_eq!(row.estado, ContactRequestStatus::Leida);
        assert_eq!(row.adjunto_url, None);
    }

    #[test]
    fn test_mark_segments() {
        assert_eq!(mark_segment(ContactRequestStatus::Resuelta), "marcar-resuelta");
        assert_eq!(mark_segment(ContactRequestStatus::Pendiente), "marcar-pendiente");
    }
}
