//! Contact form.

use reqwest::Method;
use serde::Serialize;
use tracing::{info, instrument};
use tsirushka_client::AppState;
use tsirushka_core::Email;

use crate::error::PageError;

/// Contact form as typed.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct ContactRequestBody {
    solicitante_nombre: String,
    solicitante_email: String,
    solicitante_telefono: String,
    asunto: String,
    mensaje: String,
    adjunto_url: Option<String>,
}

impl ContactForm {
    fn to_body(&self) -> Result<ContactRequestBody, PageError> {
        let required = |value: &str, field: &str| {
            let v = value.trim();
            if v.is_empty() {
                Err(PageError::Validation(format!("El campo {field} es requerido")))
            } else {
                Ok(v.to_owned())
            }
        };
        let name = required(&self.name, "nombre")?;
        let email = Email::parse(&self.email).map_err(|e| PageError::Validation(e.to_string()))?;
        let subject = required(&self.subject, "asunto")?;
        let message = required(&self.message, "mensaje")?;

        Ok(ContactRequestBody {
            solicitante_nombre: name,
            solicitante_email: email.into_inner(),
            solicitante_telefono: self.phone.trim().to_owned(),
            asunto: subject,
            mensaje: message,
            adjunto_url: None,
        })
    }
}

/// Send a contact request.
///
/// # Errors
///
/// `Validation` for a blank name, subject or message or a malformed email;
/// otherwise the API failure.
#[instrument(skip(state, form))]
pub async fn submit(state: &AppState, form: &ContactForm) -> Result<(), PageError> {
    let body = form.to_body()?;
    let body = serde_json::to_value(&body)
        .map_err(|e| PageError::Validation(e.to_string()))?;
    state
        .api()
        .send_unit(Method::POST, "/contacto/solicitudes", Some(&body), false)
        .await?;
    info!("Contact request sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: " Ana ".into(),
            email: "ana@correo.cr".into(),
            phone: String::new(),
            subject: "Pedido mayorista".into(),
            message: "Hola".into(),
        }
    }

    #[test]
    fn test_body_shape() {
        let json = serde_json::to_value(form().to_body().expect("valid")).expect("serialize");
        assert_eq!(json["solicitanteNombre"], "Ana");
        assert_eq!(json["solicitanteTelefono"], "");
        assert!(json["adjuntoUrl"].is_null());
    }

    #[test]
    fn test_required_fields() {
        let mut f = form();
        f.message = "  ".into();
        assert!(matches!(f.to_body(), Err(PageError::Validation(m)) if m.contains("mensaje")));

        let mut f = form();
        f.email = "nope".into();
        assert!(f.to_body().is_err());
    }
}
