//! Order management: detail, internal notes, status transitions.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use tsirushka_client::{AppState, Confirm};
use tsirushka_core::orders::OrderLine;
use tsirushka_core::{Centimos, DeliveryMode, OrderId, OrderStatus};

use crate::error::AdminError;
use crate::list::{AdminEntity, ListController, confirm_or_cancel, item_path};

/// An order row, and the detail view when `items` is filled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    pub id: OrderId,
    #[serde(default)]
    pub numero_pedido: Option<String>,
    #[serde(default)]
    pub estado: OrderStatus,
    #[serde(default)]
    pub cliente_nombre: Option<String>,
    #[serde(default)]
    pub cliente_email: Option<String>,
    #[serde(default)]
    pub cliente_telefono: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub modo_entrega: Option<DeliveryMode>,
    #[serde(default)]
    pub direccion: Option<serde_json::Value>,
    #[serde(default)]
    pub pago: Option<serde_json::Value>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub subtotal_centimos: Centimos,
    #[serde(default)]
    pub envio_centimos: Centimos,
    #[serde(default)]
    pub total_centimos: Centimos,
    #[serde(default)]
    pub notas_internas: Option<String>,
}

impl AdminOrder {
    /// `#numeroPedido`, or the id when the order has no number yet.
    #[must_use]
    pub fn display_number(&self) -> String {
        self.numero_pedido
            .as_deref()
            .map_or_else(|| format!("#{}", self.id), |n| format!("#{n}"))
    }

    /// Transitions offered from the current status.
    #[must_use]
    pub fn available_transitions(&self) -> Vec<OrderTransition> {
        OrderTransition::ALL
            .into_iter()
            .filter(|t| t.allowed_from(self.estado))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pendientes: u64,
    #[serde(default)]
    pub confirmados: u64,
    #[serde(default)]
    pub preparando: u64,
    #[serde(default)]
    pub enviados: u64,
    #[serde(default)]
    pub entregados: u64,
    #[serde(default)]
    pub cancelados: u64,
    #[serde(default)]
    pub ventas_totales_centimos: Centimos,
}

impl OrderStats {
    /// Confirmed, preparing and shipped.
    #[must_use]
    pub const fn in_progress(&self) -> u64 {
        self.confirmados
            .saturating_add(self.preparando)
            .saturating_add(self.enviados)
    }
}

/// A status change an admin can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTransition {
    Confirm,
    Prepare,
    Ship,
    Deliver,
    Cancel,
}

impl OrderTransition {
    pub const ALL: [Self; 5] = [
        Self::Confirm,
        Self::Prepare,
        Self::Ship,
        Self::Deliver,
        Self::Cancel,
    ];

    /// Path segment, e.g. `confirmar`.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Confirm => "confirmar",
            Self::Prepare => "preparar",
            Self::Ship => "enviar",
            Self::Deliver => "entregar",
            Self::Cancel => "cancelar",
        }
    }

    /// The status this transition leads to.
    #[must_use]
    pub const fn target(self) -> OrderStatus {
        match self {
            Self::Confirm => OrderStatus::Confirmado,
            Self::Prepare => OrderStatus::Preparando,
            Self::Ship => OrderStatus::Enviado,
            Self::Deliver => OrderStatus::Entregado,
            Self::Cancel => OrderStatus::Cancelado,
        }
    }

    /// Whether the button is shown for an order in `status`. The server
    /// has the final say.
    #[must_use]
    pub const fn allowed_from(self, status: OrderStatus) -> bool {
        use OrderStatus as S;
        match self {
            Self::Confirm => matches!(status, S::Pendiente),
            Self::Prepare => matches!(status, S::Confirmado),
            Self::Ship => matches!(status, S::Preparando),
            Self::Deliver => matches!(status, S::Enviado),
            Self::Cancel => !matches!(status, S::Entregado | S::Cancelado),
        }
    }
}

impl std::str::FromStr for OrderTransition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.segment() == s.trim())
            .ok_or_else(|| format!("invalid order action: {s}"))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotesBody<'a> {
    notas_internas: &'a str,
}

pub struct Orders;

impl AdminEntity for Orders {
    type Row = AdminOrder;
    type Stats = OrderStats;
    const LABEL: &'static str = "order";
    const PATH: &'static str = "/admin/pedidos";
}

#[derive(Debug)]
pub struct OrdersAdmin {
    list: ListController<Orders>,
}

impl OrdersAdmin {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            list: ListController::new(state),
        }
    }

    #[must_use]
    pub const fn list(&self) -> &ListController<Orders> {
        &self.list
    }

    /// Full order with lines, address and payment.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn detail(&self, id: &OrderId) -> Result<AdminOrder, AdminError> {
        let path = item_path(Orders::PATH, id.as_str());
        Ok(self.list.app().api().get_json(&path, true).await?)
    }

    /// Save the internal notes. Blank clears them.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    #[instrument(skip(self, notes))]
    pub async fn save_notes(&self, id: &OrderId, notes: &str) -> Result<(), AdminError> {
        let path = format!("{}/notas", item_path(Orders::PATH, id.as_str()));
        let body = NotesBody {
            notas_internas: notes.trim(),
        };
        self.list.action_with(Method::PATCH, &path, &body).await?;
        info!("Order notes saved");
        Ok(())
    }

    /// Apply a status transition. Cancelling asks first; the others go
    /// straight through.
    ///
    /// # Errors
    ///
    /// `Cancelled` when a cancellation is declined, otherwise the API
    /// failure.
    #[instrument(skip(self, confirm))]
    pub async fn transition(
        &self,
        id: &OrderId,
        transition: OrderTransition,
        confirm: &dyn Confirm,
    ) -> Result<(), AdminError> {
        if transition == OrderTransition::Cancel {
            confirm_or_cancel(confirm, "¿Seguro que deseas cancelar este pedido?")?;
        }
        let path = format!("{}/{}", item_path(Orders::PATH, id.as_str()), transition.segment());
        self.list.action(Method::PATCH, &path).await?;
        info!(to = %transition.target(), "Order status changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_progress_saturates_on_huge_counts() {
        let stats = OrderStats {
            confirmados: u64::MAX,
            preparando: 5,
            enviados: 1,
            ..OrderStats::default()
        };
        assert_eq!(stats.in_progress(), u64::MAX);
    }

    #[test]
    fn test_in_progress_sums_three_states() {
        let stats: OrderStats = serde_json::from_str(
            r#"{"total":10,"pendientes":2,"confirmados":1,"preparando":2,"enviados":3,"ventasTotalesCentimos":1250000}"#,
        )
        .expect("parse");
        assert_eq!(stats.in_progress(), 6);
        assert_eq!(stats.entregados, 0);
        assert_eq!(stats.ventas_totales_centimos, Centimos::new(1_250_000));
    }

    #[test]
    fn test_transitions_follow_lifecycle() {
        assert!(OrderTransition::Confirm.allowed_from(OrderStatus::Pendiente));
        assert!(!OrderTransition::Ship.allowed_from(OrderStatus::Pendiente));
        assert!(!OrderTransition::Cancel.allowed_from(OrderStatus::Entregado));
        assert_eq!("enviar".parse::<OrderTransition>(), Ok(OrderTransition::Ship));
        assert!("volar".parse::<OrderTransition>().is_err());
    }

    #[test]
    fn test_detail_parses_lines() {
        let order: AdminOrder = serde_json::from_str(
            r#"{"id":7,"numeroPedido":"TS-0007","estado":"PREPARANDO","modoEntrega":"RETIRO",
                "items":[{"productoNombre":"Barra","cantidad":2,"precioUnitarioCentimos":500,"subtotalCentimos":1000}],
                "totalCentimos":1000}"#,
        )
        .expect("parse");
        assert_eq!(order.display_number(), "#TS-0007");
        assert_eq!(order.items.len(), 1);
        assert_eq!(
            order.available_transitions(),
            vec![OrderTransition::Ship, OrderTransition::Cancel]
        );
    }
}
