//! Orders as the backend returns them to customers.

use serde::{Deserialize, Serialize};

use crate::types::{Centimos, OrderId, OrderStatus};

/// One priced line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub producto_nombre: String,
    pub cantidad: u32,
    pub precio_unitario_centimos: Centimos,
    pub subtotal_centimos: Centimos,
}

/// A placed order, as seen by the customer who placed it.
///
/// Totals are the server's; nothing here is recomputed on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    pub id: OrderId,
    #[serde(default)]
    pub numero_pedido: Option<String>,
    pub estado: OrderStatus,
    /// Server timestamp, kept as sent.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub subtotal_centimos: Centimos,
    #[serde(default)]
    pub envio_centimos: Centimos,
    #[serde(default)]
    pub total_centimos: Centimos,
}

impl CustomerOrder {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.cantidad)).sum()
    }

    /// Human order number, falling back to the ID.
    #[must_use]
    pub fn display_number(&self) -> &str {
        self.numero_pedido.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

/// Tabs on the "my orders" page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderGroup {
    /// Pending, confirmed or being prepared.
    InProgress,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderGroup {
    /// Which tab an order belongs in.
    #[must_use]
    pub const fn of(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pendiente | OrderStatus::Confirmado | OrderStatus::Preparando => {
                Self::InProgress
            }
            OrderStatus::Enviado => Self::Shipped,
            OrderStatus::Entregado => Self::Delivered,
            OrderStatus::Cancelado => Self::Cancelled,
        }
    }
}

/// Customer-facing description of each status.
#[must_use]
pub const fn status_description(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pendiente => "Estamos procesando tu pedido",
        OrderStatus::Confirmado => "Tu pedido ha sido confirmado",
        OrderStatus::Preparando => "Estamos preparando tu pedido",
        OrderStatus::Enviado => "Tu pedido está en camino",
        OrderStatus::Entregado => "¡Tu pedido ha sido entregado!",
        OrderStatus::Cancelado => "Este pedido fue cancelado",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_count_items() {
        let json = r#"{
            "id": 42,
            "numeroPedido": "TS-0042",
            "estado": "ENVIADO",
            "items": [
                {"productoNombre": "Barra", "cantidad": 2, "precioUnitarioCentimos": 350000, "subtotalCentimos": 700000},
                {"productoNombre": "Nibs", "cantidad": 3, "precioUnitarioCentimos": 100000, "subtotalCentimos": 300000}
            ],
            "totalCentimos": 1000000
        }"#;
        let order: CustomerOrder = serde_json::from_str(json).expect("decode");
        assert_eq!(order.id.as_str(), "42");
        assert_eq!(order.item_count(), 5);
        assert_eq!(order.display_number(), "TS-0042");
        assert_eq!(OrderGroup::of(order.estado), OrderGroup::Shipped);
        assert_eq!(order.envio_centimos, Centimos::ZERO);
    }

    #[test]
    fn test_in_progress_group() {
        for status in [
            OrderStatus::Pendiente,
            OrderStatus::Confirmado,
            OrderStatus::Preparando,
        ] {
            assert_eq!(OrderGroup::of(status), OrderGroup::InProgress);
        }
    }
}
