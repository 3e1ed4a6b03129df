//! Status enums for various entities.
//!
//! Wire values are the uppercase Spanish identifiers the backend uses.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pendiente,
    Confirmado,
    Preparando,
    Enviado,
    Entregado,
    Cancelado,
}

impl OrderStatus {
    /// Human-readable label shown to customers and admins.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::Confirmado => "Confirmado",
            Self::Preparando => "En preparación",
            Self::Enviado => "Enviado",
            Self::Entregado => "Entregado",
            Self::Cancelado => "Cancelado",
        }
    }

    /// Wire value, e.g. `PENDIENTE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "PENDIENTE",
            Self::Confirmado => "CONFIRMADO",
            Self::Preparando => "PREPARANDO",
            Self::Enviado => "ENVIADO",
            Self::Entregado => "ENTREGADO",
            Self::Cancelado => "CANCELADO",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDIENTE" => Ok(Self::Pendiente),
            "CONFIRMADO" => Ok(Self::Confirmado),
            "PREPARANDO" => Ok(Self::Preparando),
            "ENVIADO" => Ok(Self::Enviado),
            "ENTREGADO" => Ok(Self::Entregado),
            "CANCELADO" => Ok(Self::Cancelado),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Customer account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    #[default]
    Activo,
    Bloqueado,
}

impl CustomerStatus {
    /// Wire value, e.g. `ACTIVO`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activo => "ACTIVO",
            Self::Bloqueado => "BLOQUEADO",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVO" => Ok(Self::Activo),
            "BLOQUEADO" => Ok(Self::Bloqueado),
            _ => Err(format!("invalid customer status: {s}")),
        }
    }
}

/// Contact request (solicitud) status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactRequestStatus {
    #[default]
    Pendiente,
    Leida,
    Resuelta,
}

impl ContactRequestStatus {
    /// Wire value, e.g. `LEIDA`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "PENDIENTE",
            Self::Leida => "LEIDA",
            Self::Resuelta => "RESUELTA",
        }
    }
}

impl std::fmt::Display for ContactRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContactRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDIENTE" => Ok(Self::Pendiente),
            "LEIDA" => Ok(Self::Leida),
            "RESUELTA" => Ok(Self::Resuelta),
            _ => Err(format!("invalid contact request status: {s}")),
        }
    }
}

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMode {
    /// Shipped to an address (`ENVIO`).
    #[default]
    Envio,
    /// Picked up at the store (`RETIRO`).
    Retiro,
}

impl std::str::FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENVIO" | "SHIP" => Ok(Self::Envio),
            "RETIRO" | "PICKUP" => Ok(Self::Retiro),
            _ => Err(format!("invalid delivery mode: {s}")),
        }
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Card payment (`TARJETA`).
    Tarjeta,
    /// SINPE Móvil bank transfer (`SINPE`).
    Sinpe,
}

impl PaymentMethod {
    /// Wire value, e.g. `SINPE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tarjeta => "TARJETA",
            Self::Sinpe => "SINPE",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
