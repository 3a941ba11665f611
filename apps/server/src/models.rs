use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::reports::format::revenue;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum OrderStatus {
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "En preparación")]
    Preparing,
    #[serde(rename = "Listo para envío")]
    ReadyForShipment,
    #[serde(rename = "Completado")]
    Completed,
    #[serde(rename = "Rechazado")]
    Rejected,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::ReadyForShipment,
        OrderStatus::Completed,
        OrderStatus::Rejected,
    ];

    /// Label shown to store staff and written into exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Preparing => "En preparación",
            OrderStatus::ReadyForShipment => "Listo para envío",
            OrderStatus::Completed => "Completado",
            OrderStatus::Rejected => "Rechazado",
        }
    }

    /// Completed and rejected orders are closed.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    /// Accepts the Spanish label or the English variant name, ignoring case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| {
                status.as_str().eq_ignore_ascii_case(value)
                    || format!("{status:?}").eq_ignore_ascii_case(value)
            })
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Yape,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Tarjeta",
            PaymentMethod::Yape => "Yape",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OrderItem {
    #[schema(example = "Granola artesanal 500g")]
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Order as kept by the storefront. Monetary fields may be missing on
/// legacy records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[schema(example = "1001")]
    pub id: String,
    #[schema(example = "Ana Torres")]
    pub user_name: String,
    #[schema(example = "ana@example.com")]
    pub user_email: String,
    #[schema(example = "01/06/2024")]
    pub date: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Order {
    /// Calendar date of the order, `None` when the stored string is not a
    /// valid day/month/year date.
    pub fn order_date(&self) -> Option<NaiveDate> {
        parse_order_date(&self.date)
    }

    /// Moves the order to `status`. Rejections need a reason; closed orders
    /// stay closed.
    pub fn change_status(
        &mut self,
        status: OrderStatus,
        rejection_reason: Option<String>,
    ) -> Result<(), StatusChangeError> {
        if self.status.is_final() && self.status != status {
            return Err(StatusChangeError::Closed(self.status));
        }

        let reason = rejection_reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty());

        if status == OrderStatus::Rejected {
            let reason = reason.ok_or(StatusChangeError::MissingRejectionReason)?;
            self.rejection_reason = Some(reason);
        } else {
            self.rejection_reason = None;
        }
        self.status = status;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusChangeError {
    #[error("order is already {0}")]
    Closed(OrderStatus),
    #[error("a rejection reason is required")]
    MissingRejectionReason,
}

/// Parses `d/m/yyyy` with or without leading zeros.
pub fn parse_order_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.trim().split('/');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    #[validate(length(max = 500, message = "rejection reason is too long"))]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub pending_orders: usize,
    pub total_revenue: f64,
}

impl DashboardSummary {
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            total_orders: orders.len(),
            pending_orders: orders
                .iter()
                .filter(|order| order.status == OrderStatus::Pending)
                .count(),
            total_revenue: revenue(orders),
        }
    }
}
