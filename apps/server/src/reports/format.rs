use chrono::{FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Order;

pub const BRAND: &str = "GRAMY";
pub const REPORT_TITLE: &str = "Reporte de Pedidos";
pub const CURRENCY_PREFIX: &str = "S/";
pub const FILE_STEM: &str = "reporte_pedidos";

/// Brand olive, `#4F5729`.
pub const BRAND_RGB: (u8, u8, u8) = (0x4F, 0x57, 0x29);
/// Alternate table row tint, `#EDE4CC`.
pub const ALT_ROW_RGB: (u8, u8, u8) = (0xED, 0xE4, 0xCC);
/// Footer brown, `#6D4C41`.
pub const FOOTER_RGB: (u8, u8, u8) = (0x6D, 0x4C, 0x41);

/// Missing or non-finite amounts count as zero.
pub fn amount(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0)
}

/// Bare two-decimal amount: `12.50`.
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Amount with currency prefix: `S/ 12.50`.
pub fn currency(value: f64) -> String {
    format!("{CURRENCY_PREFIX} {value:.2}")
}

/// Peruvian short date, `d/m/yyyy` without padding.
pub fn localized_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Per-request values shared by every exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportContext {
    pub generated_on: NaiveDate,
}

impl ReportContext {
    pub fn new(generated_on: NaiveDate) -> Self {
        Self { generated_on }
    }

    /// Today as seen from the store's timezone.
    pub fn now(offset: FixedOffset) -> Self {
        Self::new(Utc::now().with_timezone(&offset).date_naive())
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "{FILE_STEM}_{}.{extension}",
            self.generated_on.format("%Y-%m-%d")
        )
    }

    pub fn generated_label(&self) -> String {
        format!("Fecha de generación: {}", localized_date(self.generated_on))
    }
}

/// Sum of order totals. Folds from `0.0` because an empty `f64` sum is `-0.0`.
pub fn revenue(orders: &[Order]) -> f64 {
    orders
        .iter()
        .fold(0.0, |total, order| total + amount(order.total))
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_orders: usize,
    pub total_revenue: f64,
}

impl ReportSummary {
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            total_orders: orders.len(),
            total_revenue: revenue(orders),
        }
    }

    pub fn count_label(&self) -> String {
        format!("Total de pedidos: {}", self.total_orders)
    }

    pub fn revenue_label(&self) -> String {
        format!("Ingresos totales: {}", currency(self.total_revenue))
    }
}

/// One order flattened into display values.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: String,
    pub customer: String,
    pub email: String,
    pub date: String,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
    pub status: &'static str,
    pub payment: &'static str,
}

impl ReportRow {
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            customer: order.user_name.clone(),
            email: order.user_email.clone(),
            date: order.date.clone(),
            subtotal: amount(order.subtotal),
            shipping: amount(order.envio),
            total: amount(order.total),
            status: order.status.as_str(),
            payment: order.payment_method.label(),
        }
    }

    pub fn rows(orders: &[Order]) -> Vec<ReportRow> {
        orders.iter().map(ReportRow::from_order).collect()
    }
}
