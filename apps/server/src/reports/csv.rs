use super::format::{currency, ReportRow};
use crate::models::Order;

const HEADERS: [&str; 6] = [
    "Número de Pedido",
    "Cliente",
    "Fecha",
    "Total Pagado",
    "Estado",
    "Medio de Pago",
];

/// Quotes a field when it contains a separator, quote or line break.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render(orders: &[Order]) -> String {
    let mut csv = HEADERS.join(",");
    csv.push('\n');

    for row in ReportRow::rows(orders) {
        let fields = [
            field(&row.id),
            field(&row.customer),
            field(&row.date),
            field(&currency(row.total)),
            field(row.status),
            field(row.payment),
        ];
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    csv
}
