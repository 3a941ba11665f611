use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};

use super::format::{money, ReportContext, ReportRow, ReportSummary, BRAND, BRAND_RGB, REPORT_TITLE};
use super::ReportError;
use crate::models::Order;

/// Column title and width in characters.
const COLUMNS: [(&str, f64); 9] = [
    ("Número de Pedido", 15.0),
    ("Cliente", 20.0),
    ("Email", 25.0),
    ("Fecha", 12.0),
    ("Subtotal", 10.0),
    ("Envío", 10.0),
    ("Total", 10.0),
    ("Estado", 15.0),
    ("Método de Pago", 15.0),
];

/// Zero-based row of the column titles; data starts right below.
pub const HEADER_ROW: u32 = 5;

pub fn data_cells(row: &ReportRow) -> [String; 9] {
    [
        row.id.clone(),
        row.customer.clone(),
        row.email.clone(),
        row.date.clone(),
        money(row.subtotal),
        money(row.shipping),
        money(row.total),
        row.status.to_string(),
        row.payment.to_string(),
    ]
}

fn brand_color() -> Color {
    let (r, g, b) = BRAND_RGB;
    Color::RGB(u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b))
}

pub fn render(orders: &[Order], ctx: &ReportContext) -> Result<Vec<u8>, ReportError> {
    let summary = ReportSummary::from_orders(orders);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    write_sheet(worksheet, orders, ctx, &summary)?;

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(orders = orders.len(), bytes = bytes.len(), "rendered xlsx report");
    Ok(bytes)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    orders: &[Order],
    ctx: &ReportContext,
    summary: &ReportSummary,
) -> Result<(), XlsxError> {
    let title_format = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_font_color(brand_color())
        .set_align(FormatAlign::Center);
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(brand_color())
        .set_align(FormatAlign::Center);

    worksheet.set_name(REPORT_TITLE)?;

    worksheet.write_string_with_format(0, 0, format!("{BRAND} - {REPORT_TITLE}"), &title_format)?;
    worksheet.write_string(1, 0, ctx.generated_label())?;
    worksheet.write_string(2, 0, summary.count_label())?;
    worksheet.write_string(3, 0, summary.revenue_label())?;

    for (col, (title, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(HEADER_ROW, col, *title, &header_format)?;
        worksheet.set_column_width(col, *width)?;
    }

    for (index, order) in orders.iter().enumerate() {
        let row = HEADER_ROW + 1 + index as u32;
        for (col, value) in data_cells(&ReportRow::from_order(order)).into_iter().enumerate() {
            worksheet.write_string(row, col as u16, value)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, PaymentMethod};
    use chrono::NaiveDate;
    use std::io::{Cursor, Read};

    fn order() -> Order {
        Order {
            id: "1001".into(),
            user_name: "Ana".into(),
            user_email: "ana@example.com".into(),
            date: "01/06/2024".into(),
            status: OrderStatus::Rejected,
            items: Vec::new(),
            subtotal: Some(12.5),
            envio: None,
            total: Some(17.5),
            payment_method: PaymentMethod::Yape,
            rejection_reason: Some("Sin stock".into()),
        }
    }

    fn ctx() -> ReportContext {
        ReportContext::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
    }

    fn archive_entry(bytes: Vec<u8>, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn data_cells_use_bare_amounts() {
        let row = ReportRow::from_order(&order());
        assert_eq!(
            data_cells(&row),
            [
                "1001",
                "Ana",
                "ana@example.com",
                "01/06/2024",
                "12.50",
                "0.00",
                "17.50",
                "Rechazado",
                "Yape"
            ]
            .map(String::from)
        );
    }

    #[test]
    fn brand_color_is_olive() {
        assert_eq!(brand_color(), Color::RGB(0x4F5729));
    }

    #[test]
    fn empty_workbook_has_header_block() {
        let bytes = render(&[], &ctx()).unwrap();
        let strings = archive_entry(bytes, "xl/sharedStrings.xml");

        assert!(strings.contains("GRAMY - Reporte de Pedidos"));
        assert!(strings.contains("Total de pedidos: 0"));
        assert!(strings.contains("Ingresos totales: S/ 0.00"));
        assert!(strings.contains("Método de Pago"));
    }

    #[test]
    fn workbook_contains_order_rows() {
        let bytes = render(&[order()], &ctx()).unwrap();

        let workbook = archive_entry(bytes.clone(), "xl/workbook.xml");
        assert!(workbook.contains("Reporte de Pedidos"));

        let strings = archive_entry(bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("ana@example.com"));
        assert!(strings.contains("17.50"));
        assert!(strings.contains("Fecha de generación: 1/7/2024"));
    }

    fn attr(element: &str, name: &str) -> f64 {
        let start = element.find(&format!(" {name}=\"")).unwrap() + name.len() + 3;
        let end = start + element[start..].find('"').unwrap();
        element[start..end].parse().unwrap()
    }

    /// Whole-character width of every column, expanding `min..=max` ranges.
    fn column_widths(sheet: &str) -> Vec<u32> {
        sheet
            .split("<col ")
            .skip(1)
            .flat_map(|col| {
                let col = format!(" {col}");
                let (min, max) = (attr(&col, "min") as u32, attr(&col, "max") as u32);
                let width = attr(&col, "width").floor() as u32;
                (min..=max).map(move |_| width)
            })
            .collect()
    }

    #[test]
    fn sheet_layout_matches_report_columns() {
        let bytes = render(&[order()], &ctx()).unwrap();
        let sheet = archive_entry(bytes, "xl/worksheets/sheet1.xml");

        assert_eq!(
            column_widths(&sheet),
            [15, 20, 25, 12, 10, 10, 10, 15, 15]
        );
        assert!(sheet.contains("<row r=\"6\""));
        assert!(sheet.contains("<c r=\"A6\" s=\""));
        assert!(sheet.contains("<c r=\"A7\""));
        assert!(!sheet.contains("<c r=\"A8\""));
    }

    #[test]
    fn title_and_header_use_brand_styles() {
        let bytes = render(&[], &ctx()).unwrap();
        let styles = archive_entry(bytes, "xl/styles.xml");

        assert!(styles.contains("<sz val=\"16\"/>"));
        assert!(styles.contains("<b/>"));
        assert!(styles.contains("<color rgb=\"FF4F5729\"/>"));
        assert!(styles.contains("<color rgb=\"FFFFFFFF\"/>"));
        assert!(styles.contains("patternType=\"solid\""));
        assert!(styles.contains("<fgColor rgb=\"FF4F5729\"/>"));
        assert!(styles.contains("horizontal=\"center\""));
    }
}
