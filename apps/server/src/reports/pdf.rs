//! Paginated A4 order report.
//!
//! Layout is computed up front so the page count is known before the
//! "Página X de Y" footers are drawn. Coordinates below are measured in
//! millimetres from the top of the page and flipped when handed to printpdf.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};

use super::format::{
    currency, ReportContext, ReportRow, ReportSummary, ALT_ROW_RGB, BRAND, BRAND_RGB,
    FOOTER_RGB, REPORT_TITLE,
};
use super::ReportError;
use crate::models::Order;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_X: f32 = 14.0;
const TABLE_TOP: f32 = 58.0;
const TABLE_BOTTOM_MARGIN: f32 = 20.0;
const FOOTER_OFFSET: f32 = 10.0;
const HEADER_ROW_HEIGHT: f32 = 8.0;
const BODY_ROW_HEIGHT: f32 = 7.0;
const CELL_PADDING: f32 = 1.5;

const HEADER_FONT_SIZE: f32 = 9.0;
const BODY_FONT_SIZE: f32 = 8.0;
const FOOTER_FONT_SIZE: f32 = 8.0;

/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

const COLUMNS: [(&str, f32); 8] = [
    ("N° Pedido", 20.0),
    ("Cliente", 38.0),
    ("Fecha", 20.0),
    ("Subtotal", 21.0),
    ("Envío", 19.0),
    ("Total", 21.0),
    ("Estado", 24.0),
    ("Pago", 19.0),
];

/// Body rows that fit under the header row on one page.
pub const ROWS_PER_PAGE: usize =
    ((PAGE_HEIGHT - TABLE_TOP - TABLE_BOTTOM_MARGIN - HEADER_ROW_HEIGHT) / BODY_ROW_HEIGHT)
        as usize;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Splits rows into pages. Always yields at least one page so an empty
/// report still renders its header block and table head.
pub fn paginate(rows: &[ReportRow]) -> Vec<&[ReportRow]> {
    if rows.is_empty() {
        return vec![&rows[..0]];
    }
    rows.chunks(ROWS_PER_PAGE).collect()
}

/// Table cells for one row, in column order.
pub fn table_cells(row: &ReportRow) -> [String; 8] {
    [
        row.id.clone(),
        row.customer.clone(),
        row.date.clone(),
        currency(row.subtotal),
        currency(row.shipping),
        currency(row.total),
        row.status.to_string(),
        row.payment.to_string(),
    ]
}

pub fn footer_label(page: usize, pages: usize) -> String {
    format!("Página {page} de {pages}")
}

pub fn render(orders: &[Order], ctx: &ReportContext) -> Result<Vec<u8>, ReportError> {
    let rows = ReportRow::rows(orders);
    let summary = ReportSummary::from_orders(orders);
    let pages = paginate(&rows);
    let page_count = pages.len();

    let (doc, first_page, first_layer) = PdfDocument::new(
        format!("{BRAND} - {REPORT_TITLE}"),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
    };

    let mut first = Some(doc.get_page(first_page).get_layer(first_layer));
    for (index, page_rows) in pages.iter().enumerate() {
        let layer = match first.take() {
            Some(layer) => layer,
            None => {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                doc.get_page(page).get_layer(layer)
            }
        };

        if index == 0 {
            draw_heading(&layer, &fonts, ctx, &summary);
        }
        draw_table(&layer, &fonts, page_rows);
        draw_footer(&layer, &fonts, index + 1, page_count);
    }

    tracing::debug!(
        orders = orders.len(),
        pages = page_count,
        "rendered pdf report"
    );

    doc.save_to_bytes()
        .map_err(|e| ReportError::Pdf(e.to_string()))
}

fn draw_heading(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    ctx: &ReportContext,
    summary: &ReportSummary,
) {
    layer.set_fill_color(rgb(BRAND_RGB));
    text(layer, BRAND, 20.0, MARGIN_X, 20.0, &fonts.bold);
    text(layer, REPORT_TITLE, 16.0, MARGIN_X, 30.0, &fonts.regular);

    layer.set_fill_color(rgb((0, 0, 0)));
    text(layer, &ctx.generated_label(), 10.0, MARGIN_X, 38.0, &fonts.regular);
    text(layer, &summary.count_label(), 10.0, MARGIN_X, 44.0, &fonts.regular);
    text(layer, &summary.revenue_label(), 10.0, MARGIN_X, 50.0, &fonts.regular);
}

fn draw_table(layer: &PdfLayerReference, fonts: &Fonts, rows: &[ReportRow]) {
    let table_width: f32 = COLUMNS.iter().map(|(_, width)| width).sum();
    let table_height = HEADER_ROW_HEIGHT + BODY_ROW_HEIGHT * rows.len() as f32;

    layer.set_fill_color(rgb(BRAND_RGB));
    fill(layer, MARGIN_X, TABLE_TOP, table_width, HEADER_ROW_HEIGHT);
    layer.set_fill_color(rgb((0xFF, 0xFF, 0xFF)));
    let headers = COLUMNS.map(|(title, _)| title.to_string());
    draw_cells(layer, &fonts.bold, HEADER_FONT_SIZE, TABLE_TOP, HEADER_ROW_HEIGHT, &headers);

    for (index, row) in rows.iter().enumerate() {
        let top = TABLE_TOP + HEADER_ROW_HEIGHT + BODY_ROW_HEIGHT * index as f32;
        if index % 2 == 1 {
            layer.set_fill_color(rgb(ALT_ROW_RGB));
            fill(layer, MARGIN_X, top, table_width, BODY_ROW_HEIGHT);
        }
        layer.set_fill_color(rgb((0, 0, 0)));
        draw_cells(
            layer,
            &fonts.regular,
            BODY_FONT_SIZE,
            top,
            BODY_ROW_HEIGHT,
            &table_cells(row),
        );
    }

    // grid
    layer.set_outline_color(rgb((0xC8, 0xC8, 0xC8)));
    layer.set_outline_thickness(0.3);
    let mut y = TABLE_TOP;
    rule(layer, MARGIN_X, y, MARGIN_X + table_width, y);
    y += HEADER_ROW_HEIGHT;
    for _ in 0..=rows.len() {
        rule(layer, MARGIN_X, y, MARGIN_X + table_width, y);
        y += BODY_ROW_HEIGHT;
    }
    let mut x = MARGIN_X;
    rule(layer, x, TABLE_TOP, x, TABLE_TOP + table_height);
    for (_, width) in COLUMNS {
        x += width;
        rule(layer, x, TABLE_TOP, x, TABLE_TOP + table_height);
    }
}

fn draw_cells(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    size: f32,
    top: f32,
    height: f32,
    cells: &[String; 8],
) {
    let baseline = top + height / 2.0 + size * PT_TO_MM / 3.0;
    let mut x = MARGIN_X;
    for ((_, width), cell) in COLUMNS.iter().zip(cells) {
        let fitted = fit(cell, width - 2.0 * CELL_PADDING, size);
        text(layer, &fitted, size, x + CELL_PADDING, baseline, font);
        x += width;
    }
}

fn draw_footer(layer: &PdfLayerReference, fonts: &Fonts, page: usize, pages: usize) {
    let label = footer_label(page, pages);
    let x = (PAGE_WIDTH - text_width(&label, FOOTER_FONT_SIZE)) / 2.0;
    layer.set_fill_color(rgb(FOOTER_RGB));
    text(
        layer,
        &label,
        FOOTER_FONT_SIZE,
        x,
        PAGE_HEIGHT - FOOTER_OFFSET,
        &fonts.regular,
    );
}

fn text_width(value: &str, size: f32) -> f32 {
    value.chars().count() as f32 * size * GLYPH_WIDTH_EM * PT_TO_MM
}

/// Truncates `value` so it fits in `width` millimetres.
fn fit(value: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * GLYPH_WIDTH_EM * PT_TO_MM)) as usize;
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn text(layer: &PdfLayerReference, value: &str, size: f32, x: f32, top: f32, font: &IndirectFontRef) {
    layer.use_text(value, size, Mm(x), Mm(PAGE_HEIGHT - top), font);
}

fn fill(layer: &PdfLayerReference, x: f32, top: f32, width: f32, height: f32) {
    layer.add_rect(Rect::new(
        Mm(x),
        Mm(PAGE_HEIGHT - top - height),
        Mm(x + width),
        Mm(PAGE_HEIGHT - top),
    ));
}

fn rule(layer: &PdfLayerReference, x1: f32, top1: f32, x2: f32, top2: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(PAGE_HEIGHT - top1)), false),
            (Point::new(Mm(x2), Mm(PAGE_HEIGHT - top2)), false),
        ],
        is_closed: false,
    });
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}
