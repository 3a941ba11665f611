use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::{ApiError, AppResult};
use crate::models::Order;
use crate::reports::{
    export::{self, ExportFormat},
    filter::{run_report, unique_customers},
    ReportQuery, ReportSummary,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/customers", get(list_customers))
        .route("/reports/orders", get(generate_report))
        .route("/reports/orders/export/:format", get(export_report))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub orders: Vec<Order>,
    pub summary: ReportSummary,
}

async fn matching_orders(state: &AppState, query: ReportQuery) -> AppResult<Vec<Order>> {
    query.validate()?;
    let request = query.into_request()?;
    let orders = state.orders.list().await?;
    Ok(run_report(&orders, &request))
}

/// Customers available as report filter
#[utoipa::path(
    get,
    path = "/reports/customers",
    tag = "Reports",
    responses(
        (status = 200, description = "Distinct customer names", body = Vec<String>)
    )
)]
pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let orders = state.orders.list().await?;
    Ok(Json(unique_customers(&orders)))
}

/// Generate an order report
///
/// Filters orders by date range, status, customer and product. A non-empty
/// `orderId` returns only that order and ignores the other filters.
#[utoipa::path(
    get,
    path = "/reports/orders",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Matching orders and totals", body = ReportResponse),
        (status = 400, description = "Malformed filter", body = ApiError)
    )
)]
pub async fn generate_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ReportResponse>> {
    let orders = matching_orders(&state, query).await?;
    let summary = ReportSummary::from_orders(&orders);

    tracing::info!(
        orders = summary.total_orders,
        revenue = summary.total_revenue,
        "report generated"
    );
    Ok(Json(ReportResponse { orders, summary }))
}

/// Download an order report
///
/// Renders the filtered orders as PDF, XLSX or CSV. The file is also kept in
/// the reports directory.
#[utoipa::path(
    get,
    path = "/reports/orders/export/{format}",
    tag = "Reports",
    params(
        ("format" = ExportFormat, Path, description = "pdf, xlsx or csv"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Report file", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed filter", body = ApiError)
    )
)]
pub async fn export_report(
    State(state): State<AppState>,
    Path(format): Path<ExportFormat>,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let orders = matching_orders(&state, query).await?;
    let artifact = export::export(format, &orders, &state.report_context())?;

    if let Err(e) = export::persist(&state.reports.output_dir, &artifact).await {
        tracing::warn!(file = %artifact.file_name, "could not save report copy: {}", e);
    }

    tracing::info!(
        format = artifact.format.extension(),
        orders = orders.len(),
        file = %artifact.file_name,
        "report exported"
    );

    let headers = [
        (header::CONTENT_TYPE, artifact.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];
    Ok((headers, artifact.bytes))
}
