use crate::{
    errors::ApiError,
    models::{DashboardSummary, Order, OrderItem, OrderStatus, PaymentMethod, UpdateStatusRequest},
    reports::{ExportFormat, ReportSummary},
    routes::reports::ReportResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::orders::list_orders,
        crate::routes::orders::get_order,
        crate::routes::orders::update_order_status,
        crate::routes::orders::dashboard_summary,
        crate::routes::reports::list_customers,
        crate::routes::reports::generate_report,
        crate::routes::reports::export_report
    ),
    components(schemas(
        Order,
        OrderItem,
        OrderStatus,
        PaymentMethod,
        UpdateStatusRequest,
        DashboardSummary,
        ReportSummary,
        ReportResponse,
        ExportFormat,
        ApiError
    )),
    tags(
        (name = "Orders", description = "Order history and status management"),
        (name = "Reports", description = "Filtered order reports and PDF / XLSX / CSV exports")
    ),
    info(
        title = "Gramy Dashboard API",
        version = "0.1.0",
        description = "Back office API for the Gramy store dashboard.\n\n## Reports\n\n1. `GET /reports/customers` lists customers for the filter dropdown\n2. `GET /reports/orders` returns the orders matching the filters with totals\n3. `GET /reports/orders/export/{format}` downloads the same report as `pdf`, `xlsx` or `csv`"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_report_endpoints() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/reports/orders"));
        assert!(paths.contains_key("/reports/orders/export/{format}"));
        assert!(paths.contains_key("/orders/{id}/status"));
    }

    #[test]
    fn operations_take_summary_from_doc_comments() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let report = &doc["paths"]["/reports/orders"]["get"];

        assert_eq!(report["summary"], "Generate an order report");
        assert!(report["description"]
            .as_str()
            .unwrap()
            .contains("ignores the other filters"));
        assert_eq!(
            doc["paths"]["/orders/{id}/status"]["patch"]["summary"],
            "Change an order's status"
        );
    }
}
