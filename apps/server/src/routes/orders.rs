use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::errors::{ApiError, AppError, AppResult};
use crate::models::{DashboardSummary, Order, OrderStatus, UpdateStatusRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
        .route("/dashboard/summary", get(dashboard_summary))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// Status label, or `Todos` for every order
    pub status: Option<String>,
}

/// List orders
///
/// Order history, optionally restricted to one status
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "List of orders", body = Vec<Order>),
        (status = 400, description = "Unknown status", body = ApiError)
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) if value.eq_ignore_ascii_case("todos") => None,
        Some(value) => Some(
            value
                .parse::<OrderStatus>()
                .map_err(|e| AppError::bad_request(e.to_string()))?,
        ),
    };

    let mut orders = state.orders.list().await?;
    if let Some(status) = status {
        orders.retain(|order| order.status == status);
    }

    tracing::info!(status = ?status, count = orders.len(), "GET /orders");
    Ok(Json(orders))
}

/// Get an order by number
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    params(
        ("id" = String, Path, description = "Order number")
    ),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Order not found", body = ApiError)
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    Ok(Json(order))
}

/// Change an order's status
///
/// Rejections require a reason. Completed and rejected orders are closed.
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    tag = "Orders",
    params(
        ("id" = String, Path, description = "Order number")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, description = "Missing rejection reason", body = ApiError),
        (status = 404, description = "Order not found", body = ApiError),
        (status = 409, description = "Order is closed", body = ApiError)
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    payload.validate()?;

    let order = state
        .orders
        .update_status(&id, payload.status, payload.rejection_reason)
        .await?;

    tracing::info!(order_id = %id, status = %order.status, "order status changed");
    Ok(Json(order))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/dashboard/summary",
    tag = "Orders",
    responses(
        (status = 200, description = "Order and revenue totals", body = DashboardSummary)
    )
)]
pub async fn dashboard_summary(State(state): State<AppState>) -> AppResult<Json<DashboardSummary>> {
    let orders = state.orders.list().await?;
    Ok(Json(DashboardSummary::from_orders(&orders)))
}
