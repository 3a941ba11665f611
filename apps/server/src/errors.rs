use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError, Json,
};
use serde::Serialize;
use thiserror::Error;
use tower::timeout::error::Elapsed;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::db::{StatusUpdateError, StoreError};
use crate::models::StatusChangeError;
use crate::reports::{filter::FilterError, ReportError};

/// API error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

/// Application errors - fail fast with clear messages
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        AppError::NotFound(resource)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<StatusUpdateError> for AppError {
    fn from(err: StatusUpdateError) -> Self {
        match err {
            StatusUpdateError::NotFound => AppError::not_found("Order"),
            StatusUpdateError::Rejected(e @ StatusChangeError::Closed(_)) => {
                AppError::conflict(e.to_string())
            }
            StatusUpdateError::Rejected(e @ StatusChangeError::MissingRejectionReason) => {
                AppError::bad_request(e.to_string())
            }
            StatusUpdateError::Contended(_) => AppError::conflict(err.to_string()),
            StatusUpdateError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", error.code),
                })
            })
            .collect();
        messages.sort();
        AppError::BadRequest(messages.join(", "))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", resource),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::Store(err) => {
                tracing::error!("Order store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Order store operation failed".to_string(),
                )
            }
            AppError::Report(err) => {
                tracing::error!("Report export error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "Report export failed".to_string(),
                )
            }
        };

        (status, Json(ApiError { code, message })).into_response()
    }
}

pub async fn handle_global_error(error: BoxError) -> impl IntoResponse {
    if error.is::<Elapsed>() {
        tracing::error!("request timed out: {error}");
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ApiError {
                code: "TIMEOUT",
                message: "request timed out".into(),
            }),
        )
    } else {
        tracing::error!("unhandled internal error: {error}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                code: "INTERNAL",
                message: "internal server error".into(),
            }),
        )
    }
}

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;
