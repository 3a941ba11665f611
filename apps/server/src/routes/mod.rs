pub mod orders;
pub mod reports;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn router(state: AppState, allowed_origins: Vec<String>) -> Router {
    // Parse allowed origins into HeaderValue
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Router::new()
        .merge(orders::routes())
        .merge(reports::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::PATCH, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE])
                .expose_headers([header::CONTENT_DISPOSITION]),
        )
}
