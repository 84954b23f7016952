use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use restmeta_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the API router with CORS and request tracing.
pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let allowed_origin = frontend_url.parse::<HeaderValue>().map_err(|error| {
        AppError::Configuration(format!("invalid FRONTEND_URL '{frontend_url}': {error}"))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .route(
            "/api/resources/{resource}/filtering-data",
            get(handlers::filters::filtering_data_handler),
        )
        .route(
            "/api/resources/{resource}/records",
            get(handlers::records::list_records_handler),
        )
        .route(
            "/api/resources/{resource}/forms/{form}",
            get(handlers::forms::form_schema_handler),
        )
        .route(
            "/api/resources/{resource}/records/{id}/forms/{form}",
            get(handlers::forms::record_form_schema_handler),
        )
        .route(
            "/api/resources/{resource}/autocomplete",
            get(handlers::lookups::autocomplete_handler),
        )
        .route(
            "/api/resources/{resource}/lookup",
            post(handlers::lookups::object_lookup_handler),
        )
        .route(
            "/api/resources/{resource}/overview",
            get(handlers::overview::overview_handler),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
