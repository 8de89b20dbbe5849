//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Reference-date and geography listings
        .route("/weeks", get(handlers::get_weeks))
        .route("/geo-ids", get(handlers::get_geo_ids))
        // Hierarchy band breaks
        .route("/departments", get(handlers::get_departments))
        .route("/categories", get(handlers::get_categories))
        .route("/location-summary", get(handlers::get_location_summary))
        // SKU endpoints
        .route("/skus", get(handlers::get_skus))
        .route("/sku-list", get(handlers::get_sku_list))
        .route("/sku-info", get(handlers::get_sku_info))
        // Chart endpoints
        .route("/chart/location", get(handlers::get_chart_location))
        .route("/chart/department", get(handlers::get_chart_department))
        .route("/chart/category", get(handlers::get_chart_category))
        .route("/chart/sku", get(handlers::get_chart_sku))
        // Full-view query and export
        .route("/views/forecasts", get(handlers::get_forecast_names))
        .route("/views/months", get(handlers::get_forecast_months))
        .route("/views/query", post(handlers::query_full_view))
        .route("/views/export", get(handlers::export_full_view));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
