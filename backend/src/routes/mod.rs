//! Route definitions for the Crop Contract Farming Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - crop season management
        .nest("/crop-seasons", crop_season_routes())
        // Protected routes - deviation reporting
        .nest("/reports/deviations", report_routes())
}

/// Crop season routes (protected)
fn crop_season_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_my_seasons))
        .route("/:season_id", get(handlers::get_season))
        .route("/:season_id/deviation", get(handlers::analyze_season))
        .route("/details/:detail_id/deviation", get(handlers::analyze_detail))
        .route("/details/:detail_id/progress", post(handlers::record_progress))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Deviation report routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::generate_report))
        .route("/me", get(handlers::my_portfolio))
        .route("/system", get(handlers::system_portfolio))
        .route("/export", get(handlers::export_report))
        .route_layer(middleware::from_fn(auth_middleware))
}
