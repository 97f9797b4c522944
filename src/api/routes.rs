//! HTTP API route definitions.

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use super::handlers::{
    get_pixel, health, metrics_export, not_found, preflight, update_pixel, AppState,
};

/// Path of the pixel configuration endpoint.
pub const PIXEL_PATH: &str = "/api/update-pixel";

/// `Access-Control-Allow-Origin` value sent on every response.
pub const CORS_ALLOW_ORIGIN: &str = "*";
/// `Access-Control-Allow-Methods` value sent on every response.
pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
/// `Access-Control-Allow-Headers` value sent on every response.
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With, Accept, Origin";

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Pixel endpoint
        .route(
            PIXEL_PATH,
            get(get_pixel).post(update_pixel).options(preflight),
        )
        // Health and metrics
        .route("/health", get(health))
        .route("/metrics", get(metrics_export))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Fixed literals rather than CorsLayer so every response carries all three.
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
}
