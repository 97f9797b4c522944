//! HTTP API handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{error, instrument};

use crate::error::PixelError;
use crate::metrics::{self, LatencyTimer};
use crate::pixel::{PixelCandidate, PixelConfig, PixelStore};

/// Message returned with a successful update.
pub const UPDATE_MESSAGE: &str = "pixel configuration updated";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// The pixel record for this process.
    pub store: PixelStore,
    /// Renders the Prometheus exposition.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Create new app state.
    pub fn new(store: PixelStore, metrics: PrometheusHandle) -> Self {
        Self { store, metrics }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Successful update response.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: &'static str,
    /// The stored record.
    pub data: PixelConfig,
}

/// Successful read response.
#[derive(Debug, Serialize)]
pub struct ReadResponse {
    /// Always true.
    pub success: bool,
    /// The stored record.
    pub data: PixelConfig,
    /// When the read happened.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Failed read response. Still carries a usable record.
#[derive(Debug, Serialize)]
pub struct ReadFailureResponse {
    /// Always false.
    pub success: bool,
    /// Generic error message.
    pub error: &'static str,
    /// Default record the caller can fall back to.
    pub fallback: PixelConfig,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus exposition handler.
pub async fn metrics_export(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.render()
}

/// CORS preflight handler - empty 200, headers come from the router layers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unknown paths.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Read the current pixel config.
///
/// A store fault still answers with a default record so callers can proceed.
#[instrument(skip_all)]
pub async fn get_pixel(State(state): State<AppState>) -> Response {
    let _timer = LatencyTimer::new("GET");

    match state.store.get() {
        Ok(snapshot) => {
            metrics::inc_pixel_reads();
            Json(ReadResponse {
                success: true,
                data: snapshot.config,
                timestamp: snapshot.read_at,
            })
            .into_response()
        }
        Err(e) => {
            error!("Pixel get error: {}", e);
            metrics::inc_pixel_rejections(e.reason());
            let body = ReadFailureResponse {
                success: false,
                error: e.public_message(),
                fallback: state.store.fallback(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Validate the body and replace the pixel config.
#[instrument(skip_all)]
pub async fn update_pixel(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UpdateResponse>, PixelError> {
    let _timer = LatencyTimer::new("POST");

    let result = PixelCandidate::from_slice(&body).and_then(|candidate| state.store.replace(candidate));

    match result {
        Ok(data) => {
            metrics::inc_pixel_updates();
            Ok(Json(UpdateResponse {
                success: true,
                message: UPDATE_MESSAGE,
                data,
            }))
        }
        Err(e) => {
            if let PixelError::Internal(detail) = &e {
                error!("Pixel update error: {}", detail);
            }
            metrics::inc_pixel_rejections(e.reason());
            Err(e)
        }
    }
}
