//! HTTP API module for the pixel endpoint plus health and metrics.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_router, PIXEL_PATH};
