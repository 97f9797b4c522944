//! In-memory tracking pixel configuration service.
//!
//! One HTTP endpoint holds a single pixel record (identifier plus an
//! enabled flag) for the lifetime of the process:
//!
//! ```text
//! OPTIONS /api/update-pixel   CORS preflight, empty 200
//! POST    /api/update-pixel   validate and replace the record
//! GET     /api/update-pixel   read the record
//! ```
//!
//! Nothing is persisted. Every process owns its own copy.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`pixel`]: Pixel record, validation, and store
//! - [`api`]: HTTP router and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pixel;
pub mod utils;

pub use config::Config;
pub use error::{PixelError, Result, ServiceError};
