//! Pixel configuration record, validation, and the in-memory store.

pub mod store;
pub mod types;

pub use store::PixelStore;
pub use types::{validate_pixel_id, PixelCandidate, PixelConfig, PixelSnapshot};
