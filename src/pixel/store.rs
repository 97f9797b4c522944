//! In-memory pixel configuration store.

use std::sync::{Arc, RwLock};

use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::PixelError;

use super::types::{PixelCandidate, PixelConfig, PixelSnapshot};

/// Holds the single pixel record for this process.
///
/// Cloning the store clones the handle, not the record. Writes are
/// last-write-wins and nothing is shared between processes.
#[derive(Debug, Clone)]
pub struct PixelStore {
    record: Arc<RwLock<PixelConfig>>,
    default_pixel_id: Arc<str>,
}

impl PixelStore {
    /// Create a store holding an enabled record for `default_pixel_id`.
    pub fn new(default_pixel_id: impl Into<String>) -> Self {
        let default_pixel_id: String = default_pixel_id.into();
        Self::with_record(PixelConfig::new(default_pixel_id.clone()), default_pixel_id)
    }

    /// Create a store seeded from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_pixel_id())
    }

    /// Create a store around an existing record.
    pub fn with_record(record: PixelConfig, default_pixel_id: impl Into<String>) -> Self {
        Self {
            record: Arc::new(RwLock::new(record)),
            default_pixel_id: Arc::from(default_pixel_id.into()),
        }
    }

    /// Identifier used to repair an empty record and to build fallbacks.
    pub fn default_pixel_id(&self) -> &str {
        &self.default_pixel_id
    }

    /// Record handed out when the store itself cannot be read.
    pub fn fallback(&self) -> PixelConfig {
        PixelConfig::new(self.default_pixel_id())
    }

    /// Read the current record.
    ///
    /// An empty identifier is replaced with the default before returning.
    pub fn get(&self) -> Result<PixelSnapshot, PixelError> {
        let current = {
            let record = self.record.read()?;
            (!record.pixel_id.is_empty()).then(|| record.clone())
        };

        let config = match current {
            Some(config) => config,
            None => {
                let mut record = self.record.write()?;
                if record.pixel_id.is_empty() {
                    warn!(default = %self.default_pixel_id, "Pixel record had no identifier, repairing");
                    record.pixel_id = self.default_pixel_id.to_string();
                }
                record.clone()
            }
        };

        info!(pixel = ?config, "Pixel config read");

        Ok(PixelSnapshot {
            config,
            read_at: OffsetDateTime::now_utc(),
        })
    }

    /// Validate `candidate` and make it the current record.
    ///
    /// Rejected candidates leave the store untouched.
    #[instrument(skip(self, candidate), fields(pixel_id = ?candidate.pixel_id))]
    pub fn replace(&self, candidate: PixelCandidate) -> Result<PixelConfig, PixelError> {
        let config = candidate
            .into_config(OffsetDateTime::now_utc())
            .inspect_err(|e| warn!("Rejected pixel update: {}", e))?;

        *self.record.write()? = config.clone();

        info!(pixel = ?config, "Pixel config updated");
        Ok(config)
    }

    /// Poison the record lock so fault paths can be exercised.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let record = Arc::clone(&self.record);
        let _ = std::thread::spawn(move || {
            let _guard = record.write().unwrap();
            panic!("poisoning pixel store");
        })
        .join();
    }
}
