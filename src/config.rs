//! Application configuration loaded from environment variables.

use serde::Deserialize;

use crate::pixel::validate_pixel_id;

/// Identifier used when `DEFAULT_PIXEL_ID` is absent or empty.
pub const FALLBACK_PIXEL_ID: &str = "1146867957299098";

/// Log filter used in verbose mode.
pub const VERBOSE_LOG_FILTER: &str = "pixel_config_service=debug,info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Pixel Store ===
    /// Identifier the store starts with.
    #[serde(default)]
    pub default_pixel_id: Option<String>,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_pixel_id: None,
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let pixel_id = self.default_pixel_id();
        if let Err(e) = validate_pixel_id(Some(pixel_id)) {
            return Err(format!("DEFAULT_PIXEL_ID {pixel_id:?}: {e}"));
        }

        Ok(())
    }

    /// Log filter directives. Verbose mode, from `VERBOSE` or the CLI flag, wins over `RUST_LOG`.
    pub fn log_filter(&self, verbose_flag: bool) -> &str {
        if verbose_flag || self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            &self.rust_log
        }
    }

    /// Effective default identifier. Empty values fall back to the literal default.
    pub fn default_pixel_id(&self) -> &str {
        match self.default_pixel_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => FALLBACK_PIXEL_ID,
        }
    }
}
