//! Pixel configuration record and request types.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::error::PixelError;

static PIXEL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("pixel id pattern compiles"));

/// Key the store always computes itself.
const LAST_UPDATED_KEY: &str = "lastUpdated";

/// The stored pixel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelConfig {
    /// Tracking pixel identifier, decimal digits only.
    pub pixel_id: String,
    /// Whether the pixel should fire.
    pub enabled: bool,
    /// When the record was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    /// Fields the caller sent beyond the known ones.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PixelConfig {
    /// Enabled record for `pixel_id`, stamped now.
    pub fn new(pixel_id: impl Into<String>) -> Self {
        Self {
            pixel_id: pixel_id.into(),
            enabled: true,
            last_updated: OffsetDateTime::now_utc(),
            extra: Map::new(),
        }
    }
}

/// Parsed POST body. Nothing here is trusted until validated.
///
/// Both known fields stay loosely typed so a wrongly typed value is
/// rejected by validation rather than by the JSON parser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelCandidate {
    /// Requested identifier.
    #[serde(default)]
    pub pixel_id: Option<Value>,
    /// Requested flag. Absent or null means disabled.
    #[serde(default)]
    pub enabled: Option<Value>,
    /// Everything else in the body.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PixelCandidate {
    /// Candidate with just the two known fields.
    pub fn new(pixel_id: impl Into<String>, enabled: bool) -> Self {
        Self {
            pixel_id: Some(Value::String(pixel_id.into())),
            enabled: Some(Value::Bool(enabled)),
            extra: Map::new(),
        }
    }

    /// Parse a raw request body.
    ///
    /// Only bytes that are not JSON fail here. A JSON body that is not an
    /// object yields an empty candidate, which validation then rejects.
    pub fn from_slice(body: &[u8]) -> Result<Self, PixelError> {
        match serde_json::from_slice::<Value>(body)? {
            object @ Value::Object(_) => Ok(serde_json::from_value(object)?),
            _ => Ok(Self::default()),
        }
    }

    /// Validate and turn into a record stamped with `now`.
    pub fn into_config(self, now: OffsetDateTime) -> Result<PixelConfig, PixelError> {
        let pixel_id = pixel_id_text(self.pixel_id)?;
        let enabled = self.enabled.as_ref().is_some_and(truthy);

        let mut extra = self.extra;
        extra.remove(LAST_UPDATED_KEY);

        Ok(PixelConfig {
            pixel_id,
            enabled,
            last_updated: now,
            extra,
        })
    }
}

/// Identifier text from a loosely typed value.
///
/// Null, `false`, zero and `""` count as missing. Numbers are checked by
/// their decimal rendering, so `123` becomes `"123"` and `1.5` is rejected.
fn pixel_id_text(value: Option<Value>) -> Result<String, PixelError> {
    let text = match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {
            return Err(PixelError::MissingIdentifier)
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
            return Err(PixelError::MissingIdentifier)
        }
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s,
        Some(_) => return Err(PixelError::InvalidIdentifierFormat),
    };

    validate_pixel_id(Some(&text))?;
    Ok(text)
}

/// Loose truthiness for the enabled flag.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A record as seen by a reader, with the time it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSnapshot {
    /// Current record.
    pub config: PixelConfig,
    /// When the read happened.
    pub read_at: OffsetDateTime,
}

/// Check a pixel identifier: present, non-empty, decimal digits only.
pub fn validate_pixel_id(pixel_id: Option<&str>) -> Result<&str, PixelError> {
    let pixel_id = match pixel_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(PixelError::MissingIdentifier),
    };

    if !PIXEL_ID_PATTERN.is_match(pixel_id) {
        return Err(PixelError::InvalidIdentifierFormat);
    }

    Ok(pixel_id)
}
