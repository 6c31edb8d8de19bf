//! Twelve Data wire structures that are not part of the public model.

use serde::Deserialize;
use serde_json::Value;

/// Error body returned by Twelve Data, usually with HTTP 200.
///
/// Appears both as the whole response and as the value of a single symbol
/// inside a batched response.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ErrorBody {
    /// Parses `value` as an error body, returning `None` for regular payloads.
    pub fn from_value(value: &Value) -> Option<Self> {
        let status = value.get("status")?.as_str()?;
        if status != "error" {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("unknown error")
    }
}
