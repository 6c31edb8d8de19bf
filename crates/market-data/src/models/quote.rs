use serde::{Deserialize, Serialize};

use super::de::{bool_or_string, string_or_number};

/// One entry of the quote detail mapping.
///
/// Numeric fields stay as provider strings so that a single malformed field
/// can be handled on its own by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteDetail {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub open: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub high: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub low: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub close: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub previous_close: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub change: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub percent_change: Option<String>,

    #[serde(default, deserialize_with = "bool_or_string")]
    pub is_market_open: Option<bool>,
}
