use serde::{Deserialize, Serialize};

use super::de::string_or_number;

/// One entry of the realtime price mapping.
///
/// The price is kept as the raw provider string; deciding whether it is a
/// usable number is the caller's job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimePrice {
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: Option<String>,
}

impl RealtimePrice {
    pub fn new(price: impl Into<String>) -> Self {
        Self {
            price: Some(price.into()),
        }
    }

    /// An entry the provider returned without a price.
    pub fn missing() -> Self {
        Self { price: None }
    }
}
