//! Lenient field deserializers.
//!
//! The provider documents most numeric fields as strings but is not consistent
//! about it across endpoints and plans. These helpers accept either form and
//! turn anything else into `None` instead of failing the whole entry.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts `"1.5"`, `1.5` or `null`; anything else becomes `None`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts `true`, `"true"`, `false`, `"false"` or `null`.
pub(crate) fn bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}
