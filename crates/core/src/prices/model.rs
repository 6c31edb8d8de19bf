//! Domain models for instrument prices.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Kind of tradable instrument. Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    Stock,
    Forex,
    Commodity,
    Crypto,
}

impl InstrumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentType::Stock => "stock",
            InstrumentType::Forex => "forex",
            InstrumentType::Commodity => "commodity",
            InstrumentType::Crypto => "crypto",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(InstrumentType::Stock),
            "forex" => Ok(InstrumentType::Forex),
            "commodity" => Ok(InstrumentType::Commodity),
            "crypto" => Ok(InstrumentType::Crypto),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown instrument type '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Quote detail of a symbol as of its last successful quote merge.
///
/// A field the provider sent in an unparsable form is `NaN`. It serializes
/// as JSON `null` and `null` reads back as `NaN`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    #[serde(default = "nan", deserialize_with = "f64_or_nan")]
    pub open: f64,
    #[serde(default = "nan", deserialize_with = "f64_or_nan")]
    pub high: f64,
    #[serde(default = "nan", deserialize_with = "f64_or_nan")]
    pub low: f64,
    #[serde(default = "nan", deserialize_with = "f64_or_nan")]
    pub close: f64,
    #[serde(default = "nan", deserialize_with = "f64_or_nan")]
    pub volume: f64,
    #[serde(default = "nan", deserialize_with = "f64_or_nan")]
    pub previous_close: f64,
    #[serde(default = "nan", deserialize_with = "f64_or_nan")]
    pub change: f64,
    #[serde(default = "nan", deserialize_with = "f64_or_nan")]
    pub change_percent: f64,
}

fn nan() -> f64 {
    f64::NAN
}

fn f64_or_nan<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// One stored instrument and its latest price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentPrice {
    pub symbol: String,
    #[serde(rename = "type")]
    pub instrument_type: InstrumentType,
    pub price: f64,
    pub is_market_open: Option<bool>,
    pub data: Option<PriceData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InstrumentPrice {
    /// The subset of this record that is published.
    pub fn to_public(&self) -> PublicInstrumentPrice {
        PublicInstrumentPrice {
            instrument_type: self.instrument_type,
            symbol: self.symbol.clone(),
            price: self.price,
            updated_at: self.updated_at,
            data: self.data.clone(),
        }
    }
}

/// Public projection of an instrument, as it appears in the snapshot.
///
/// `is_market_open` and `created_at` are internal and not part of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicInstrumentPrice {
    #[serde(rename = "type")]
    pub instrument_type: InstrumentType,
    pub symbol: String,
    pub price: f64,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PriceData>,
}

/// Input model for adding an instrument to the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct NewInstrument {
    pub symbol: String,
    pub instrument_type: InstrumentType,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl NewInstrument {
    /// Builds a catalog entry with a zero price, stamped at `now`.
    ///
    /// The symbol is trimmed and uppercased.
    pub fn new(symbol: &str, instrument_type: InstrumentType, now: DateTime<Utc>) -> Result<Self> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }

        Ok(Self {
            symbol,
            instrument_type,
            price: 0.0,
            created_at: now,
        })
    }
}

/// Partial update of one instrument produced by a refresh cycle.
///
/// Fields are private so that every instance went through [`PriceUpdate::new`]:
/// the symbol is non-empty and the price is finite and non-negative.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceUpdate {
    symbol: String,
    price: f64,
    updated_at: DateTime<Utc>,
    is_market_open: Option<bool>,
    data: Option<PriceData>,
}

impl PriceUpdate {
    pub fn new(symbol: impl Into<String>, price: f64, updated_at: DateTime<Utc>) -> Result<Self> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ValidationError::InvalidInput(format!(
                "Price for {} must be a finite non-negative number, got {}",
                symbol, price
            ))
            .into());
        }

        Ok(Self {
            symbol,
            price,
            updated_at,
            is_market_open: None,
            data: None,
        })
    }

    /// Attach quote detail. A missing market-open flag leaves the stored one as is.
    pub fn with_quote(mut self, is_market_open: Option<bool>, data: PriceData) -> Self {
        self.is_market_open = is_market_open;
        self.data = Some(data);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_market_open(&self) -> Option<bool> {
        self.is_market_open
    }

    pub fn data(&self) -> Option<&PriceData> {
        self.data.as_ref()
    }

    /// Apply this update to a stored record.
    ///
    /// Used by in-memory stores; the SQLite store builds the same change set in SQL.
    pub fn apply_to(&self, record: &mut InstrumentPrice) {
        record.price = self.price;
        record.updated_at = self.updated_at;
        if let Some(open) = self.is_market_open {
            record.is_market_open = Some(open);
        }
        if let Some(data) = &self.data {
            record.data = Some(data.clone());
        }
    }
}

/// Per-item result of a bulk price write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BulkWriteResult {
    /// Updates that hit an existing record.
    pub matched: usize,
    /// Symbols with no record to update.
    pub unmatched: Vec<String>,
    /// Symbols whose update failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl BulkWriteResult {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty() && self.failed.is_empty()
    }
}
