//! Database models for instrument prices.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use crate::errors::StorageError;
use pricesync_core::prices::{InstrumentPrice, NewInstrument, PriceData, PriceUpdate};
use pricesync_core::Result;

/// Database model for the `instrument_prices` table.
#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::instrument_prices)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentPriceDB {
    pub symbol: String,
    pub instrument_type: String,
    pub price: f64,
    pub is_market_open: Option<bool>,
    pub data: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Columns touched by a price refresh.
///
/// `None` fields are left out of the `UPDATE`, so a price-only refresh keeps
/// the stored market flag and quote detail.
#[derive(AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::instrument_prices)]
pub struct PriceChangesetDB {
    pub price: f64,
    pub updated_at: String,
    pub is_market_open: Option<bool>,
    pub data: Option<String>,
}

/// Stored timestamp format: RFC 3339, UTC, millisecond precision.
///
/// Fixed width, so string order equals time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

impl InstrumentPriceDB {
    pub fn into_domain(self) -> Result<InstrumentPrice> {
        let data = match self.data.as_deref() {
            Some(raw) => Some(
                serde_json::from_str::<PriceData>(raw).map_err(StorageError::from)?,
            ),
            None => None,
        };

        Ok(InstrumentPrice {
            instrument_type: self.instrument_type.parse()?,
            price: self.price,
            is_market_open: self.is_market_open,
            data,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            symbol: self.symbol,
        })
    }
}

impl From<NewInstrument> for InstrumentPriceDB {
    fn from(instrument: NewInstrument) -> Self {
        let stamp = format_timestamp(instrument.created_at);
        Self {
            symbol: instrument.symbol,
            instrument_type: instrument.instrument_type.as_str().to_string(),
            price: instrument.price,
            is_market_open: None,
            data: None,
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }
}

impl TryFrom<&PriceUpdate> for PriceChangesetDB {
    type Error = StorageError;

    fn try_from(update: &PriceUpdate) -> std::result::Result<Self, Self::Error> {
        let data = update.data().map(serde_json::to_string).transpose()?;

        Ok(Self {
            price: update.price(),
            updated_at: format_timestamp(update.updated_at()),
            is_market_open: update.is_market_open(),
            data,
        })
    }
}
