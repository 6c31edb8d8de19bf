//! Merging provider responses into price updates.
//!
//! Each selected symbol is handled on its own. A symbol without a usable
//! realtime price produces no update at all; a symbol with a price but a
//! broken quote field still gets updated, with that field set to `NaN`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, error};
use pricesync_market_data::{QuoteDetail, RealtimePrice};

use super::model::{BulkWriteResult, PriceData, PriceUpdate};
use super::store::InstrumentStore;
use crate::errors::Result;

/// Why a selected symbol produced no update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The realtime response had no entry or no price for the symbol.
    MissingPrice,
    /// The price could not be used; holds the raw provider value.
    InvalidPrice(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingPrice => write!(f, "no price returned"),
            SkipReason::InvalidPrice(raw) => write!(f, "unusable price '{}'", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Updates built for one cycle and the symbols left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub updates: Vec<PriceUpdate>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Builds one [`PriceUpdate`] per symbol that has a valid realtime price.
///
/// Updates come out in the order of `symbols`.
pub fn merge_price_updates(
    symbols: &[String],
    prices: &HashMap<String, RealtimePrice>,
    quotes: &HashMap<String, QuoteDetail>,
    now: DateTime<Utc>,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for symbol in symbols {
        let price = match parse_price(prices.get(symbol)) {
            Ok(price) => price,
            Err(reason) => {
                error!("Failed to get price for {}", symbol);
                debug!("{}: {}", symbol, reason);
                outcome.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
                continue;
            }
        };

        let update = match PriceUpdate::new(symbol.clone(), price, now) {
            Ok(update) => update,
            Err(e) => {
                error!("Failed to get price for {}", symbol);
                debug!("{}: {}", symbol, e);
                outcome.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::InvalidPrice(price.to_string()),
                });
                continue;
            }
        };

        let update = match quotes.get(symbol) {
            Some(quote) => update.with_quote(quote.is_market_open, price_data_from_quote(quote)),
            None => update,
        };

        outcome.updates.push(update);
    }

    outcome
}

/// Parses a realtime entry into a finite, non-negative price.
pub fn parse_price(entry: Option<&RealtimePrice>) -> std::result::Result<f64, SkipReason> {
    let raw = entry
        .and_then(|entry| entry.price.as_deref())
        .ok_or(SkipReason::MissingPrice)?;

    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(SkipReason::InvalidPrice(raw.to_string())),
    }
}

/// Parses one quote field, `NaN` when absent or malformed.
pub fn parse_field(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Maps a quote entry onto the stored detail structure.
///
/// `previous_close` is taken from the quote's `close` field.
pub fn price_data_from_quote(quote: &QuoteDetail) -> PriceData {
    PriceData {
        open: parse_field(quote.open.as_deref()),
        high: parse_field(quote.high.as_deref()),
        low: parse_field(quote.low.as_deref()),
        close: parse_field(quote.close.as_deref()),
        volume: parse_field(quote.volume.as_deref()),
        previous_close: parse_field(quote.close.as_deref()),
        change: parse_field(quote.change.as_deref()),
        change_percent: parse_field(quote.percent_change.as_deref()),
    }
}

/// Sends the updates to the store in one bulk call.
///
/// Returns `None` without calling the store when there is nothing to write.
pub async fn write_price_updates(
    store: &dyn InstrumentStore,
    updates: Vec<PriceUpdate>,
) -> Result<Option<BulkWriteResult>> {
    if updates.is_empty() {
        return Ok(None);
    }

    let result = store.bulk_update_prices(updates).await?;

    for symbol in &result.unmatched {
        debug!("No stored instrument for {}", symbol);
    }
    for (symbol, message) in &result.failed {
        error!("Failed to update price for {}: {}", symbol, message);
    }

    Ok(Some(result))
}
