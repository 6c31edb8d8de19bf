//! Stale symbol selection.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use log::debug;

use super::store::InstrumentStore;
use crate::errors::Result;

/// Picks up to `budget` symbols not refreshed within `stale_after`, oldest first.
///
/// A zero budget returns nothing without touching the store.
pub fn select_stale_symbols(
    store: &dyn InstrumentStore,
    stale_after: Duration,
    budget: usize,
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    if budget == 0 {
        debug!("Symbol budget is zero, skipping stale lookup");
        return Ok(Vec::new());
    }

    let cutoff = now - stale_after;
    let candidates = store.find_stale_symbols(cutoff, budget)?;

    let mut seen = HashSet::with_capacity(candidates.len());
    let symbols: Vec<String> = candidates
        .into_iter()
        .filter(|symbol| seen.insert(symbol.clone()))
        .take(budget)
        .collect();

    debug!(
        "Selected {} stale symbols (cutoff {}, budget {})",
        symbols.len(),
        cutoff.to_rfc3339(),
        budget
    );

    Ok(symbols)
}
