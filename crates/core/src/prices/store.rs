//! Instrument storage trait.
//!
//! Abstracts the persistence of instrument prices so the refresh pipeline can
//! run against SQLite in production and an in-memory mock in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{
    BulkWriteResult, InstrumentPrice, NewInstrument, PriceUpdate, PublicInstrumentPrice,
};
use crate::errors::Result;

/// Storage interface for the instrument catalog and its prices.
///
/// Sync methods are plain reads; async methods go through the write path.
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    // =========================================================================
    // Queries
    // =========================================================================

    /// Symbols whose `updated_at` is strictly before `cutoff`, oldest first,
    /// at most `limit` of them.
    fn find_stale_symbols(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<Vec<String>>;

    /// Public projection of every record, ordered by symbol.
    fn list_public(&self) -> Result<Vec<PublicInstrumentPrice>>;

    /// Full record for one symbol, if present.
    fn get(&self, symbol: &str) -> Result<Option<InstrumentPrice>>;

    fn count(&self) -> Result<usize>;

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Applies each update to the record with the same symbol.
    ///
    /// Updates are independent: a failing item is reported in the result and
    /// does not undo the others. Only the fields carried by the update change.
    async fn bulk_update_prices(&self, updates: Vec<PriceUpdate>) -> Result<BulkWriteResult>;

    /// Adds catalog entries. Returns the number of inserted rows.
    async fn insert_many(&self, instruments: Vec<NewInstrument>) -> Result<usize>;

    /// Removes every record. Returns the number of deleted rows.
    async fn delete_all(&self) -> Result<usize>;
}
