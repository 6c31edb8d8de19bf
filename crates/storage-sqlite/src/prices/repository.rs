use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::{format_timestamp, InstrumentPriceDB, PriceChangesetDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::instrument_prices::dsl;
use crate::utils::chunk_for_sqlite;
use pricesync_core::prices::{
    BulkWriteResult, InstrumentPrice, InstrumentStore, NewInstrument, PriceUpdate,
    PublicInstrumentPrice,
};
use pricesync_core::Result;

pub struct InstrumentPriceRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl InstrumentPriceRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Applies one update inside its own savepoint.
///
/// Returns the number of rows changed (0 or 1).
fn apply_update(conn: &mut SqliteConnection, update: &PriceUpdate) -> std::result::Result<usize, StorageError> {
    let changeset = PriceChangesetDB::try_from(update)?;
    conn.transaction::<_, StorageError, _>(|c| {
        let rows = diesel::update(dsl::instrument_prices.find(update.symbol()))
            .set(&changeset)
            .execute(c)?;
        Ok(rows)
    })
}

#[async_trait]
impl InstrumentStore for InstrumentPriceRepository {
    // =========================================================================
    // Queries
    // =========================================================================

    fn find_stale_symbols(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        dsl::instrument_prices
            .filter(dsl::updated_at.lt(format_timestamp(cutoff)))
            .order((dsl::updated_at.asc(), dsl::symbol.asc()))
            .limit(limit)
            .select(dsl::symbol)
            .load::<String>(&mut conn)
            .into_core()
    }

    fn list_public(&self) -> Result<Vec<PublicInstrumentPrice>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = dsl::instrument_prices
            .order(dsl::symbol.asc())
            .select(InstrumentPriceDB::as_select())
            .load::<InstrumentPriceDB>(&mut conn)
            .into_core()?;

        rows.into_iter()
            .map(|row| row.into_domain().map(|record| record.to_public()))
            .collect()
    }

    fn get(&self, symbol: &str) -> Result<Option<InstrumentPrice>> {
        let mut conn = get_connection(&self.pool)?;

        dsl::instrument_prices
            .find(symbol)
            .select(InstrumentPriceDB::as_select())
            .first::<InstrumentPriceDB>(&mut conn)
            .optional()
            .into_core()?
            .map(InstrumentPriceDB::into_domain)
            .transpose()
    }

    fn count(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let count = dsl::instrument_prices
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    async fn bulk_update_prices(&self, updates: Vec<PriceUpdate>) -> Result<BulkWriteResult> {
        if updates.is_empty() {
            return Ok(BulkWriteResult::default());
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BulkWriteResult> {
                let mut result = BulkWriteResult::default();

                for update in &updates {
                    match apply_update(conn, update) {
                        Ok(0) => result.unmatched.push(update.symbol().to_string()),
                        Ok(_) => result.matched += 1,
                        Err(e) => {
                            result
                                .failed
                                .push((update.symbol().to_string(), e.to_string()));
                        }
                    }
                }

                debug!(
                    "Bulk price update: {} matched, {} unmatched, {} failed",
                    result.matched,
                    result.unmatched.len(),
                    result.failed.len()
                );
                Ok(result)
            })
            .await
    }

    async fn insert_many(&self, instruments: Vec<NewInstrument>) -> Result<usize> {
        if instruments.is_empty() {
            return Ok(0);
        }

        let rows: Vec<InstrumentPriceDB> =
            instruments.into_iter().map(InstrumentPriceDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut inserted = 0;
                for chunk in chunk_for_sqlite(&rows) {
                    inserted += diesel::insert_into(dsl::instrument_prices)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(inserted)
            })
            .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(dsl::instrument_prices)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}
