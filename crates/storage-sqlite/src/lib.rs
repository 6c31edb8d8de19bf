//! SQLite storage implementation for the price sync worker.
//!
//! This crate is the only place where Diesel dependencies exist. It implements
//! the [`InstrumentStore`](pricesync_core::prices::InstrumentStore) trait from
//! `pricesync-core` and contains:
//! - Database file setup and connection pooling
//! - Embedded Diesel migrations
//! - The single writer actor all mutations go through
//! - Database-specific model types (with Diesel derives)

pub mod db;
pub mod errors;
pub mod prices;
pub mod schema;
pub mod utils;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use errors::{IntoCore, StorageError};
pub use prices::InstrumentPriceRepository;

pub use pricesync_core::errors::{DatabaseError, Error, Result};
