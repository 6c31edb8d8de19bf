//! Instrument price persistence.

mod model;
mod repository;

pub use model::{format_timestamp, parse_timestamp, InstrumentPriceDB, PriceChangesetDB};
pub use repository::InstrumentPriceRepository;
