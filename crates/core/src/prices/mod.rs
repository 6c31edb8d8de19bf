//! Price refresh module.
//!
//! - [`model`] - Instrument records, public projection and price updates
//! - [`store`] - Storage trait for the instrument catalog
//! - [`budget`] - Quota to symbol budget conversion
//! - [`selector`] - Stale symbol selection
//! - [`merge`] - Provider responses to typed updates, bulk write
//! - [`snapshot`] - Document publisher trait and snapshot publishing
//! - [`sync`] - The refresh cycle tying the phases together

pub mod budget;
pub mod merge;
pub mod model;
pub mod selector;
pub mod snapshot;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod mocks;
#[cfg(test)]
mod sync_tests;

pub use budget::{allocate_budget, QuotaDecision};
pub use merge::{merge_price_updates, MergeOutcome, SkipReason, SkippedSymbol};
pub use model::{
    BulkWriteResult, InstrumentPrice, InstrumentType, NewInstrument, PriceData, PriceUpdate,
    PublicInstrumentPrice,
};
pub use selector::select_stale_symbols;
pub use snapshot::{
    publish_snapshot, DocumentPublisher, NewDocument, PublishOutcome, SnapshotTarget,
    UpdateResult,
};
pub use store::InstrumentStore;
pub use sync::{PriceSyncService, PriceSyncServiceTrait, SyncConfig, SyncOutcome, SyncReport};
