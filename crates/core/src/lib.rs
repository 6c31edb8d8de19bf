//! Price Sync Core - Domain entities, services, and traits.
//!
//! This crate contains the rate-budgeted price refresh pipeline.
//! It is storage-agnostic and defines traits that are implemented
//! by the `storage-sqlite` and `publisher` crates.

pub mod constants;
pub mod errors;
pub mod prices;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
