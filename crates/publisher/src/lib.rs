//! JSONBank publisher for the price sync worker.
//!
//! Implements [`DocumentPublisher`](pricesync_core::prices::DocumentPublisher)
//! over the JSONBank HTTP API so the refresh cycle can publish its snapshot.

pub mod client;
pub mod errors;

pub use client::{JsonBankClient, DEFAULT_JSONBANK_URL};
pub use errors::PublishError;
