//! Price Sync Market Data Crate
//!
//! This crate wraps the third-party market data provider used by the price
//! sync worker. It knows nothing about storage or publishing; it only turns
//! batches of symbols into per-symbol provider responses.
//!
//! # Overview
//!
//! A refresh cycle makes exactly three kinds of calls against the provider:
//! - a usage check (how much of the per-minute quota is already spent)
//! - one batched realtime price request
//! - one batched quote detail request
//!
//! The provider bills a batched call one credit per symbol it carries, so a
//! symbol refreshed through both batched endpoints costs two credits.
//!
//! # Core Types
//!
//! - [`QuoteProvider`] - Provider trait consumed by the sync pipeline
//! - [`TwelveDataProvider`] - Twelve Data implementation
//! - [`RealtimePrice`] - Entry of the realtime price mapping
//! - [`QuoteDetail`] - Entry of the quote detail mapping
//! - [`ApiUsage`] - Quota window usage report
//! - [`MarketDataError`] - Errors for a whole provider call

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::{ApiUsage, QuoteDetail, RealtimePrice};
pub use provider::twelve_data::TwelveDataProvider;
pub use provider::{QuoteProvider, RateLimit};
