//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait consumed by the sync pipeline
//! - Rate limit configuration for a provider plan
//! - The Twelve Data implementation
//!
//! Providers receive plain symbol batches. A provider call either succeeds
//! with a mapping keyed by the requested symbols (absent keys mean "no data
//! for this symbol") or fails as a whole with a `MarketDataError`.

mod rate_limit;
mod traits;

pub mod twelve_data;

pub use rate_limit::{RateLimit, DEFAULT_REQUESTS_PER_MINUTE};
pub use traits::QuoteProvider;
