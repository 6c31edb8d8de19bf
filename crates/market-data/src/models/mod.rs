//! Market data models
//!
//! - `price` - Realtime price entries (RealtimePrice)
//! - `quote` - Quote detail entries (QuoteDetail)
//! - `usage` - Quota usage report (ApiUsage)
//! - `de` - Lenient deserializers for provider payloads

mod de;
mod price;
mod quote;
mod usage;

pub use price::RealtimePrice;
pub use quote::QuoteDetail;
pub use usage::ApiUsage;
