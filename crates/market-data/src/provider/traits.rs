//! Quote provider trait definition.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{ApiUsage, QuoteDetail, RealtimePrice};

use super::rate_limit::RateLimit;

/// Trait for quote providers used by the price sync pipeline.
///
/// Every batched method must issue exactly one request for the whole symbol
/// set. The provider bills one credit per symbol in the batch.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pricesync_market_data::{QuoteProvider, RateLimit};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     // ... implement the batched calls
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used for logging.
    fn id(&self) -> &'static str;

    /// Request quota of the configured plan.
    fn rate_limit(&self) -> RateLimit;

    /// Fetch realtime prices for a batch of symbols in a single request.
    ///
    /// Symbols the provider had no usable entry for are absent from the map.
    async fn realtime_prices(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, RealtimePrice>, MarketDataError>;

    /// Fetch quote details for a batch of symbols in a single request.
    ///
    /// Symbols the provider had no usable entry for are absent from the map.
    async fn quote_details(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, QuoteDetail>, MarketDataError>;

    /// Report usage of the current quota window.
    async fn usage(&self) -> Result<ApiUsage, MarketDataError>;
}
