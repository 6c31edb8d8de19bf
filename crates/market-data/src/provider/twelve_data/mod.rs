//! Twelve Data market data provider implementation.
//!
//! Endpoints used:
//! - `/price` for realtime prices (batched, comma separated symbols)
//! - `/quote` for quote details (batched)
//! - `/api_usage` for the current quota window
//!
//! Response quirks handled here:
//! - a request for a single symbol returns the bare entry instead of a map
//! - errors usually come back as HTTP 200 with `{"status": "error", ...}`,
//!   either as the whole body or as the value of one symbol in a batch
//!
//! API documentation: https://twelvedata.com/docs

mod models;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{ApiUsage, QuoteDetail, RealtimePrice};
use crate::provider::{QuoteProvider, RateLimit};

use models::ErrorBody;

const BASE_URL: &str = "https://api.twelvedata.com";
const PROVIDER_ID: &str = "TWELVE_DATA";

/// Twelve Data quote provider.
///
/// The API key travels as the `apikey` query parameter on every request.
pub struct TwelveDataProvider {
    client: Client,
    base_url: String,
    api_key: String,
    rate_limit: RateLimit,
}

impl TwelveDataProvider {
    /// Create a new provider with the given API key and the default plan limit.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key,
            rate_limit: RateLimit::default(),
        }
    }

    /// Point the client at another host (used for tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the per-minute request ceiling of the plan.
    pub fn with_requests_per_minute(mut self, requests_per_minute: u32) -> Self {
        self.rate_limit = RateLimit {
            requests_per_minute,
        };
        self
    }

    /// Make a GET request to the Twelve Data API and return the raw body.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Twelve Data request: {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    // the URL carries the api key
                    MarketDataError::Network(e.without_url())
                }
            })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MarketDataError::Unauthorized {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(value) = serde_json::from_str::<Value>(&body) {
                if let Some(error) = ErrorBody::from_value(&value) {
                    return Err(MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: error.message().to_string(),
                    });
                }
            }

            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::Network(e.without_url()))
    }

    /// Issue one request for the whole batch and key the result by symbol.
    async fn fetch_batch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        symbols: &[String],
    ) -> Result<HashMap<String, T>, MarketDataError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = symbols.join(",");
        let body = self.fetch(endpoint, &[("symbol", joined.as_str())]).await?;
        let entries = parse_batch::<T>(symbols, &body)?;

        debug!(
            "Twelve Data: {} returned {} of {} symbols",
            endpoint,
            entries.len(),
            symbols.len()
        );

        Ok(entries)
    }
}

// ============================================================================
// QuoteProvider Implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for TwelveDataProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit.clone()
    }

    async fn realtime_prices(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, RealtimePrice>, MarketDataError> {
        self.fetch_batch("/price", symbols).await
    }

    async fn quote_details(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, QuoteDetail>, MarketDataError> {
        self.fetch_batch("/quote", symbols).await
    }

    async fn usage(&self) -> Result<ApiUsage, MarketDataError> {
        let body = self.fetch("/api_usage", &[]).await?;
        let value = parse_body(&body)?;
        check_error(&value)?;

        serde_json::from_value(value).map_err(|e| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse usage response: {}", e),
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_body(body: &str) -> Result<Value, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::InvalidResponse {
        provider: PROVIDER_ID.to_string(),
        message: format!("Body is not JSON: {}", e),
    })
}

/// Turn a top-level error body into the matching error.
fn check_error(value: &Value) -> Result<(), MarketDataError> {
    let Some(error) = ErrorBody::from_value(value) else {
        return Ok(());
    };

    let provider = PROVIDER_ID.to_string();
    Err(match error.code {
        Some(429) => MarketDataError::RateLimited { provider },
        Some(401) | Some(403) => MarketDataError::Unauthorized {
            provider,
            message: error.message().to_string(),
        },
        Some(code) => MarketDataError::ProviderError {
            provider,
            message: format!("{} (code {})", error.message(), code),
        },
        None => MarketDataError::ProviderError {
            provider,
            message: error.message().to_string(),
        },
    })
}

/// Key a batched response by the requested symbols.
///
/// Symbols with an error entry, an undecodable entry or no entry at all are
/// left out of the result.
fn parse_batch<T: DeserializeOwned>(
    symbols: &[String],
    body: &str,
) -> Result<HashMap<String, T>, MarketDataError> {
    let value = parse_body(body)?;
    check_error(&value)?;

    let mut entries = HashMap::with_capacity(symbols.len());

    // A single-symbol request returns the entry itself.
    if let [symbol] = symbols {
        if let Some(entry) = decode_entry(symbol, value) {
            entries.insert(symbol.clone(), entry);
        }
        return Ok(entries);
    }

    let Value::Object(mut by_symbol) = value else {
        return Err(MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: "Expected an object keyed by symbol".to_string(),
        });
    };

    for symbol in symbols {
        match by_symbol.remove(symbol.as_str()) {
            Some(entry) => {
                if let Some(decoded) = decode_entry(symbol, entry) {
                    entries.insert(symbol.clone(), decoded);
                }
            }
            None => debug!("Twelve Data: no entry for {}", symbol),
        }
    }

    Ok(entries)
}

fn decode_entry<T: DeserializeOwned>(symbol: &str, entry: Value) -> Option<T> {
    if entry.is_null() {
        return None;
    }

    if let Some(error) = ErrorBody::from_value(&entry) {
        warn!("Twelve Data: {} rejected: {}", symbol, error.message());
        return None;
    }

    match serde_json::from_value(entry) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Twelve Data: could not decode entry for {}: {}", symbol, e);
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
