//! Error types for the market data crate.
//!
//! Every variant describes the failure of a whole provider call. Per-symbol
//! problems inside an otherwise successful batch are not errors; the affected
//! symbol is simply absent from the returned mapping.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider rate limited the request (HTTP 429 or error code 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The API key was rejected or lacks access to the endpoint.
    #[error("Unauthorized: {provider} - {message}")]
    Unauthorized {
        /// The provider that rejected the key
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered with a body we could not interpret.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The provider that sent the body
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns true if a later cycle could plausibly succeed with the same request.
    ///
    /// The sync pipeline never retries within a cycle; this is only used to
    /// pick the log level for a failed batch.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Network(_)
        )
    }
}
