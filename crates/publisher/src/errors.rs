//! Errors raised by the JSONBank client.

use pricesync_core::errors::Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Invalid JSONBank key: {0}")]
    InvalidKey(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSONBank rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse JSONBank response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode document content: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<PublishError> for Error {
    fn from(err: PublishError) -> Self {
        Error::Publish(err.to_string())
    }
}
