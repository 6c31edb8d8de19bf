//! HTTP client for the JSONBank document API.
//!
//! Endpoints used:
//! - `GET  /v1/own/meta/file/{path}` to check whether a document exists
//! - `POST /v1/file/{path}` to replace the content of an owned document
//! - `POST /v1/project/{project}/document` to create a document
//!
//! Every request is signed with the `jsb-pub-key` and `jsb-prv-key` headers.
//! Document content travels as a JSON-encoded string.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::errors::PublishError;
use pricesync_core::prices::{DocumentPublisher, NewDocument, UpdateResult};
use pricesync_core::Result;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default base URL of the JSONBank API.
pub const DEFAULT_JSONBANK_URL: &str = "https://api.jsonbank.io";

const PUBLIC_KEY_HEADER: &str = "jsb-pub-key";
const PRIVATE_KEY_HEADER: &str = "jsb-prv-key";

// ─────────────────────────────────────────────────────────────────────────────
// API payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct UpdateRequest {
    content: String,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
    folder: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    changed: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the documents owned by one JSONBank key pair.
#[derive(Debug, Clone)]
pub struct JsonBankClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl JsonBankClient {
    /// Creates a client for `base_url` signed with the given key pair.
    pub fn new(base_url: &str, public_key: &str, private_key: &str) -> std::result::Result<Self, PublishError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(PUBLIC_KEY_HEADER),
            header_value(public_key, "public")?,
        );
        headers.insert(
            HeaderName::from_static(PRIVATE_KEY_HEADER),
            header_value(private_key, "private")?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, PublishError> {
        let url = self.url(path);
        debug!("[JsonBank] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Whether the key pair owns a document at `path`.
    pub async fn has_own_document(&self, path: &str) -> std::result::Result<bool, PublishError> {
        let url = self.url(&format!("/v1/own/meta/file/{}", path));
        debug!("[JsonBank] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(api_error(response).await),
        }
    }

    /// Replaces the content of an owned document.
    pub async fn update_own_document(
        &self,
        path: &str,
        content: &Value,
    ) -> std::result::Result<bool, PublishError> {
        let body = UpdateRequest {
            content: serde_json::to_string(content)?,
        };
        let response: UpdateResponse = self.post(&format!("/v1/file/{}", path), &body).await?;
        Ok(response.changed)
    }

    /// Creates a document in `project`.
    pub async fn create_document(
        &self,
        project: &str,
        name: &str,
        folder: &str,
        content: &Value,
    ) -> std::result::Result<(), PublishError> {
        let body = CreateRequest {
            name,
            folder,
            content: serde_json::to_string(content)?,
        };
        let _: Value = self
            .post(&format!("/v1/project/{}/document", project), &body)
            .await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentPublisher Implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl DocumentPublisher for JsonBankClient {
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.has_own_document(path).await?)
    }

    async fn create(&self, document: NewDocument) -> Result<()> {
        self.create_document(
            &document.project,
            &document.name,
            &document.folder,
            &document.content,
        )
        .await?;
        Ok(())
    }

    async fn update(&self, path: &str, content: Value) -> Result<UpdateResult> {
        let changed = self.update_own_document(path, &content).await?;
        Ok(UpdateResult { changed })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn header_value(key: &str, which: &str) -> std::result::Result<HeaderValue, PublishError> {
    HeaderValue::from_str(key)
        .map_err(|e| PublishError::InvalidKey(format!("{} key: {}", which, e)))
}

async fn parse_response<T: DeserializeOwned>(
    response: Response,
) -> std::result::Result<T, PublishError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        PublishError::InvalidResponse(format!(
            "{} - {}",
            e,
            body.chars().take(200).collect::<String>()
        ))
    })
}

async fn api_error(response: Response) -> PublishError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|err| err.error.and_then(|detail| detail.message).or(err.message))
        .unwrap_or_else(|| body.chars().take(200).collect());

    PublishError::Api {
        status: status.as_u16(),
        message,
    }
}
