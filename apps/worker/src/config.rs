use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use pricesync_market_data::provider::DEFAULT_REQUESTS_PER_MINUTE;
use pricesync_publisher::DEFAULT_JSONBANK_URL;

const DEFAULT_TWELVE_DATA_URL: &str = "https://api.twelvedata.com";
const DEFAULT_DB_PATH: &str = "./db/prices.db";
const DEFAULT_POST_WRITE_DELAY_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub twelve_data_api_key: String,
    pub twelve_data_limit_per_minute: u32,
    pub twelve_data_base_url: String,
    pub jsb_pub_key: String,
    pub jsb_prv_key: String,
    pub jsb_base_url: String,
    pub db_path: String,
    pub post_write_delay: Duration,
    /// `None` runs a single cycle and exits.
    pub sync_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads the configuration from the process environment, after loading `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        // dotenvy does not override variables that are already set
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| anyhow!("{} is not set", key));

        let twelve_data_limit_per_minute = match var("TWELVE_DATA_API_LIMIT_PER_MINUTE") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("Invalid TWELVE_DATA_API_LIMIT_PER_MINUTE: {}", raw))?,
            None => DEFAULT_REQUESTS_PER_MINUTE,
        };
        if twelve_data_limit_per_minute == 0 {
            bail!("TWELVE_DATA_API_LIMIT_PER_MINUTE must be positive");
        }

        let post_write_delay_ms = match var("PS_POST_WRITE_DELAY_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("Invalid PS_POST_WRITE_DELAY_MS: {}", raw))?,
            None => DEFAULT_POST_WRITE_DELAY_MS,
        };

        let sync_interval = match var("PS_SYNC_INTERVAL_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .with_context(|| format!("Invalid PS_SYNC_INTERVAL_SECS: {}", raw))?;
                if secs == 0 {
                    bail!("PS_SYNC_INTERVAL_SECS must be positive");
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let log_format = match var("PS_LOG_FORMAT") {
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) if raw.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(raw) => bail!("Invalid PS_LOG_FORMAT: {} (expected text or json)", raw),
            None => LogFormat::Text,
        };

        Ok(Self {
            twelve_data_api_key: required("TWELVE_DATA_API_KEY")?,
            twelve_data_limit_per_minute,
            twelve_data_base_url: var("TWELVE_DATA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TWELVE_DATA_URL.to_string()),
            jsb_pub_key: required("JSB_PUB_KEY")?,
            jsb_prv_key: required("JSB_PRV_KEY")?,
            jsb_base_url: var("JSB_BASE_URL").unwrap_or_else(|| DEFAULT_JSONBANK_URL.to_string()),
            db_path: var("PS_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            post_write_delay: Duration::from_millis(post_write_delay_ms),
            sync_interval,
            log_format,
        })
    }
}
