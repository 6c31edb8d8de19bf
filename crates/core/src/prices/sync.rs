//! Price sync service.
//!
//! Runs one refresh cycle as an ordered sequence of phases:
//!
//! ```text
//! usage → budget → stale selection → realtime prices → quote details
//!       → merge → bulk write → post-write delay → snapshot publish
//! ```
//!
//! Every phase runs on the calling task; the two provider calls are
//! sequential. Callers are expected to serialize cycles.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use pricesync_market_data::{MarketDataError, QuoteProvider};

use super::budget::{allocate_budget, QuotaDecision};
use super::merge::{merge_price_updates, write_price_updates, SkippedSymbol};
use super::selector::select_stale_symbols;
use super::snapshot::{publish_snapshot, DocumentPublisher, PublishOutcome, SnapshotTarget};
use super::store::InstrumentStore;
use crate::constants::{stale_after, POST_WRITE_DELAY_MS};
use crate::errors::Result;

/// Tunables of a refresh cycle.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Records older than this are eligible for refresh.
    pub stale_after: Duration,
    /// Pause between the bulk write and the snapshot read-back.
    pub post_write_delay: StdDuration,
    pub snapshot: SnapshotTarget,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stale_after: stale_after(),
            post_write_delay: StdDuration::from_millis(POST_WRITE_DELAY_MS),
            snapshot: SnapshotTarget::default(),
        }
    }
}

/// Counts and outcomes of a cycle that went through every phase.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// Remaining quota at the start of the cycle.
    pub remaining: i64,
    pub budget: usize,
    /// Symbols picked by the stale selector.
    pub selected: Vec<String>,
    /// Updates sent to the store.
    pub written: usize,
    /// Updates that hit a stored record.
    pub matched: usize,
    /// Updates the store reported as failed.
    pub failed: usize,
    pub skipped: Vec<SkippedSymbol>,
    pub publish: PublishOutcome,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Stopped before selection; no provider call after the usage check.
    QuotaExhausted { remaining: i64 },
    /// No record was stale (or the budget was zero); nothing fetched, written or published.
    NothingToUpdate,
    Completed(SyncReport),
}

impl SyncOutcome {
    /// One-line description for logs.
    pub fn summary(&self) -> String {
        match self {
            SyncOutcome::QuotaExhausted { remaining } => {
                format!("quota exhausted ({} requests left)", remaining)
            }
            SyncOutcome::NothingToUpdate => "nothing to update".to_string(),
            SyncOutcome::Completed(report) => {
                let publish = match &report.publish {
                    PublishOutcome::Created => "created".to_string(),
                    PublishOutcome::Updated => "updated".to_string(),
                    PublishOutcome::Unchanged => "unchanged".to_string(),
                    PublishOutcome::Failed { message } => format!("failed: {}", message),
                };
                format!(
                    "selected {}, written {}, matched {}, failed {}, skipped {}, snapshot {}",
                    report.selected.len(),
                    report.written,
                    report.matched,
                    report.failed,
                    report.skipped.len(),
                    publish
                )
            }
        }
    }
}

#[async_trait]
pub trait PriceSyncServiceTrait: Send + Sync {
    /// Runs one refresh cycle stamped with the current time.
    async fn run_cycle(&self) -> Result<SyncOutcome>;
}

pub struct PriceSyncService {
    provider: Arc<dyn QuoteProvider>,
    store: Arc<dyn InstrumentStore>,
    publisher: Arc<dyn DocumentPublisher>,
    config: SyncConfig,
}

impl PriceSyncService {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        store: Arc<dyn InstrumentStore>,
        publisher: Arc<dyn DocumentPublisher>,
        config: SyncConfig,
    ) -> Self {
        Self {
            provider,
            store,
            publisher,
            config,
        }
    }

    /// Runs one cycle as if the current time were `now`.
    ///
    /// `now` drives the staleness cutoff and is written as `updated_at`.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<SyncOutcome> {
        // Phase 1: quota
        let usage = self.provider.usage().await?;
        let plan_limit = self.provider.rate_limit().requests_per_minute;
        if usage.plan_limit != plan_limit {
            debug!(
                "Provider reports plan limit {}, budgeting against configured {}",
                usage.plan_limit, plan_limit
            );
        }

        let (remaining, budget) = match allocate_budget(plan_limit, usage.current_usage) {
            QuotaDecision::Exhausted { remaining } => {
                error!("API Limit Reached, {} requests left", remaining);
                return Ok(SyncOutcome::QuotaExhausted { remaining });
            }
            QuotaDecision::Available { remaining, budget } => (remaining, budget),
        };
        debug!("{} requests left, budget {} symbols", remaining, budget);

        // Phase 2: selection
        let symbols =
            select_stale_symbols(self.store.as_ref(), self.config.stale_after, budget, now)?;
        if symbols.is_empty() {
            info!("No prices to update");
            return Ok(SyncOutcome::NothingToUpdate);
        }

        // Phase 3: fetch
        info!("Fetching prices for {} symbols", symbols.len());
        let prices = self
            .provider
            .realtime_prices(&symbols)
            .await
            .unwrap_or_else(|e| {
                log_batch_failure("realtime prices", &e);
                Default::default()
            });
        let quotes = self
            .provider
            .quote_details(&symbols)
            .await
            .unwrap_or_else(|e| {
                log_batch_failure("quote details", &e);
                Default::default()
            });

        // Phase 4: merge and write
        let merged = merge_price_updates(&symbols, &prices, &quotes, now);
        let written = merged.updates.len();

        info!("Updating prices");
        let write_result = write_price_updates(self.store.as_ref(), merged.updates).await?;
        let (matched, failed) = write_result
            .map(|r| (r.matched, r.failed.len()))
            .unwrap_or((0, 0));

        if !self.config.post_write_delay.is_zero() {
            tokio::time::sleep(self.config.post_write_delay).await;
        }

        // Phase 5: publish
        let publish = publish_snapshot(
            self.store.as_ref(),
            self.publisher.as_ref(),
            &self.config.snapshot,
        )
        .await?;

        info!("Updated {} prices", written);

        Ok(SyncOutcome::Completed(SyncReport {
            remaining,
            budget,
            selected: symbols,
            written,
            matched,
            failed,
            skipped: merged.skipped,
            publish,
        }))
    }
}

#[async_trait]
impl PriceSyncServiceTrait for PriceSyncService {
    async fn run_cycle(&self) -> Result<SyncOutcome> {
        self.run_cycle_at(Utc::now()).await
    }
}

fn log_batch_failure(what: &str, e: &MarketDataError) {
    if e.is_transient() {
        warn!("Failed to fetch {}: {}", what, e);
    } else {
        error!("Failed to fetch {}: {}", what, e);
    }
}
