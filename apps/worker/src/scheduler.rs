//! Fixed-interval refresh loop.

use std::time::Duration;

use pricesync_core::prices::PriceSyncServiceTrait;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Runs cycles back to back on a fixed interval, forever.
///
/// The first cycle starts immediately. A cycle that overruns the interval
/// delays the next tick instead of stacking cycles.
pub async fn run_sync_loop(service: &dyn PriceSyncServiceTrait, every: Duration) {
    info!("Price sync scheduler started ({}s interval)", every.as_secs());

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        run_scheduled_cycle(service).await;
    }
}

/// Runs one cycle and logs its outcome. Errors are logged, not returned.
pub async fn run_scheduled_cycle(service: &dyn PriceSyncServiceTrait) -> bool {
    match service.run_cycle().await {
        Ok(outcome) => {
            info!("Price sync finished: {}", outcome.summary());
            true
        }
        Err(e) => {
            error!("Price sync failed: {}", e);
            false
        }
    }
}
