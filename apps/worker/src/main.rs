mod config;
mod main_lib;
mod scheduler;

use config::Config;
use main_lib::{build_service, init_tracing};
use pricesync_core::prices::PriceSyncServiceTrait;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    let service = build_service(&config).await?;

    match config.sync_interval {
        Some(every) => scheduler::run_sync_loop(&service, every).await,
        None => {
            let outcome = service.run_cycle().await?;
            tracing::info!("Price sync finished: {}", outcome.summary());
        }
    }

    Ok(())
}
