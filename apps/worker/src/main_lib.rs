use std::sync::Arc;

use pricesync_core::prices::{
    DocumentPublisher, InstrumentStore, PriceSyncService, SyncConfig,
};
use pricesync_market_data::{QuoteProvider, TwelveDataProvider};
use pricesync_publisher::JsonBankClient;
use pricesync_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, InstrumentPriceRepository,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogFormat};

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

/// Opens the store and wires the provider, store and publisher into a sync service.
///
/// Must run inside the Tokio runtime; the SQLite writer is spawned on it.
pub async fn build_service(config: &Config) -> anyhow::Result<PriceSyncService> {
    init(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let pool = create_pool(&config.db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone())?;

    let store: Arc<dyn InstrumentStore> = Arc::new(InstrumentPriceRepository::new(pool, writer));
    tracing::info!("{} instruments in store", store.count()?);

    let provider: Arc<dyn QuoteProvider> = Arc::new(
        TwelveDataProvider::new(config.twelve_data_api_key.clone())
            .with_base_url(config.twelve_data_base_url.clone())
            .with_requests_per_minute(config.twelve_data_limit_per_minute),
    );

    let publisher: Arc<dyn DocumentPublisher> = Arc::new(JsonBankClient::new(
        &config.jsb_base_url,
        &config.jsb_pub_key,
        &config.jsb_prv_key,
    )?);

    let sync_config = SyncConfig {
        post_write_delay: config.post_write_delay,
        ..SyncConfig::default()
    };

    Ok(PriceSyncService::new(provider, store, publisher, sync_config))
}
