//! Tests for the full refresh cycle against in-memory collaborators.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pricesync_market_data::QuoteDetail;

use super::mocks::{record_at, MockDocumentPublisher, MockInstrumentStore, MockQuoteProvider};
use super::merge::SkipReason;
use super::model::{InstrumentPrice, InstrumentType};
use super::snapshot::{PublishOutcome, SnapshotTarget};
use super::sync::{PriceSyncService, SyncConfig, SyncOutcome};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 14, 0, 0).unwrap()
}

fn test_config() -> SyncConfig {
    SyncConfig {
        stale_after: Duration::minutes(5),
        post_write_delay: StdDuration::ZERO,
        snapshot: SnapshotTarget::default(),
    }
}

fn service(
    provider: &MockQuoteProvider,
    store: &MockInstrumentStore,
    publisher: &MockDocumentPublisher,
    config: SyncConfig,
) -> PriceSyncService {
    PriceSyncService::new(
        Arc::new(provider.clone()),
        Arc::new(store.clone()),
        Arc::new(publisher.clone()),
        config,
    )
}

fn quote(close: &str, open_market: bool) -> QuoteDetail {
    QuoteDetail {
        open: Some("148.00".to_string()),
        high: Some("152.00".to_string()),
        low: Some("147.50".to_string()),
        close: Some(close.to_string()),
        volume: Some("62196900".to_string()),
        previous_close: Some("149.10".to_string()),
        change: Some("1.15".to_string()),
        percent_change: Some("0.77".to_string()),
        is_market_open: Some(open_market),
        ..Default::default()
    }
}

fn stale(symbol: &str) -> InstrumentPrice {
    record_at(symbol, InstrumentType::Stock, now() - Duration::hours(1))
}

#[tokio::test]
async fn test_quota_exhausted_makes_no_further_calls() {
    let provider = MockQuoteProvider::new(55, 50);
    let store = MockInstrumentStore::new();
    store.add(stale("AAPL"));
    let publisher = MockDocumentPublisher::new();

    let outcome = service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::QuotaExhausted { remaining: 5 });
    let endpoints: Vec<&str> = provider.calls().iter().map(|(e, _)| *e).collect();
    assert_eq!(endpoints, vec!["usage"]);
    assert_eq!(store.stale_queries(), 0);
    assert!(store.bulk_calls().is_empty());
    assert_eq!(publisher.calls(), 0);
}

#[tokio::test]
async fn test_usage_failure_propagates() {
    let provider = MockQuoteProvider::new(55, 0);
    provider.set_fail_usage(true);
    let store = MockInstrumentStore::new();
    let publisher = MockDocumentPublisher::new();

    let result = service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await;

    assert!(matches!(result, Err(crate::Error::MarketData(_))));
    assert_eq!(store.stale_queries(), 0);
}

#[tokio::test]
async fn test_budget_selects_twenty_oldest_of_thirty() {
    let provider = MockQuoteProvider::new(55, 10);
    let store = MockInstrumentStore::new();
    for i in 0..30 {
        let symbol = format!("SYM{:02}", i);
        store.add(record_at(
            &symbol,
            InstrumentType::Stock,
            now() - Duration::minutes(100 - i),
        ));
        provider.set_price(&symbol, "10.0");
    }
    let publisher = MockDocumentPublisher::new();

    let outcome = service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    let SyncOutcome::Completed(report) = outcome else {
        panic!("expected a completed cycle, got {:?}", outcome);
    };
    assert_eq!(report.remaining, 45);
    assert_eq!(report.budget, 20);
    assert_eq!(report.selected.len(), 20);
    assert_eq!(report.selected[0], "SYM00");
    assert_eq!(report.selected[19], "SYM19");
    assert_eq!(report.written, 20);
    assert_eq!(report.matched, 20);

    // usage, then one batched price call and one batched quote call
    let calls = provider.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].0, "price");
    assert_eq!(calls[1].1, report.selected);
    assert_eq!(calls[2].0, "quote");
    assert_eq!(calls[2].1, report.selected);

    assert_eq!(store.record("SYM19").map(|r| r.updated_at), Some(now()));
    assert!(store.record("SYM20").map(|r| r.updated_at) < Some(now()));
}

#[tokio::test]
async fn test_missing_price_symbol_is_skipped() {
    let provider = MockQuoteProvider::new(55, 10);
    provider.set_price("AAPL", "150.25");
    provider.set_quote("AAPL", quote("150.25", true));
    let store = MockInstrumentStore::new();
    store.add(stale("AAPL"));
    store.add(stale("MSFT"));
    let publisher = MockDocumentPublisher::new();

    let outcome = service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    let SyncOutcome::Completed(report) = outcome else {
        panic!("expected a completed cycle, got {:?}", outcome);
    };
    assert_eq!(report.written, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].symbol, "MSFT");
    assert_eq!(report.skipped[0].reason, SkipReason::MissingPrice);

    let bulk = store.bulk_calls();
    assert_eq!(bulk.len(), 1);
    assert_eq!(bulk[0].len(), 1);
    assert_eq!(bulk[0][0].symbol(), "AAPL");
    assert_eq!(bulk[0][0].price(), 150.25);
    assert!(bulk[0][0].data().is_some());

    let aapl = store.record("AAPL").unwrap();
    assert_eq!(aapl.price, 150.25);
    assert_eq!(aapl.is_market_open, Some(true));
    assert_eq!(aapl.data.as_ref().map(|d| d.previous_close), Some(150.25));

    let msft = store.record("MSFT").unwrap();
    assert_eq!(msft.price, 0.0);
    assert_eq!(msft.updated_at, now() - Duration::hours(1));
}

#[tokio::test]
async fn test_price_only_update_keeps_quote_fields() {
    let provider = MockQuoteProvider::new(55, 0);
    provider.set_price("AAPL", "151.00");
    let store = MockInstrumentStore::new();
    let mut record = stale("AAPL");
    record.is_market_open = Some(false);
    record.data = Some(super::merge::price_data_from_quote(&quote("140.00", false)));
    store.add(record.clone());
    let publisher = MockDocumentPublisher::new();

    service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    let updated = store.record("AAPL").unwrap();
    assert_eq!(updated.price, 151.0);
    assert_eq!(updated.updated_at, now());
    assert_eq!(updated.is_market_open, Some(false));
    assert_eq!(updated.data, record.data);
}

#[tokio::test]
async fn test_nothing_stale_skips_fetch_write_and_publish() {
    let provider = MockQuoteProvider::new(55, 10);
    let store = MockInstrumentStore::new();
    store.add(record_at(
        "AAPL",
        InstrumentType::Stock,
        now() - Duration::minutes(1),
    ));
    let publisher = MockDocumentPublisher::new();

    let outcome = service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::NothingToUpdate);
    assert_eq!(provider.calls().len(), 1);
    assert!(store.bulk_calls().is_empty());
    assert_eq!(publisher.calls(), 0);
}

#[tokio::test]
async fn test_batch_failures_still_publish() {
    let provider = MockQuoteProvider::new(55, 10);
    provider.set_fail_prices(true);
    provider.set_fail_quotes(true);
    let store = MockInstrumentStore::new();
    store.add(stale("AAPL"));
    store.add(stale("MSFT"));
    let publisher = MockDocumentPublisher::new();

    let outcome = service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    let SyncOutcome::Completed(report) = outcome else {
        panic!("expected a completed cycle, got {:?}", outcome);
    };
    assert_eq!(report.written, 0);
    assert_eq!(report.skipped.len(), 2);
    assert!(store.bulk_calls().is_empty());
    assert_eq!(report.publish, PublishOutcome::Created);
}

#[tokio::test]
async fn test_quote_batch_failure_keeps_prices() {
    let provider = MockQuoteProvider::new(55, 10);
    provider.set_price("AAPL", "150.25");
    provider.set_quote("AAPL", quote("150.25", true));
    provider.set_fail_quotes(true);
    let store = MockInstrumentStore::new();
    store.add(stale("AAPL"));
    let publisher = MockDocumentPublisher::new();

    service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    let aapl = store.record("AAPL").unwrap();
    assert_eq!(aapl.price, 150.25);
    assert!(aapl.data.is_none());
    assert!(aapl.is_market_open.is_none());
}

#[tokio::test]
async fn test_second_cycle_publish_is_unchanged() {
    let provider = MockQuoteProvider::new(55, 10);
    provider.set_price("AAPL", "150.25");
    let store = MockInstrumentStore::new();
    store.add(stale("AAPL"));
    store.add(stale("MSFT"));
    let publisher = MockDocumentPublisher::new();
    let sync = service(&provider, &store, &publisher, test_config());

    let first = sync.run_cycle_at(now()).await.unwrap();
    let SyncOutcome::Completed(first) = first else {
        panic!("expected a completed cycle");
    };
    assert_eq!(first.publish, PublishOutcome::Created);

    // MSFT is still stale but the provider has no price for it
    let second = sync.run_cycle_at(now()).await.unwrap();
    let SyncOutcome::Completed(second) = second else {
        panic!("expected a completed cycle");
    };
    assert_eq!(second.selected, vec!["MSFT".to_string()]);
    assert_eq!(second.written, 0);
    assert_eq!(second.publish, PublishOutcome::Unchanged);
}

#[tokio::test]
async fn test_publisher_failure_does_not_fail_cycle() {
    let provider = MockQuoteProvider::new(55, 10);
    provider.set_price("AAPL", "150.25");
    let store = MockInstrumentStore::new();
    store.add(stale("AAPL"));
    let publisher = MockDocumentPublisher::new();
    publisher.set_fail(true);

    let outcome = service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    let SyncOutcome::Completed(report) = outcome else {
        panic!("expected a completed cycle, got {:?}", outcome);
    };
    assert!(matches!(report.publish, PublishOutcome::Failed { .. }));
    assert_eq!(store.record("AAPL").map(|r| r.price), Some(150.25));
}

#[tokio::test]
async fn test_failed_item_does_not_block_siblings() {
    let provider = MockQuoteProvider::new(55, 10);
    provider.set_price("AAPL", "150.25");
    provider.set_price("MSFT", "412.10");
    let store = MockInstrumentStore::new();
    store.add(stale("AAPL"));
    store.add(stale("MSFT"));
    store.fail_updates_for("AAPL");
    let publisher = MockDocumentPublisher::new();

    let outcome = service(&provider, &store, &publisher, test_config())
        .run_cycle_at(now())
        .await
        .unwrap();

    let SyncOutcome::Completed(report) = outcome else {
        panic!("expected a completed cycle, got {:?}", outcome);
    };
    assert_eq!(report.written, 2);
    assert_eq!(report.matched, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(store.record("MSFT").map(|r| r.price), Some(412.10));
    assert_eq!(store.record("AAPL").map(|r| r.price), Some(0.0));
}

#[tokio::test(start_paused = true)]
async fn test_post_write_delay_before_publish() {
    let provider = MockQuoteProvider::new(55, 10);
    provider.set_price("AAPL", "150.25");
    let store = MockInstrumentStore::new();
    store.add(stale("AAPL"));
    let publisher = MockDocumentPublisher::new();
    let config = SyncConfig {
        post_write_delay: StdDuration::from_secs(2),
        ..test_config()
    };

    let started = tokio::time::Instant::now();
    service(&provider, &store, &publisher, config)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert!(started.elapsed() >= StdDuration::from_secs(2));
    assert!(publisher.document("market-data/assets/prices").is_some());
}

#[test]
fn test_outcome_summary() {
    assert_eq!(
        SyncOutcome::QuotaExhausted { remaining: 3 }.summary(),
        "quota exhausted (3 requests left)"
    );
    assert_eq!(SyncOutcome::NothingToUpdate.summary(), "nothing to update");
}
