//! In-memory doubles for the pipeline's collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pricesync_market_data::{
    ApiUsage, MarketDataError, QuoteDetail, QuoteProvider, RateLimit, RealtimePrice,
};
use serde_json::Value;

use super::model::{
    BulkWriteResult, InstrumentPrice, InstrumentType, NewInstrument, PriceUpdate,
    PublicInstrumentPrice,
};
use super::snapshot::{DocumentPublisher, NewDocument, UpdateResult};
use super::store::InstrumentStore;
use crate::errors::{DatabaseError, Error, Result};

pub fn record_at(
    symbol: &str,
    instrument_type: InstrumentType,
    updated_at: DateTime<Utc>,
) -> InstrumentPrice {
    InstrumentPrice {
        symbol: symbol.to_string(),
        instrument_type,
        price: 0.0,
        is_market_open: None,
        data: None,
        created_at: updated_at,
        updated_at,
    }
}

// =========================================================================
// Mock InstrumentStore
// =========================================================================

#[derive(Clone, Default)]
pub struct MockInstrumentStore {
    records: Arc<Mutex<Vec<InstrumentPrice>>>,
    stale_queries: Arc<Mutex<usize>>,
    bulk_calls: Arc<Mutex<Vec<Vec<PriceUpdate>>>>,
    fail_reads: Arc<Mutex<bool>>,
    fail_symbols: Arc<Mutex<HashSet<String>>>,
}

impl MockInstrumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: InstrumentPrice) {
        self.records.lock().unwrap().push(record);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn fail_updates_for(&self, symbol: &str) {
        self.fail_symbols.lock().unwrap().insert(symbol.to_string());
    }

    pub fn stale_queries(&self) -> usize {
        *self.stale_queries.lock().unwrap()
    }

    pub fn bulk_calls(&self) -> Vec<Vec<PriceUpdate>> {
        self.bulk_calls.lock().unwrap().clone()
    }

    pub fn record(&self, symbol: &str) -> Option<InstrumentPrice> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.symbol == symbol)
            .cloned()
    }

    fn check_reads(&self) -> Result<()> {
        if *self.fail_reads.lock().unwrap() {
            return Err(Error::Database(DatabaseError::ConnectionFailed(
                "Intentional read failure".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InstrumentStore for MockInstrumentStore {
    fn find_stale_symbols(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<Vec<String>> {
        self.check_reads()?;
        *self.stale_queries.lock().unwrap() += 1;

        let mut stale: Vec<InstrumentPrice> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.updated_at < cutoff)
            .cloned()
            .collect();
        stale.sort_by_key(|r| r.updated_at);

        Ok(stale.into_iter().take(limit).map(|r| r.symbol).collect())
    }

    fn list_public(&self) -> Result<Vec<PublicInstrumentPrice>> {
        self.check_reads()?;
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(records.iter().map(InstrumentPrice::to_public).collect())
    }

    fn get(&self, symbol: &str) -> Result<Option<InstrumentPrice>> {
        self.check_reads()?;
        Ok(self.record(symbol))
    }

    fn count(&self) -> Result<usize> {
        self.check_reads()?;
        Ok(self.records.lock().unwrap().len())
    }

    async fn bulk_update_prices(&self, updates: Vec<PriceUpdate>) -> Result<BulkWriteResult> {
        self.bulk_calls.lock().unwrap().push(updates.clone());

        let fail_symbols = self.fail_symbols.lock().unwrap().clone();
        let mut records = self.records.lock().unwrap();
        let mut result = BulkWriteResult::default();

        for update in updates {
            if fail_symbols.contains(update.symbol()) {
                result.failed.push((
                    update.symbol().to_string(),
                    "Intentional update failure".to_string(),
                ));
                continue;
            }
            match records.iter_mut().find(|r| r.symbol == update.symbol()) {
                Some(record) => {
                    update.apply_to(record);
                    result.matched += 1;
                }
                None => result.unmatched.push(update.symbol().to_string()),
            }
        }

        Ok(result)
    }

    async fn insert_many(&self, instruments: Vec<NewInstrument>) -> Result<usize> {
        let mut records = self.records.lock().unwrap();
        let count = instruments.len();
        for instrument in instruments {
            records.push(InstrumentPrice {
                symbol: instrument.symbol,
                instrument_type: instrument.instrument_type,
                price: instrument.price,
                is_market_open: None,
                data: None,
                created_at: instrument.created_at,
                updated_at: instrument.created_at,
            });
        }
        Ok(count)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut records = self.records.lock().unwrap();
        let count = records.len();
        records.clear();
        Ok(count)
    }
}

// =========================================================================
// Mock DocumentPublisher
// =========================================================================

#[derive(Clone, Default)]
pub struct MockDocumentPublisher {
    documents: Arc<Mutex<HashMap<String, Value>>>,
    created: Arc<Mutex<Vec<NewDocument>>>,
    calls: Arc<Mutex<usize>>,
    fail: Arc<Mutex<bool>>,
}

impl MockDocumentPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn created(&self) -> Vec<NewDocument> {
        self.created.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn document(&self, path: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(path).cloned()
    }

    fn begin(&self) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        if *self.fail.lock().unwrap() {
            return Err(Error::Publish("Intentional publish failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentPublisher for MockDocumentPublisher {
    async fn exists(&self, path: &str) -> Result<bool> {
        self.begin()?;
        Ok(self.documents.lock().unwrap().contains_key(path))
    }

    async fn create(&self, document: NewDocument) -> Result<()> {
        self.begin()?;
        let path = format!("{}/{}/{}", document.project, document.folder, document.name);
        self.documents
            .lock()
            .unwrap()
            .insert(path, document.content.clone());
        self.created.lock().unwrap().push(document);
        Ok(())
    }

    async fn update(&self, path: &str, content: Value) -> Result<UpdateResult> {
        self.begin()?;
        let mut documents = self.documents.lock().unwrap();
        let changed = documents.get(path) != Some(&content);
        documents.insert(path.to_string(), content);
        Ok(UpdateResult { changed })
    }
}

// =========================================================================
// Mock QuoteProvider
// =========================================================================

#[derive(Clone)]
pub struct MockQuoteProvider {
    plan_limit: u32,
    current_usage: Arc<Mutex<u32>>,
    prices: Arc<Mutex<HashMap<String, RealtimePrice>>>,
    quotes: Arc<Mutex<HashMap<String, QuoteDetail>>>,
    fail_usage: Arc<Mutex<bool>>,
    fail_prices: Arc<Mutex<bool>>,
    fail_quotes: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<(&'static str, Vec<String>)>>>,
}

impl MockQuoteProvider {
    pub fn new(plan_limit: u32, current_usage: u32) -> Self {
        Self {
            plan_limit,
            current_usage: Arc::new(Mutex::new(current_usage)),
            prices: Arc::new(Mutex::new(HashMap::new())),
            quotes: Arc::new(Mutex::new(HashMap::new())),
            fail_usage: Arc::new(Mutex::new(false)),
            fail_prices: Arc::new(Mutex::new(false)),
            fail_quotes: Arc::new(Mutex::new(false)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_price(&self, symbol: &str, price: &str) {
        self.prices
            .lock()
            .unwrap()
            .insert(symbol.to_string(), RealtimePrice::new(price));
    }

    pub fn set_quote(&self, symbol: &str, quote: QuoteDetail) {
        self.quotes
            .lock()
            .unwrap()
            .insert(symbol.to_string(), quote);
    }

    pub fn set_fail_usage(&self, fail: bool) {
        *self.fail_usage.lock().unwrap() = fail;
    }

    pub fn set_fail_prices(&self, fail: bool) {
        *self.fail_prices.lock().unwrap() = fail;
    }

    pub fn set_fail_quotes(&self, fail: bool) {
        *self.fail_quotes.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<(&'static str, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, endpoint: &'static str, symbols: &[String]) {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint, symbols.to_vec()));
    }

    fn provider_error(message: &str) -> MarketDataError {
        MarketDataError::ProviderError {
            provider: "MOCK".to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: self.plan_limit,
        }
    }

    async fn realtime_prices(
        &self,
        symbols: &[String],
    ) -> std::result::Result<HashMap<String, RealtimePrice>, MarketDataError> {
        self.record_call("price", symbols);
        if *self.fail_prices.lock().unwrap() {
            return Err(Self::provider_error("price batch failed"));
        }
        let prices = self.prices.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| prices.get(s).map(|p| (s.clone(), p.clone())))
            .collect())
    }

    async fn quote_details(
        &self,
        symbols: &[String],
    ) -> std::result::Result<HashMap<String, QuoteDetail>, MarketDataError> {
        self.record_call("quote", symbols);
        if *self.fail_quotes.lock().unwrap() {
            return Err(Self::provider_error("quote batch failed"));
        }
        let quotes = self.quotes.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| quotes.get(s).map(|q| (s.clone(), q.clone())))
            .collect())
    }

    async fn usage(&self) -> std::result::Result<ApiUsage, MarketDataError> {
        self.record_call("usage", &[]);
        if *self.fail_usage.lock().unwrap() {
            return Err(MarketDataError::Timeout {
                provider: "MOCK".to_string(),
            });
        }
        Ok(ApiUsage {
            timestamp: None,
            current_usage: *self.current_usage.lock().unwrap(),
            plan_limit: self.plan_limit,
        })
    }
}
