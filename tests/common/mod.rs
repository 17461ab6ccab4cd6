//! In-memory provider/store doubles for orchestrator tests.

// Not every test binary exercises every helper
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use optionflow_backend::models::{
    NewAnalyticsRecord, NewGreeksRecord, NewIvPoint, OptionBar, OptionContract, OptionKind,
    QuoteSnapshot,
};
use optionflow_backend::services::provider::{BarTimeframe, MarketDataProvider};
use optionflow_backend::services::store::AnalyticsStore;

#[derive(Default)]
pub struct MockProviderInner {
    pub contracts: Vec<OptionContract>,
    pub quotes: HashMap<String, QuoteSnapshot>,
    pub underlying_price: Option<f64>,
    /// (symbol, start date) -> that day's bar
    pub bars: HashMap<(String, NaiveDate), OptionBar>,
    /// 1-based listing call number that should fail, to poison one date
    pub fail_listing_on_call: Option<usize>,
    pub listing_calls: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MockProvider {
    inner: Arc<MockProviderInner>,
}

impl MockProvider {
    pub fn new(inner: MockProviderInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn listing_calls(&self) -> usize {
        self.inner.listing_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn list_contracts(
        &self,
        _underlying: &str,
        _expiration: Option<NaiveDate>,
    ) -> Result<Vec<OptionContract>, Box<dyn std::error::Error + Send + Sync>> {
        let call = self.inner.listing_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.inner.fail_listing_on_call == Some(call) {
            return Err("provider outage".into());
        }
        Ok(self.inner.contracts.clone())
    }

    async fn get_quotes(
        &self,
        contract_symbols: &[String],
    ) -> Result<HashMap<String, QuoteSnapshot>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .inner
            .quotes
            .iter()
            .filter(|(symbol, _)| contract_symbols.contains(symbol))
            .map(|(symbol, quote)| (symbol.clone(), quote.clone()))
            .collect())
    }

    async fn get_underlying_price(
        &self,
        _underlying: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.inner.underlying_price)
    }

    async fn get_historical_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        _end: NaiveDate,
        _timeframe: BarTimeframe,
    ) -> Result<Vec<OptionBar>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .inner
            .bars
            .get(&(symbol.to_string(), start))
            .cloned()
            .into_iter()
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<MockStoreInner>,
}

#[derive(Default)]
pub struct MockStoreInner {
    pub analytics: Mutex<Vec<NewAnalyticsRecord>>,
    pub greeks: Mutex<Vec<NewGreeksRecord>>,
    pub iv_points: Mutex<Vec<NewIvPoint>>,
    /// Inserts for these strikes fail, to exercise per-unit isolation
    pub fail_strikes: Vec<f64>,
}

impl MockStore {
    pub fn new(inner: MockStoreInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn analytics(&self) -> Vec<NewAnalyticsRecord> {
        self.inner.analytics.lock().unwrap().clone()
    }

    pub fn greeks(&self) -> Vec<NewGreeksRecord> {
        self.inner.greeks.lock().unwrap().clone()
    }

    pub fn iv_points(&self) -> Vec<NewIvPoint> {
        self.inner.iv_points.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsStore for MockStore {
    async fn insert_analytics(
        &self,
        record: &NewAnalyticsRecord,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        if self
            .inner
            .fail_strikes
            .iter()
            .any(|strike| (strike - record.strike).abs() < 1e-9)
        {
            return Err("insert failed".into());
        }

        let mut analytics = self.inner.analytics.lock().unwrap();
        analytics.push(record.clone());
        Ok(analytics.len() as i64)
    }

    async fn insert_greeks(
        &self,
        record: &NewGreeksRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.greeks.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn insert_iv_point(
        &self,
        record: &NewIvPoint,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.iv_points.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn analytics_exists(
        &self,
        symbol: &str,
        strike: f64,
        expiration: NaiveDate,
        kind: OptionKind,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.inner.analytics.lock().unwrap().iter().any(|record| {
            record.symbol == symbol
                && (record.strike - strike).abs() < 1e-9
                && record.expiration == expiration
                && record.kind == kind
                && record.created_at >= window_start
                && record.created_at < window_end
        }))
    }
}

pub fn contract(
    contract_symbol: &str,
    kind: OptionKind,
    strike: f64,
    expiration: NaiveDate,
) -> OptionContract {
    OptionContract {
        contract_symbol: contract_symbol.to_string(),
        underlying_symbol: "SPY".to_string(),
        kind,
        strike,
        expiration,
    }
}
