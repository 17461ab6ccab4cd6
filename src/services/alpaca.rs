//! Alpaca REST adapter for the market-data provider interface.
//!
//! Contract listings come from the trading API; snapshots and bars come
//! from the data API. Raw payloads are validated into typed records here,
//! and zero-priced quote fields are mapped to `None`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use moka::future::Cache;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::models::{OptionBar, OptionContract, OptionKind, QuoteSnapshot};
use crate::services::provider::{BarTimeframe, MarketDataProvider};

const HEADER_API_KEY: &str = "APCA-API-KEY-ID";
const HEADER_SECRET_KEY: &str = "APCA-API-SECRET-KEY";

/// Max contract symbols per snapshot request.
const SNAPSHOT_BATCH_SIZE: usize = 100;
/// Max contracts per listing page.
const CONTRACTS_PAGE_LIMIT: u32 = 10000;

lazy_static! {
    // OCC symbol layout: root, yymmdd expiration, C/P, strike * 1000
    static ref OCC_SYMBOL: Regex = Regex::new(r"^([A-Z]{1,6})(\d{6})([CP])(\d{8})$").unwrap();
}

#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    api_key: String,
    secret_key: String,
    trading_url: String,
    data_url: String,
    contracts_cache: Arc<Cache<String, Vec<OptionContract>>>,
}

#[derive(Debug, Deserialize)]
struct OptionContractsResponse {
    option_contracts: Option<Vec<RawOptionContract>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOptionContract {
    symbol: String,
    underlying_symbol: String,
    expiration_date: String,
    strike_price: Option<String>,
    #[serde(rename = "type")]
    contract_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OptionSnapshotsResponse {
    snapshots: Option<HashMap<String, RawSnapshot>>,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(rename = "latestQuote")]
    latest_quote: Option<RawQuote>,
    #[serde(rename = "latestTrade")]
    latest_trade: Option<RawTrade>,
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(rename = "bp")]
    bid_price: Option<f64>,
    #[serde(rename = "ap")]
    ask_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    #[serde(rename = "p")]
    price: Option<f64>,
    #[serde(rename = "t")]
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct LatestBarResponse {
    bar: Option<RawBar>,
}

#[derive(Debug, Deserialize)]
struct StockBarsResponse {
    bars: Option<Vec<RawBar>>,
}

#[derive(Debug, Deserialize)]
struct OptionBarsResponse {
    bars: Option<HashMap<String, Vec<RawBar>>>,
}

#[derive(Debug, Deserialize)]
struct RawBar {
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: Option<i64>,
    #[serde(rename = "t")]
    timestamp: DateTime<Utc>,
}

impl AlpacaClient {
    pub fn new(
        api_key: String,
        secret_key: String,
        trading_url: String,
        data_url: String,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(3600)) // 1 hour TTL
            .build();

        Self {
            client: Client::new(),
            api_key,
            secret_key,
            trading_url,
            data_url,
            contracts_cache: Arc::new(cache),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("accept", "application/json")
            .header(HEADER_API_KEY, &self.api_key)
            .header(HEADER_SECRET_KEY, &self.secret_key)
    }

    async fn fetch_contracts_page(
        &self,
        underlying: &str,
        expiration: Option<NaiveDate>,
        page_token: Option<&str>,
    ) -> Result<OptionContractsResponse, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/v2/options/contracts", self.trading_url);

        let mut query: Vec<(&str, String)> = vec![
            ("underlying_symbols", underlying.to_string()),
            ("limit", CONTRACTS_PAGE_LIMIT.to_string()),
        ];
        if let Some(date) = expiration {
            query.push(("expiration_date", date.to_string()));
        }
        if let Some(token) = page_token {
            query.push(("page_token", token.to_string()));
        }

        let response = self.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(format!("Alpaca API error {}: {}", status, error_text).into());
        }

        Ok(response.json().await?)
    }
}

/// Treat zero/negative provider prices as absent.
fn positive(price: Option<f64>) -> Option<f64> {
    price.filter(|p| *p > 0.0)
}

/// Decompose an OCC option symbol into (underlying, expiration, kind,
/// strike). Returns `None` for equity symbols and anything malformed.
pub fn parse_occ_symbol(symbol: &str) -> Option<(String, NaiveDate, OptionKind, f64)> {
    let caps = OCC_SYMBOL.captures(symbol)?;

    let expiration = NaiveDate::parse_from_str(&caps[2], "%y%m%d").ok()?;
    let kind = OptionKind::parse(&caps[3])?;
    let strike = caps[4].parse::<f64>().ok()? / 1000.0;

    Some((caps[1].to_string(), expiration, kind, strike))
}

fn validate_contract(raw: RawOptionContract) -> Option<OptionContract> {
    let kind = OptionKind::parse(raw.contract_type.as_deref()?)?;
    let expiration = NaiveDate::parse_from_str(&raw.expiration_date, "%Y-%m-%d").ok()?;
    let strike = raw.strike_price.as_deref()?.parse::<f64>().ok()?;
    if strike <= 0.0 {
        return None;
    }

    Some(OptionContract {
        contract_symbol: raw.symbol,
        underlying_symbol: raw.underlying_symbol,
        kind,
        strike,
        expiration,
    })
}

fn bar_from_raw(raw: RawBar) -> OptionBar {
    OptionBar {
        open: raw.open,
        high: raw.high,
        low: raw.low,
        close: raw.close,
        volume: raw.volume,
        timestamp: raw.timestamp,
    }
}

#[async_trait]
impl MarketDataProvider for AlpacaClient {
    async fn list_contracts(
        &self,
        underlying: &str,
        expiration: Option<NaiveDate>,
    ) -> Result<Vec<OptionContract>, Box<dyn std::error::Error + Send + Sync>> {
        let cache_key = format!(
            "{}_{}",
            underlying,
            expiration.map(|d| d.to_string()).unwrap_or_default()
        );

        if let Some(cached) = self.contracts_cache.get(&cache_key).await {
            tracing::debug!("Contract cache hit for {}", cache_key);
            return Ok(cached);
        }

        tracing::info!("Fetching option contracts for {} from Alpaca", underlying);

        let mut contracts = Vec::new();
        let mut dropped = 0usize;
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .fetch_contracts_page(underlying, expiration, page_token.as_deref())
                .await?;

            for raw in page.option_contracts.unwrap_or_default() {
                let symbol = raw.symbol.clone();
                match validate_contract(raw) {
                    Some(contract) => contracts.push(contract),
                    None => {
                        tracing::warn!("Skipping malformed contract listing: {}", symbol);
                        dropped += 1;
                    }
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!(
            "Fetched {} option contracts for {} ({} malformed entries dropped)",
            contracts.len(),
            underlying,
            dropped
        );

        self.contracts_cache
            .insert(cache_key, contracts.clone())
            .await;

        Ok(contracts)
    }

    async fn get_quotes(
        &self,
        contract_symbols: &[String],
    ) -> Result<HashMap<String, QuoteSnapshot>, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/v1beta1/options/snapshots", self.data_url);
        let mut quotes = HashMap::with_capacity(contract_symbols.len());

        for chunk in contract_symbols.chunks(SNAPSHOT_BATCH_SIZE) {
            let response = self
                .get(&url)
                .query(&[("symbols", chunk.join(","))])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await?;
                return Err(format!("Alpaca API error {}: {}", status, error_text).into());
            }

            let data: OptionSnapshotsResponse = response.json().await?;

            for (symbol, snapshot) in data.snapshots.unwrap_or_default() {
                let (last, observed_at) = snapshot
                    .latest_trade
                    .map(|trade| (positive(trade.price), trade.timestamp))
                    .unwrap_or((None, None));
                let (bid, ask) = snapshot
                    .latest_quote
                    .map(|quote| (positive(quote.bid_price), positive(quote.ask_price)))
                    .unwrap_or((None, None));

                quotes.insert(
                    symbol,
                    QuoteSnapshot {
                        bid,
                        ask,
                        last,
                        observed_at,
                    },
                );
            }
        }

        tracing::debug!(
            "Fetched snapshots for {} of {} contracts",
            quotes.len(),
            contract_symbols.len()
        );

        Ok(quotes)
    }

    async fn get_underlying_price(
        &self,
        underlying: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/v2/stocks/{}/bars/latest", self.data_url, underlying);

        let response = self.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(format!("Alpaca API error {}: {}", status, error_text).into());
        }

        let data: LatestBarResponse = response.json().await?;

        Ok(data.bar.map(|bar| bar.close))
    }

    async fn get_historical_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        timeframe: BarTimeframe,
    ) -> Result<Vec<OptionBar>, Box<dyn std::error::Error + Send + Sync>> {
        // The data API treats `end` as inclusive; the trait contract is
        // half-open [start, end).
        let end_inclusive = end.pred_opt().unwrap_or(end);
        let query = [
            ("timeframe", timeframe.as_str().to_string()),
            ("start", start.to_string()),
            ("end", end_inclusive.to_string()),
        ];

        if parse_occ_symbol(symbol).is_some() {
            let url = format!("{}/v1beta1/options/bars", self.data_url);
            let response = self
                .get(&url)
                .query(&query)
                .query(&[("symbols", symbol)])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await?;
                return Err(format!("Alpaca API error {}: {}", status, error_text).into());
            }

            let data: OptionBarsResponse = response.json().await?;
            let bars = data
                .bars
                .unwrap_or_default()
                .remove(symbol)
                .unwrap_or_default();

            Ok(bars.into_iter().map(bar_from_raw).collect())
        } else {
            let url = format!("{}/v2/stocks/{}/bars", self.data_url, symbol);
            let response = self.get(&url).query(&query).send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await?;
                return Err(format!("Alpaca API error {}: {}", status, error_text).into());
            }

            let data: StockBarsResponse = response.json().await?;

            Ok(data
                .bars
                .unwrap_or_default()
                .into_iter()
                .map(bar_from_raw)
                .collect())
        }
    }
}
