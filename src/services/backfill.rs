//! Historical replay: walk a date range, rebuild analytics from daily
//! bars, and persist anything not already in the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::analytics::implied_vol::{greeks_from_market_price, IvOutcome};
use crate::models::{NewGreeksRecord, NewIvPoint, OptionBar, OptionContract, QuoteSnapshot};
use crate::services::normalizer::{normalize_quote, representative_price};
use crate::services::provider::{BarTimeframe, MarketDataProvider};
use crate::services::store::AnalyticsStore;

/// Earliest date the provider serves historical options data for.
pub fn historical_data_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
}

pub struct HistoricalBackfill<P, S> {
    provider: P,
    store: S,
    symbol: String,
    risk_free_rate: f64,
    rate_limit: Duration,
    shutdown: Arc<AtomicBool>,
}

impl<P: MarketDataProvider, S: AnalyticsStore> HistoricalBackfill<P, S> {
    pub fn new(
        provider: P,
        store: S,
        symbol: String,
        risk_free_rate: f64,
        rate_limit: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            symbol,
            risk_free_rate,
            rate_limit,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked at the date-loop boundary; setting it stops the run
    /// after the in-flight date finishes.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Replay `[start_date, end_date]` stepped by `step_days`.
    ///
    /// Dates before the provider's availability floor are clamped upward
    /// (reported, not dropped). A failed date is logged and the loop
    /// moves on; the run itself only errors on setup-level problems.
    /// Returns the total number of newly stored analytics records.
    pub async fn backfill_date_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        step_days: u32,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let floor = historical_data_floor();
        let start_date = if start_date < floor {
            tracing::warn!(
                "Historical options data is only available from {} onwards, adjusting start date from {}",
                floor,
                start_date
            );
            floor
        } else {
            start_date
        };

        let step = Days::new(step_days.max(1) as u64);

        tracing::info!(
            "Starting historical backfill for {} from {} to {}",
            self.symbol,
            start_date,
            end_date
        );

        let mut current_date = start_date;
        let mut total_stored: u64 = 0;

        while current_date <= end_date {
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::info!("Shutdown requested, stopping backfill before {}", current_date);
                break;
            }

            match self.process_date(current_date).await {
                Ok(stored) => {
                    total_stored += stored;
                    tracing::info!("Stored {} options for {}", stored, current_date);
                }
                Err(e) => {
                    tracing::error!("Error processing date {}: {}", current_date, e);
                }
            }

            current_date = current_date + step;

            // Rate limiting between provider request bursts
            tokio::time::sleep(self.rate_limit).await;
        }

        tracing::info!("Backfill complete, total records stored: {}", total_stored);

        Ok(total_stored)
    }

    /// All of one day's work: fetch bars, dedup, compute, persist.
    async fn process_date(
        &self,
        date: NaiveDate,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Processing date: {}", date);

        let day_quotes = self.fetch_day_bars(date).await?;

        if day_quotes.is_empty() {
            tracing::warn!("No data found for {}", date);
            return Ok(0);
        }

        let underlying_price = self.underlying_close_on(date).await;

        let window_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let window_end = window_start + chrono::Duration::days(1);

        let mut stored: u64 = 0;

        for (contract, bar) in &day_quotes {
            match self
                .process_option(contract, bar, underlying_price, window_start, window_end)
                .await
            {
                Ok(true) => stored += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        "Error processing option {}: {}",
                        contract.contract_symbol,
                        e
                    );
                }
            }
        }

        Ok(stored)
    }

    /// Daily bars for every contract alive on `date`. Per-contract fetch
    /// failures are logged and the contract is dropped from the day.
    async fn fetch_day_bars(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<(OptionContract, OptionBar)>, Box<dyn std::error::Error + Send + Sync>> {
        let contracts = self.provider.list_contracts(&self.symbol, None).await?;
        let next_day = date + Days::new(1);

        let mut day_quotes = Vec::new();

        for contract in contracts {
            if contract.expiration < date {
                continue;
            }

            match self
                .provider
                .get_historical_bars(&contract.contract_symbol, date, next_day, BarTimeframe::Day)
                .await
            {
                Ok(bars) => {
                    if let Some(bar) = bars.into_iter().next() {
                        day_quotes.push((contract, bar));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to fetch bars for {} on {}: {}",
                        contract.contract_symbol,
                        date,
                        e
                    );
                }
            }
        }

        Ok(day_quotes)
    }

    async fn underlying_close_on(&self, date: NaiveDate) -> Option<f64> {
        match self
            .provider
            .get_historical_bars(&self.symbol, date, date + Days::new(1), BarTimeframe::Day)
            .await
        {
            Ok(bars) => bars.first().map(|bar| bar.close),
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch underlying bar for {} on {}: {}",
                    self.symbol,
                    date,
                    e
                );
                None
            }
        }
    }

    /// Returns Ok(true) when a new analytics record was stored, Ok(false)
    /// on a dedup hit.
    async fn process_option(
        &self,
        contract: &OptionContract,
        bar: &OptionBar,
        underlying_price: Option<f64>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let exists = self
            .store
            .analytics_exists(
                &contract.underlying_symbol,
                contract.strike,
                contract.expiration,
                contract.kind,
                window_start,
                window_end,
            )
            .await?;

        if exists {
            tracing::debug!("Skipping duplicate: {}", contract.contract_symbol);
            return Ok(false);
        }

        // Historical bars carry no bid/ask; the close is the day's last
        // traded price and the bar timestamp is the observation instant.
        let quote = QuoteSnapshot {
            bid: None,
            ask: None,
            last: (bar.close > 0.0).then_some(bar.close),
            observed_at: Some(bar.timestamp),
        };

        let mut record = normalize_quote(contract, &quote, underlying_price, window_start);
        record.volume = bar.volume;

        let derived = match (
            record.underlying_price,
            record.time_to_maturity,
            representative_price(&quote),
        ) {
            (Some(spot), Some(ttm), Some(market_price)) => {
                let (outcome, greeks) = greeks_from_market_price(
                    spot,
                    contract.strike,
                    ttm,
                    self.risk_free_rate,
                    market_price,
                    contract.kind,
                );
                if let IvOutcome::Converged(sigma) = outcome {
                    record.implied_volatility = Some(sigma);
                }
                Some((outcome, greeks))
            }
            _ => None,
        };

        let option_id = self.store.insert_analytics(&record).await?;

        if let Some((outcome, greeks)) = derived {
            if let Some(greeks) = greeks {
                let greeks_record = NewGreeksRecord {
                    option_id,
                    symbol: record.symbol.clone(),
                    kind: record.kind,
                    strike: record.strike,
                    expiration: record.expiration,
                    delta: greeks.delta,
                    gamma: greeks.gamma,
                    theta: greeks.theta,
                    vega: greeks.vega,
                    rho: greeks.rho,
                    created_at: record.created_at,
                };

                if let Err(e) = self.store.insert_greeks(&greeks_record).await {
                    tracing::warn!(
                        "Failed to store Greeks for {}: {}",
                        contract.contract_symbol,
                        e
                    );
                }
            }

            if let IvOutcome::Converged(sigma) = outcome {
                let iv_point = NewIvPoint {
                    symbol: record.symbol.clone(),
                    kind: record.kind,
                    strike: record.strike,
                    expiration: record.expiration,
                    implied_volatility: sigma,
                    time_to_maturity: record.time_to_maturity,
                    recorded_at: record.created_at,
                };

                if let Err(e) = self.store.insert_iv_point(&iv_point).await {
                    tracing::warn!(
                        "Failed to store IV point for {}: {}",
                        contract.contract_symbol,
                        e
                    );
                }
            }
        }

        Ok(true)
    }
}
