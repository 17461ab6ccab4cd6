//! Live collection pass: fetch the whole chain, derive analytics, persist.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::analytics::implied_vol::{greeks_from_market_price, IvOutcome};
use crate::models::{NewGreeksRecord, NewIvPoint, OptionContract, QuoteSnapshot};
use crate::services::normalizer::{normalize_quote, representative_price};
use crate::services::provider::MarketDataProvider;
use crate::services::store::AnalyticsStore;

pub struct OptionsCollector<P, S> {
    provider: P,
    store: S,
    symbol: String,
    risk_free_rate: f64,
    shutdown: Arc<AtomicBool>,
}

impl<P: MarketDataProvider, S: AnalyticsStore> OptionsCollector<P, S> {
    pub fn new(provider: P, store: S, symbol: String, risk_free_rate: f64) -> Self {
        Self {
            provider,
            store,
            symbol,
            risk_free_rate,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked at the contract-loop boundary; setting it ends the
    /// pass after the in-flight contract finishes.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// One collection pass over every listed contract on the underlying.
    ///
    /// A failure on a single contract is logged and skipped; the pass
    /// only fails as a whole when the chain itself cannot be fetched.
    /// Returns the number of analytics records stored.
    pub async fn collect_and_store(&self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Starting data collection for {}", self.symbol);

        let contracts = self.provider.list_contracts(&self.symbol, None).await?;

        if contracts.is_empty() {
            tracing::warn!("No option contracts retrieved for {}", self.symbol);
            return Ok(0);
        }

        let underlying_price = match self.provider.get_underlying_price(&self.symbol).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!("Failed to fetch underlying price for {}: {}", self.symbol, e);
                None
            }
        };

        let symbols: Vec<String> = contracts
            .iter()
            .map(|c| c.contract_symbol.clone())
            .collect();
        let quotes = self.provider.get_quotes(&symbols).await?;

        let as_of = Utc::now();
        let mut stored_count = 0;

        for contract in &contracts {
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::info!(
                    "Shutdown requested, stopping collection after {} records",
                    stored_count
                );
                break;
            }

            let quote = quotes
                .get(&contract.contract_symbol)
                .cloned()
                .unwrap_or_default();

            match self
                .process_contract(contract, &quote, underlying_price, as_of)
                .await
            {
                Ok(()) => stored_count += 1,
                Err(e) => {
                    tracing::error!(
                        "Error processing option {}: {}",
                        contract.contract_symbol,
                        e
                    );
                }
            }
        }

        tracing::info!("Successfully stored {} options records", stored_count);

        Ok(stored_count)
    }

    /// Normalize one quote, derive IV and Greeks when the inputs allow
    /// it, and persist. The analytics row is written even when the
    /// derived values are unavailable.
    async fn process_contract(
        &self,
        contract: &OptionContract,
        quote: &QuoteSnapshot,
        underlying_price: Option<f64>,
        as_of: chrono::DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut record = normalize_quote(contract, quote, underlying_price, as_of);

        let derived = match (
            record.underlying_price,
            record.time_to_maturity,
            representative_price(quote),
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

        Ok(())
    }
}
