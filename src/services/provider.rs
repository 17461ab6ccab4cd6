//! Market-data provider interface consumed by the orchestrators.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{OptionBar, OptionContract, QuoteSnapshot};

/// Bar aggregation granularity for historical requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarTimeframe {
    Minute,
    Hour,
    Day,
}

impl BarTimeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarTimeframe::Minute => "1Min",
            BarTimeframe::Hour => "1Hour",
            BarTimeframe::Day => "1Day",
        }
    }
}

/// Read-only market data capability. Implementations validate raw
/// payloads into the typed records before returning them.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// All listed contracts on the underlying, optionally filtered to one
    /// expiration date.
    async fn list_contracts(
        &self,
        underlying: &str,
        expiration: Option<NaiveDate>,
    ) -> Result<Vec<OptionContract>, Box<dyn std::error::Error + Send + Sync>>;

    /// Latest quote/trade snapshots keyed by contract symbol. Symbols the
    /// provider has no data for are simply absent from the map.
    async fn get_quotes(
        &self,
        contract_symbols: &[String],
    ) -> Result<HashMap<String, QuoteSnapshot>, Box<dyn std::error::Error + Send + Sync>>;

    /// Current price of the underlying, if the provider has one.
    async fn get_underlying_price(
        &self,
        underlying: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>>;

    /// Historical bars for a contract or equity symbol over
    /// `[start, end)`, oldest first.
    async fn get_historical_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        timeframe: BarTimeframe,
    ) -> Result<Vec<OptionBar>, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_strings_match_the_data_api() {
        assert_eq!(BarTimeframe::Minute.as_str(), "1Min");
        assert_eq!(BarTimeframe::Hour.as_str(), "1Hour");
        assert_eq!(BarTimeframe::Day.as_str(), "1Day");
    }
}
