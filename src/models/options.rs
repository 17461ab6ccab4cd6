//! Typed records for option contracts, quotes and analytics rows.
//!
//! Provider adapters validate raw payloads into these shapes at the
//! boundary; the orchestration and analytics code never sees an untyped
//! response body.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Call/put discriminator, serialized as 'call' / 'put' in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        }
    }

    /// Parse a provider-side kind string. Accepts the long form used by
    /// contract listings and the single letter used in OCC symbols.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "call" | "C" => Some(OptionKind::Call),
            "put" | "P" => Some(OptionKind::Put),
            _ => None,
        }
    }
}

/// A unique tradable instrument for one (expiration, strike, kind) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// OCC contract symbol, e.g. "SPY240216C00450000"
    pub contract_symbol: String,
    pub underlying_symbol: String,
    pub kind: OptionKind,
    pub strike: f64,
    pub expiration: NaiveDate,
}

/// Point-in-time market data for one contract. Any subset of the price
/// fields may be absent; adapters map zero-priced quotes to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last: Option<f64>,
    pub observed_at: Option<DateTime<Utc>>,
}

/// One aggregated bar from the historical data feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

/// Draft analytics row, the unit of persistence.
///
/// `created_at` is the canonical observation timestamp and is always set
/// explicitly by the normalizer; the dedup window compares against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnalyticsRecord {
    pub symbol: String,
    pub kind: OptionKind,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub bid_price: Option<f64>,
    pub ask_price: Option<f64>,
    pub last_price: Option<f64>,
    pub volume: Option<i64>,
    pub underlying_price: Option<f64>,
    /// Years until expiration, relative to the observation date.
    pub time_to_maturity: Option<f64>,
    pub implied_volatility: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Greeks row, foreign-keyed to one stored analytics record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGreeksRecord {
    pub option_id: i64,
    pub symbol: String,
    pub kind: OptionKind,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
    pub created_at: DateTime<Utc>,
}

/// One implied-volatility observation for surface/term-structure series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIvPoint {
    pub symbol: String,
    pub kind: OptionKind,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub implied_volatility: f64,
    pub time_to_maturity: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_kind_round_trips_through_str() {
        assert_eq!(OptionKind::parse("call"), Some(OptionKind::Call));
        assert_eq!(OptionKind::parse("put"), Some(OptionKind::Put));
        assert_eq!(OptionKind::parse("P"), Some(OptionKind::Put));
        assert_eq!(OptionKind::parse("straddle"), None);
        assert_eq!(OptionKind::Call.as_str(), "call");
        assert_eq!(OptionKind::Put.as_str(), "put");
    }
}
