//! Folds a contract, its quote and the underlying price into a draft
//! analytics record.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{NewAnalyticsRecord, OptionContract, QuoteSnapshot};

const DAYS_PER_YEAR: f64 = 365.0;

/// The price fed to the implied-volatility solver: mid of bid/ask when
/// both sides are quoted, else the last trade. Never bid or ask alone.
pub fn representative_price(quote: &QuoteSnapshot) -> Option<f64> {
    match (quote.bid, quote.ask) {
        (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
        _ => quote.last,
    }
}

/// Remaining lifetime in years, by calendar-day count over 365.
/// Negative once the contract has expired relative to `as_of`.
pub fn time_to_maturity(expiration: NaiveDate, as_of: NaiveDate) -> f64 {
    (expiration - as_of).num_days() as f64 / DAYS_PER_YEAR
}

/// Build the draft analytics record for one observation.
///
/// `created_at` is the quote's own observation timestamp when the
/// provider supplied one, else `as_of`; time-to-maturity is measured
/// against the same instant. Implied volatility is left unset for the
/// orchestrator to fill after the solver runs.
pub fn normalize_quote(
    contract: &OptionContract,
    quote: &QuoteSnapshot,
    underlying_price: Option<f64>,
    as_of: DateTime<Utc>,
) -> NewAnalyticsRecord {
    let observed_at = quote.observed_at.unwrap_or(as_of);

    NewAnalyticsRecord {
        symbol: contract.underlying_symbol.clone(),
        kind: contract.kind,
        strike: contract.strike,
        expiration: contract.expiration,
        bid_price: quote.bid,
        ask_price: quote.ask,
        last_price: quote.last,
        volume: None,
        underlying_price,
        time_to_maturity: Some(time_to_maturity(contract.expiration, observed_at.date_naive())),
        implied_volatility: None,
        created_at: observed_at,
    }
}
