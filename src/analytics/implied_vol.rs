//! Newton-Raphson implied-volatility solver.

use crate::analytics::black_scholes::{black_scholes, OptionGreeks};
use crate::models::OptionKind;

const INITIAL_GUESS: f64 = 0.20;
const MAX_ITERATIONS: u32 = 100;
/// Absolute price-difference convergence tolerance.
const PRICE_TOLERANCE: f64 = 1e-4;
/// Below this vega the Newton update is ill-conditioned.
const MIN_VEGA: f64 = 1e-10;
const MIN_VOLATILITY: f64 = 0.01;
const MAX_VOLATILITY: f64 = 5.0;

/// Volatility used for Greeks when the solver cannot recover one from the
/// market price.
pub const DEFAULT_VOLATILITY: f64 = 0.20;

/// Outcome of an implied-volatility search. Non-convergence is an
/// expected result for illiquid or mispriced quotes, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IvOutcome {
    Converged(f64),
    NotFound,
}

impl IvOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            IvOutcome::Converged(sigma) => Some(*sigma),
            IvOutcome::NotFound => None,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, IvOutcome::Converged(_))
    }
}

/// Find the volatility at which the Black-Scholes price matches
/// `market_price` within tolerance.
///
/// The iterate is clamped into [0.01, 5.0] after every Newton step; the
/// clamp bounds the next evaluation without terminating the search.
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    time_to_maturity: f64,
    rate: f64,
    kind: OptionKind,
) -> IvOutcome {
    if time_to_maturity <= 0.0 || market_price <= 0.0 {
        return IvOutcome::NotFound;
    }

    let mut sigma = INITIAL_GUESS;

    for _ in 0..MAX_ITERATIONS {
        let greeks = match black_scholes(spot, strike, time_to_maturity, rate, sigma, kind) {
            Ok(greeks) => greeks,
            Err(_) => return IvOutcome::NotFound,
        };

        if (greeks.price - market_price).abs() < PRICE_TOLERANCE {
            return IvOutcome::Converged(sigma);
        }

        if greeks.vega < MIN_VEGA {
            return IvOutcome::NotFound;
        }

        // vega is scaled per 1% vol change, undo that for the raw step
        sigma -= (greeks.price - market_price) / (greeks.vega * 100.0);
        sigma = sigma.clamp(MIN_VOLATILITY, MAX_VOLATILITY);
    }

    IvOutcome::NotFound
}

/// Solve for implied volatility from an observed market price, then price
/// the Greeks at the recovered volatility (falling back to
/// [`DEFAULT_VOLATILITY`] when the search fails).
pub fn greeks_from_market_price(
    spot: f64,
    strike: f64,
    time_to_maturity: f64,
    rate: f64,
    market_price: f64,
    kind: OptionKind,
) -> (IvOutcome, Option<OptionGreeks>) {
    let outcome = implied_volatility(market_price, spot, strike, time_to_maturity, rate, kind);
    let sigma = outcome.value().unwrap_or(DEFAULT_VOLATILITY);

    match black_scholes(spot, strike, time_to_maturity, rate, sigma, kind) {
        Ok(greeks) => (outcome, Some(greeks)),
        Err(_) => (outcome, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_price(sigma: f64, spot: f64, strike: f64, t: f64, kind: OptionKind) -> f64 {
        black_scholes(spot, strike, t, 0.05, sigma, kind).unwrap().price
    }

    #[test]
    fn recovers_known_volatility() {
        for sigma in [0.10, 0.20, 0.35, 0.80, 1.50] {
            let price = model_price(sigma, 450.0, 455.0, 0.25, OptionKind::Call);
            let outcome = implied_volatility(price, 450.0, 455.0, 0.25, 0.05, OptionKind::Call);
            let recovered = outcome.value().expect("solver should converge");
            assert!(
                (recovered - sigma).abs() < 1e-3,
                "sigma={} recovered={}",
                sigma,
                recovered
            );
        }
    }

    #[test]
    fn recovers_volatility_for_puts() {
        let price = model_price(0.45, 440.0, 450.0, 0.5, OptionKind::Put);
        let outcome = implied_volatility(price, 440.0, 450.0, 0.5, 0.05, OptionKind::Put);
        let recovered = outcome.value().expect("solver should converge");
        assert!((recovered - 0.45).abs() < 1e-3);
    }

    #[test]
    fn zero_market_price_reports_not_found() {
        let outcome = implied_volatility(0.0, 450.0, 450.0, 0.25, 0.05, OptionKind::Call);
        assert_eq!(outcome, IvOutcome::NotFound);
    }

    #[test]
    fn expired_option_reports_not_found() {
        let outcome = implied_volatility(5.0, 450.0, 450.0, 0.0, 0.05, OptionKind::Call);
        assert_eq!(outcome, IvOutcome::NotFound);
    }

    #[test]
    fn flat_vega_reports_not_found() {
        // Far out of the money with almost no time left: vega is
        // numerically zero at every admissible volatility.
        let outcome = implied_volatility(50.0, 100.0, 1000.0, 1e-4, 0.05, OptionKind::Call);
        assert_eq!(outcome, IvOutcome::NotFound);
    }

    #[test]
    fn greeks_fall_back_to_default_volatility() {
        let (outcome, greeks) =
            greeks_from_market_price(100.0, 1000.0, 1e-4, 0.05, 50.0, OptionKind::Call);
        assert_eq!(outcome, IvOutcome::NotFound);
        let greeks = greeks.expect("fallback greeks should price");
        let reference = black_scholes(100.0, 1000.0, 1e-4, 0.05, DEFAULT_VOLATILITY, OptionKind::Call)
            .unwrap();
        assert_eq!(greeks, reference);
    }

    #[test]
    fn greeks_use_converged_volatility() {
        let price = model_price(0.30, 450.0, 460.0, 0.25, OptionKind::Call);
        let (outcome, greeks) =
            greeks_from_market_price(450.0, 460.0, 0.25, 0.05, price, OptionKind::Call);
        assert!(outcome.is_converged());
        assert!((greeks.unwrap().price - price).abs() < PRICE_TOLERANCE);
    }
}
