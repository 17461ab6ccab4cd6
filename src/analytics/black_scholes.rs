//! Closed-form Black-Scholes pricing and Greeks for European options.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use thiserror::Error;

use crate::models::OptionKind;

/// Price plus the five standard sensitivities.
///
/// Theta is expressed per calendar day, vega per one volatility point
/// (1% absolute) and rho per one rate point. The implied-volatility
/// solver relies on vega keeping this 1/100 scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionGreeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PricingError {
    #[error("spot and strike must be positive (spot={spot}, strike={strike})")]
    NonPositiveInput { spot: f64, strike: f64 },
    #[error("volatility must be positive for an unexpired option")]
    ZeroVolatility,
}

fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).unwrap()
}

/// Black-Scholes price and Greeks for `(S, K, T, r, sigma)`.
///
/// At or past expiry (`T <= 0`) the price is exactly the intrinsic value,
/// delta is 1.0 in the money and 0.0 otherwise, and the remaining Greeks
/// are zero.
pub fn black_scholes(
    spot: f64,
    strike: f64,
    time_to_maturity: f64,
    rate: f64,
    volatility: f64,
    kind: OptionKind,
) -> Result<OptionGreeks, PricingError> {
    if spot <= 0.0 || strike <= 0.0 {
        return Err(PricingError::NonPositiveInput { spot, strike });
    }

    if time_to_maturity <= 0.0 {
        return Ok(expired(spot, strike, kind));
    }

    if volatility <= 0.0 {
        return Err(PricingError::ZeroVolatility);
    }

    let normal = standard_normal();
    let sqrt_t = time_to_maturity.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * time_to_maturity)
        / (volatility * sqrt_t);
    let d2 = d1 - volatility * sqrt_t;
    let discount = (-rate * time_to_maturity).exp();
    let pdf_d1 = normal.pdf(d1);

    let (price, delta, theta, rho) = match kind {
        OptionKind::Call => {
            let price = spot * normal.cdf(d1) - strike * discount * normal.cdf(d2);
            let delta = normal.cdf(d1);
            let theta = (-(spot * pdf_d1 * volatility) / (2.0 * sqrt_t)
                - rate * strike * discount * normal.cdf(d2))
                / 365.0;
            let rho = strike * time_to_maturity * discount * normal.cdf(d2) / 100.0;
            (price, delta, theta, rho)
        }
        OptionKind::Put => {
            let price = strike * discount * normal.cdf(-d2) - spot * normal.cdf(-d1);
            let delta = -normal.cdf(-d1);
            let theta = (-(spot * pdf_d1 * volatility) / (2.0 * sqrt_t)
                + rate * strike * discount * normal.cdf(-d2))
                / 365.0;
            let rho = -strike * time_to_maturity * discount * normal.cdf(-d2) / 100.0;
            (price, delta, theta, rho)
        }
    };

    let gamma = pdf_d1 / (spot * volatility * sqrt_t);
    let vega = spot * pdf_d1 * sqrt_t / 100.0;

    Ok(OptionGreeks {
        price,
        delta,
        gamma,
        theta,
        vega,
        rho,
    })
}

fn expired(spot: f64, strike: f64, kind: OptionKind) -> OptionGreeks {
    let (price, in_the_money) = match kind {
        OptionKind::Call => ((spot - strike).max(0.0), spot > strike),
        OptionKind::Put => ((strike - spot).max(0.0), spot < strike),
    };

    OptionGreeks {
        price,
        delta: if in_the_money { 1.0 } else { 0.0 },
        gamma: 0.0,
        theta: 0.0,
        vega: 0.0,
        rho: 0.0,
    }
}
