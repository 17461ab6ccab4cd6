//! Environment-variable configuration.
//!
//! Required variables (`ALPACA_API_KEY`, `ALPACA_SECRET_KEY`,
//! `DATABASE_URL`) are fatal when missing; everything else has a
//! documented default.

use std::env;

use thiserror::Error;

const ENV_ALPACA_API_KEY: &str = "ALPACA_API_KEY";
const ENV_ALPACA_SECRET_KEY: &str = "ALPACA_SECRET_KEY";
const ENV_ALPACA_TRADING_URL: &str = "ALPACA_TRADING_URL";
const ENV_ALPACA_DATA_URL: &str = "ALPACA_DATA_URL";
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_SYMBOL: &str = "OPTIONS_SYMBOL";
const ENV_RISK_FREE_RATE: &str = "RISK_FREE_RATE";
const ENV_COLLECTION_INTERVAL: &str = "COLLECTION_INTERVAL_SECS";
const ENV_BACKFILL_RATE_LIMIT: &str = "BACKFILL_RATE_LIMIT_MS";

const DEFAULT_TRADING_URL: &str = "https://paper-api.alpaca.markets";
const DEFAULT_DATA_URL: &str = "https://data.alpaca.markets";
const DEFAULT_SYMBOL: &str = "SPY";
const DEFAULT_RISK_FREE_RATE: f64 = 0.05;
const DEFAULT_COLLECTION_INTERVAL_SECS: u64 = 900;
const DEFAULT_BACKFILL_RATE_LIMIT_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidVar { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub alpaca_api_key: String,
    pub alpaca_secret_key: String,
    pub alpaca_trading_url: String,
    pub alpaca_data_url: String,
    pub database_url: String,
    pub symbol: String,
    pub risk_free_rate: f64,
    pub collection_interval_secs: u64,
    pub backfill_rate_limit_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            alpaca_api_key: required(ENV_ALPACA_API_KEY)?,
            alpaca_secret_key: required(ENV_ALPACA_SECRET_KEY)?,
            alpaca_trading_url: env::var(ENV_ALPACA_TRADING_URL)
                .unwrap_or_else(|_| DEFAULT_TRADING_URL.to_string()),
            alpaca_data_url: env::var(ENV_ALPACA_DATA_URL)
                .unwrap_or_else(|_| DEFAULT_DATA_URL.to_string()),
            database_url: required(ENV_DATABASE_URL)?,
            symbol: env::var(ENV_SYMBOL).unwrap_or_else(|_| DEFAULT_SYMBOL.to_string()),
            risk_free_rate: parsed(ENV_RISK_FREE_RATE, DEFAULT_RISK_FREE_RATE)?,
            collection_interval_secs: parsed(
                ENV_COLLECTION_INTERVAL,
                DEFAULT_COLLECTION_INTERVAL_SECS,
            )?,
            backfill_rate_limit_ms: parsed(ENV_BACKFILL_RATE_LIMIT, DEFAULT_BACKFILL_RATE_LIMIT_MS)?,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

fn parsed<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        Err(_) => Ok(default),
    }
}
