// src/bin/backfill_options_history.rs
//
// Historical options backfill over an explicit or default date range.
//
// Usage: cargo run --bin backfill_options_history -- \
//     [--start-date YYYY-MM-DD] [--end-date YYYY-MM-DD] [--step N]
//
// Defaults: last 30 days through today, daily step. Start dates before
// the provider's availability floor are clamped upward.

use std::env;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

use optionflow_backend::config::Config;
use optionflow_backend::services::alpaca::AlpacaClient;
use optionflow_backend::services::backfill::HistoricalBackfill;
use optionflow_backend::services::store::SeaOrmAnalyticsStore;

struct BackfillArgs {
    start_date: NaiveDate,
    end_date: NaiveDate,
    step_days: u32,
}

fn parse_args(args: &[String]) -> Result<BackfillArgs, String> {
    let today = Utc::now().date_naive();
    let mut parsed = BackfillArgs {
        start_date: today - Days::new(30),
        end_date: today,
        step_days: 1,
    };

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for {}", flag))?;

        match flag.as_str() {
            "--start-date" => {
                parsed.start_date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|e| format!("invalid --start-date '{}': {}", value, e))?;
            }
            "--end-date" => {
                parsed.end_date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|e| format!("invalid --end-date '{}': {}", value, e))?;
            }
            "--step" => {
                parsed.step_days = value
                    .parse()
                    .map_err(|e| format!("invalid --step '{}': {}", value, e))?;
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }

    if parsed.start_date > parsed.end_date {
        return Err("start date must be before end date".to_string());
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let backfill_args = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!(
                "Usage: backfill_options_history [--start-date YYYY-MM-DD] [--end-date YYYY-MM-DD] [--step N]"
            );
            std::process::exit(1);
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let db = Database::connect(&config.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    let alpaca = AlpacaClient::new(
        config.alpaca_api_key.clone(),
        config.alpaca_secret_key.clone(),
        config.alpaca_trading_url.clone(),
        config.alpaca_data_url.clone(),
    );
    let store = SeaOrmAnalyticsStore::new(db);
    let backfill = HistoricalBackfill::new(
        alpaca,
        store,
        config.symbol.clone(),
        config.risk_free_rate,
        Duration::from_millis(config.backfill_rate_limit_ms),
    );

    // Stop at the next date boundary on ctrl-c
    let shutdown = backfill.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });

    println!(
        "Backfilling {} options from {} to {} (step: {} days)",
        config.symbol, backfill_args.start_date, backfill_args.end_date, backfill_args.step_days
    );

    let total = backfill
        .backfill_date_range(
            backfill_args.start_date,
            backfill_args.end_date,
            backfill_args.step_days,
        )
        .await?;

    println!("Backfill complete, total records stored: {}", total);

    Ok(())
}
