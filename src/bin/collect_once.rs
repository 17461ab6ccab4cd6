// src/bin/collect_once.rs
//
// One-shot collection pass over the configured underlying's chain.

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

use optionflow_backend::config::Config;
use optionflow_backend::services::alpaca::AlpacaClient;
use optionflow_backend::services::collector::OptionsCollector;
use optionflow_backend::services::store::SeaOrmAnalyticsStore;

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
    let collector = OptionsCollector::new(
        alpaca,
        store,
        config.symbol.clone(),
        config.risk_free_rate,
    );

    // Stop at the next contract boundary on ctrl-c
    let shutdown = collector.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });

    println!("Collecting current {} options data...", config.symbol);

    let stored = collector.collect_and_store().await?;

    println!("Collection complete, stored {} records", stored);

    Ok(())
}
