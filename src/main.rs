use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use optionflow_backend::config::Config;
use optionflow_backend::jobs::collection_job::run_collection_loop;
use optionflow_backend::services::alpaca::AlpacaClient;
use optionflow_backend::services::collector::OptionsCollector;
use optionflow_backend::services::store::SeaOrmAnalyticsStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,optionflow_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

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

    // An in-flight pass stops at the next contract boundary on ctrl-c;
    // the loop itself exits on the same signal between passes.
    let shutdown = collector.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });

    run_collection_loop(collector, config.collection_interval_secs).await;
}
