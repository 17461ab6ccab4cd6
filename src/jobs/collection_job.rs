//! Continuous Collection Loop
//!
//! Runs one collection pass immediately, then re-fires on a fixed
//! wall-clock interval driven by an explicit scheduler.
//! Supports graceful shutdown via SIGTERM/SIGINT signals.

use chrono::Utc;
use tokio::time::Duration as TokioDuration;
use tracing::{error, info};

use crate::services::collector::OptionsCollector;
use crate::services::provider::MarketDataProvider;
use crate::services::scheduler::IntervalScheduler;
use crate::services::store::AnalyticsStore;

/// How often the loop wakes up to poll the scheduler.
const SCHEDULER_TICK_SECS: u64 = 60;

/// Run the collection loop until a shutdown signal arrives.
///
/// The scheduler owns the next-fire-time state; the loop only supplies
/// clock instants, so collection cadence survives slow passes without
/// catch-up bursts.
pub async fn run_collection_loop<P, S>(collector: OptionsCollector<P, S>, interval_secs: u64)
where
    P: MarketDataProvider,
    S: AnalyticsStore,
{
    info!(
        "Starting continuous data collection (every {} seconds)",
        interval_secs
    );

    // Run immediately on startup
    run_pass(&collector).await;

    let mut scheduler = IntervalScheduler::new(interval_secs, Utc::now());
    let tick = SCHEDULER_TICK_SECS.min(interval_secs).max(1);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping collection loop gracefully");
                break;
            }
            _ = tokio::time::sleep(TokioDuration::from_secs(tick)) => {
                if scheduler.poll(Utc::now()) {
                    run_pass(&collector).await;
                }
            }
        }
    }
}

async fn run_pass<P, S>(collector: &OptionsCollector<P, S>)
where
    P: MarketDataProvider,
    S: AnalyticsStore,
{
    match collector.collect_and_store().await {
        Ok(count) => info!("Collection run stored {} records", count),
        Err(e) => error!("Error in data collection: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_never_exceeds_the_collection_interval() {
        assert_eq!(SCHEDULER_TICK_SECS, 60);
        assert_eq!(SCHEDULER_TICK_SECS.min(30).max(1), 30);
        assert_eq!(SCHEDULER_TICK_SECS.min(0).max(1), 1);
    }
}
