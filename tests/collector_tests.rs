//! Collection-orchestrator behavior against mock provider/store pairs.

mod common;

use std::collections::HashMap;

use chrono::{Days, NaiveDate, Utc};

use optionflow_backend::analytics::black_scholes::black_scholes;
use optionflow_backend::models::{OptionKind, QuoteSnapshot};
use optionflow_backend::services::collector::OptionsCollector;
use optionflow_backend::services::normalizer::time_to_maturity;

use common::{contract, MockProvider, MockProviderInner, MockStore, MockStoreInner};

const RATE: f64 = 0.05;
const SPOT: f64 = 450.0;

fn future_expiration() -> NaiveDate {
    Utc::now().date_naive() + Days::new(91)
}

/// Model price for the contract as the collector will see it (TTM is
/// measured from today).
fn model_price(kind: OptionKind, strike: f64, expiration: NaiveDate, sigma: f64) -> f64 {
    let ttm = time_to_maturity(expiration, Utc::now().date_naive());
    black_scholes(SPOT, strike, ttm, RATE, sigma, kind)
        .unwrap()
        .price
}

fn collector(
    provider: MockProvider,
    store: MockStore,
) -> OptionsCollector<MockProvider, MockStore> {
    OptionsCollector::new(provider, store, "SPY".to_string(), RATE)
}

#[tokio::test]
async fn stores_analytics_greeks_and_iv_for_full_quotes() {
    let expiration = future_expiration();
    let call_price = model_price(OptionKind::Call, 455.0, expiration, 0.25);
    let put_price = model_price(OptionKind::Put, 445.0, expiration, 0.30);

    let mut quotes = HashMap::new();
    quotes.insert(
        "SPY_C455".to_string(),
        QuoteSnapshot {
            bid: Some(call_price - 0.5),
            ask: Some(call_price + 0.5),
            last: None,
            observed_at: None,
        },
    );
    quotes.insert(
        "SPY_P445".to_string(),
        QuoteSnapshot {
            bid: None,
            ask: None,
            last: Some(put_price),
            observed_at: None,
        },
    );

    let provider = MockProvider::new(MockProviderInner {
        contracts: vec![
            contract("SPY_C455", OptionKind::Call, 455.0, expiration),
            contract("SPY_P445", OptionKind::Put, 445.0, expiration),
        ],
        quotes,
        underlying_price: Some(SPOT),
        ..Default::default()
    });
    let store = MockStore::default();

    let stored = collector(provider, store.clone())
        .collect_and_store()
        .await
        .unwrap();

    assert_eq!(stored, 2);
    let analytics = store.analytics();
    assert_eq!(analytics.len(), 2);
    assert_eq!(store.greeks().len(), 2);
    assert_eq!(store.iv_points().len(), 2);

    // The solver should recover the volatilities the quotes were priced at
    let call_iv = analytics[0].implied_volatility.unwrap();
    let put_iv = analytics[1].implied_volatility.unwrap();
    assert!((call_iv - 0.25).abs() < 1e-3, "call iv={}", call_iv);
    assert!((put_iv - 0.30).abs() < 1e-3, "put iv={}", put_iv);

    // Greeks rows point at their analytics rows
    assert_eq!(store.greeks()[0].option_id, 1);
    assert_eq!(store.greeks()[1].option_id, 2);
}

#[tokio::test]
async fn empty_contract_list_is_a_noop() {
    let provider = MockProvider::default();
    let store = MockStore::default();

    let stored = collector(provider, store.clone())
        .collect_and_store()
        .await
        .unwrap();

    assert_eq!(stored, 0);
    assert!(store.analytics().is_empty());
}

#[tokio::test]
async fn contract_without_quote_still_stores_an_analytics_row() {
    let expiration = future_expiration();
    let provider = MockProvider::new(MockProviderInner {
        contracts: vec![contract("SPY_C460", OptionKind::Call, 460.0, expiration)],
        underlying_price: Some(SPOT),
        ..Default::default()
    });
    let store = MockStore::default();

    let stored = collector(provider, store.clone())
        .collect_and_store()
        .await
        .unwrap();

    assert_eq!(stored, 1);
    let analytics = store.analytics();
    assert_eq!(analytics.len(), 1);
    assert_eq!(analytics[0].bid_price, None);
    assert_eq!(analytics[0].last_price, None);
    assert_eq!(analytics[0].implied_volatility, None);
    assert!(store.greeks().is_empty());
    assert!(store.iv_points().is_empty());
}

#[tokio::test]
async fn missing_underlying_price_skips_greeks_but_not_analytics() {
    let expiration = future_expiration();
    let mut quotes = HashMap::new();
    quotes.insert(
        "SPY_C455".to_string(),
        QuoteSnapshot {
            bid: Some(10.0),
            ask: Some(11.0),
            last: None,
            observed_at: None,
        },
    );

    let provider = MockProvider::new(MockProviderInner {
        contracts: vec![contract("SPY_C455", OptionKind::Call, 455.0, expiration)],
        quotes,
        underlying_price: None,
        ..Default::default()
    });
    let store = MockStore::default();

    let stored = collector(provider, store.clone())
        .collect_and_store()
        .await
        .unwrap();

    assert_eq!(stored, 1);
    assert_eq!(store.analytics().len(), 1);
    assert!(store.greeks().is_empty());
}

#[tokio::test]
async fn failed_insert_does_not_abort_the_pass() {
    let expiration = future_expiration();
    let provider = MockProvider::new(MockProviderInner {
        contracts: vec![
            contract("SPY_C455", OptionKind::Call, 455.0, expiration),
            contract("SPY_C460", OptionKind::Call, 460.0, expiration),
        ],
        underlying_price: Some(SPOT),
        ..Default::default()
    });
    let store = MockStore::new(MockStoreInner {
        fail_strikes: vec![455.0],
        ..Default::default()
    });

    let stored = collector(provider, store.clone())
        .collect_and_store()
        .await
        .unwrap();

    assert_eq!(stored, 1);
    let analytics = store.analytics();
    assert_eq!(analytics.len(), 1);
    assert_eq!(analytics[0].strike, 460.0);
}
