//! Persistence interface for analytics output, and its Postgres
//! implementation over the three SeaORM entities.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};

use crate::entities::prelude::OptionsData;
use crate::entities::{greeks_data, iv_evolution, options_data};
use crate::models::{NewAnalyticsRecord, NewGreeksRecord, NewIvPoint, OptionKind};

/// Write-side capability consumed by the orchestrators. Each insert is a
/// single record; `analytics_exists` backs the backfill dedup check.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Insert one analytics record, returning its generated id.
    async fn insert_analytics(
        &self,
        record: &NewAnalyticsRecord,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>>;

    async fn insert_greeks(
        &self,
        record: &NewGreeksRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn insert_iv_point(
        &self,
        record: &NewIvPoint,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Whether an analytics record already exists for the contract with a
    /// creation timestamp inside `[window_start, window_end)`.
    async fn analytics_exists(
        &self,
        symbol: &str,
        strike: f64,
        expiration: NaiveDate,
        kind: OptionKind,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Clone)]
pub struct SeaOrmAnalyticsStore {
    db: DatabaseConnection,
}

impl SeaOrmAnalyticsStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn decimal(value: f64) -> Result<Decimal, Box<dyn std::error::Error + Send + Sync>> {
    Decimal::from_f64_retain(value).ok_or_else(|| format!("non-finite value: {}", value).into())
}

fn optional_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64_retain)
}

#[async_trait]
impl AnalyticsStore for SeaOrmAnalyticsStore {
    async fn insert_analytics(
        &self,
        record: &NewAnalyticsRecord,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        let row = options_data::ActiveModel {
            symbol: Set(record.symbol.clone()),
            option_type: Set(record.kind.as_str().to_string()),
            strike_price: Set(decimal(record.strike)?),
            expiration_date: Set(record.expiration),
            bid_price: Set(optional_decimal(record.bid_price)),
            ask_price: Set(optional_decimal(record.ask_price)),
            last_price: Set(optional_decimal(record.last_price)),
            volume: Set(record.volume),
            implied_volatility: Set(optional_decimal(record.implied_volatility)),
            underlying_price: Set(optional_decimal(record.underlying_price)),
            time_to_maturity: Set(optional_decimal(record.time_to_maturity)),
            created_at: Set(record.created_at.fixed_offset()),
            ..Default::default()
        };

        let stored = row.insert(&self.db).await?;
        Ok(stored.id)
    }

    async fn insert_greeks(
        &self,
        record: &NewGreeksRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let row = greeks_data::ActiveModel {
            option_id: Set(record.option_id),
            symbol: Set(record.symbol.clone()),
            strike_price: Set(decimal(record.strike)?),
            expiration_date: Set(record.expiration),
            option_type: Set(record.kind.as_str().to_string()),
            delta: Set(optional_decimal(Some(record.delta))),
            gamma: Set(optional_decimal(Some(record.gamma))),
            theta: Set(optional_decimal(Some(record.theta))),
            vega: Set(optional_decimal(Some(record.vega))),
            rho: Set(optional_decimal(Some(record.rho))),
            created_at: Set(record.created_at.fixed_offset()),
            ..Default::default()
        };

        row.insert(&self.db).await?;
        Ok(())
    }

    async fn insert_iv_point(
        &self,
        record: &NewIvPoint,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let row = iv_evolution::ActiveModel {
            symbol: Set(record.symbol.clone()),
            strike_price: Set(decimal(record.strike)?),
            expiration_date: Set(record.expiration),
            option_type: Set(record.kind.as_str().to_string()),
            implied_volatility: Set(decimal(record.implied_volatility)?),
            time_to_maturity: Set(optional_decimal(record.time_to_maturity)),
            recorded_at: Set(record.recorded_at.fixed_offset()),
            ..Default::default()
        };

        row.insert(&self.db).await?;
        Ok(())
    }

    async fn analytics_exists(
        &self,
        symbol: &str,
        strike: f64,
        expiration: NaiveDate,
        kind: OptionKind,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let existing = OptionsData::find()
            .filter(options_data::Column::Symbol.eq(symbol))
            .filter(options_data::Column::StrikePrice.eq(decimal(strike)?))
            .filter(options_data::Column::ExpirationDate.eq(expiration))
            .filter(options_data::Column::OptionType.eq(kind.as_str()))
            .filter(options_data::Column::CreatedAt.gte(window_start.fixed_offset()))
            .filter(options_data::Column::CreatedAt.lt(window_end.fixed_offset()))
            .limit(1)
            .one(&self.db)
            .await?;

        Ok(existing.is_some())
    }
}
