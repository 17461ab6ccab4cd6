//! `SeaORM` Entity for the options_data analytics table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "options_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub symbol: String,
    /// 'call' or 'put'
    pub option_type: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub strike_price: Decimal,
    pub expiration_date: Date,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub bid_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub ask_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub last_price: Option<Decimal>,
    pub volume: Option<i64>,
    #[sea_orm(column_type = "Decimal(Some((8, 6)))", nullable)]
    pub implied_volatility: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub underlying_price: Option<Decimal>,
    /// Remaining lifetime in years at observation time
    #[sea_orm(column_type = "Decimal(Some((10, 6)))", nullable)]
    pub time_to_maturity: Option<Decimal>,
    /// Canonical observation timestamp, also the dedup window key
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
