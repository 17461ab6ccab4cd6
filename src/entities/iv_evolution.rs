//! `SeaORM` Entity for implied-volatility time-series observations

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "iv_evolution")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub symbol: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub strike_price: Decimal,
    pub expiration_date: Date,
    pub option_type: String,
    #[sea_orm(column_type = "Decimal(Some((8, 6)))")]
    pub implied_volatility: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 6)))", nullable)]
    pub time_to_maturity: Option<Decimal>,
    pub recorded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
