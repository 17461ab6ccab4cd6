//! `SeaORM` Entity for per-record option Greeks

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "greeks_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Foreign key into options_data
    pub option_id: i64,
    pub symbol: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub strike_price: Decimal,
    pub expiration_date: Date,
    pub option_type: String,
    #[sea_orm(column_type = "Decimal(Some((10, 6)))", nullable)]
    pub delta: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 6)))", nullable)]
    pub gamma: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 6)))", nullable)]
    pub theta: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 6)))", nullable)]
    pub vega: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 6)))", nullable)]
    pub rho: Option<Decimal>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
