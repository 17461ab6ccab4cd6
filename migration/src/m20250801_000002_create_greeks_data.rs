use sea_orm_migration::prelude::*;

use crate::m20250801_000001_create_options_data::OptionsData;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create greeks_data table, one row per stored analytics record
        manager
            .create_table(
                Table::create()
                    .table(GreeksData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GreeksData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GreeksData::OptionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GreeksData::Symbol).string_len(10).not_null())
                    .col(
                        ColumnDef::new(GreeksData::StrikePrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GreeksData::ExpirationDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GreeksData::OptionType)
                            .string_len(4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(GreeksData::Delta).decimal_len(10, 6).null())
                    .col(ColumnDef::new(GreeksData::Gamma).decimal_len(10, 6).null())
                    .col(ColumnDef::new(GreeksData::Theta).decimal_len(10, 6).null())
                    .col(ColumnDef::new(GreeksData::Vega).decimal_len(10, 6).null())
                    .col(ColumnDef::new(GreeksData::Rho).decimal_len(10, 6).null())
                    .col(
                        ColumnDef::new(GreeksData::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_greeks_data_option_id")
                            .from(GreeksData::Table, GreeksData::OptionId)
                            .to(OptionsData::Table, OptionsData::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_greeks_option_id")
                    .table(GreeksData::Table)
                    .col(GreeksData::OptionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_greeks_symbol_exp")
                    .table(GreeksData::Table)
                    .col(GreeksData::Symbol)
                    .col(GreeksData::ExpirationDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GreeksData::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GreeksData {
    Table,
    Id,
    OptionId,
    Symbol,
    StrikePrice,
    ExpirationDate,
    OptionType,
    Delta,
    Gamma,
    Theta,
    Vega,
    Rho,
    CreatedAt,
}
