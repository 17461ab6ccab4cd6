use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create options_data table
        manager
            .create_table(
                Table::create()
                    .table(OptionsData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OptionsData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OptionsData::Symbol)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OptionsData::OptionType)
                            .string_len(4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OptionsData::StrikePrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OptionsData::ExpirationDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OptionsData::BidPrice).decimal_len(10, 4).null())
                    .col(ColumnDef::new(OptionsData::AskPrice).decimal_len(10, 4).null())
                    .col(ColumnDef::new(OptionsData::LastPrice).decimal_len(10, 4).null())
                    .col(ColumnDef::new(OptionsData::Volume).big_integer().null())
                    .col(
                        ColumnDef::new(OptionsData::ImpliedVolatility)
                            .decimal_len(8, 6)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OptionsData::UnderlyingPrice)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OptionsData::TimeToMaturity)
                            .decimal_len(10, 6)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OptionsData::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for chain lookups: (symbol, expiration_date)
        manager
            .create_index(
                Index::create()
                    .name("idx_options_symbol_exp")
                    .table(OptionsData::Table)
                    .col(OptionsData::Symbol)
                    .col(OptionsData::ExpirationDate)
                    .to_owned(),
            )
            .await?;

        // Index for windowed dedup lookups on creation time
        manager
            .create_index(
                Index::create()
                    .name("idx_options_created_at")
                    .table(OptionsData::Table)
                    .col(OptionsData::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OptionsData::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum OptionsData {
    Table,
    Id,
    Symbol,
    OptionType,
    StrikePrice,
    ExpirationDate,
    BidPrice,
    AskPrice,
    LastPrice,
    Volume,
    ImpliedVolatility,
    UnderlyingPrice,
    TimeToMaturity,
    CreatedAt,
}
