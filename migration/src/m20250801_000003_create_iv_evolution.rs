use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create iv_evolution table for volatility term-structure time series
        manager
            .create_table(
                Table::create()
                    .table(IvEvolution::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IvEvolution::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IvEvolution::Symbol).string_len(10).not_null())
                    .col(
                        ColumnDef::new(IvEvolution::StrikePrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IvEvolution::ExpirationDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IvEvolution::OptionType)
                            .string_len(4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IvEvolution::ImpliedVolatility)
                            .decimal_len(8, 6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IvEvolution::TimeToMaturity)
                            .decimal_len(10, 6)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(IvEvolution::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Surface reconstruction queries filter by (symbol, expiration, strike)
        manager
            .create_index(
                Index::create()
                    .name("idx_iv_evolution_symbol_exp")
                    .table(IvEvolution::Table)
                    .col(IvEvolution::Symbol)
                    .col(IvEvolution::ExpirationDate)
                    .col(IvEvolution::StrikePrice)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_iv_evolution_recorded_at")
                    .table(IvEvolution::Table)
                    .col(IvEvolution::RecordedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IvEvolution::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IvEvolution {
    Table,
    Id,
    Symbol,
    StrikePrice,
    ExpirationDate,
    OptionType,
    ImpliedVolatility,
    TimeToMaturity,
    RecordedAt,
}
