pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_options_data;
mod m20250801_000002_create_greeks_data;
mod m20250801_000003_create_iv_evolution;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_options_data::Migration),
            Box::new(m20250801_000002_create_greeks_data::Migration),
            Box::new(m20250801_000003_create_iv_evolution::Migration),
        ]
    }
}
