pub use sea_orm_migration::prelude::*;

mod m20260829_000001_signatures;
mod m20260829_000002_verification_codes;
mod m20260829_000003_initial_signatories;

pub struct Migrator;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260829_000001_signatures::Migration),
            Box::new(m20260829_000002_verification_codes::Migration),
            Box::new(m20260829_000003_initial_signatories::Migration),
        ]
    }
}
