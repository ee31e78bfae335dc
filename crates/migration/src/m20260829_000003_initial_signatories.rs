use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InitialSignatories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InitialSignatories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InitialSignatories::Name).string().not_null())
                    .col(ColumnDef::new(InitialSignatories::Position).string())
                    .col(ColumnDef::new(InitialSignatories::Institution).string())
                    .col(
                        ColumnDef::new(InitialSignatories::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InitialSignatories::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_initial_signatories_display_order")
                    .table(InitialSignatories::Table)
                    .col(InitialSignatories::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(
                Index::drop()
                    .name("idx_initial_signatories_display_order")
                    .to_owned(),
            )
            .await;

        manager
            .drop_table(Table::drop().table(InitialSignatories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InitialSignatories {
    Table,
    Id,
    Name,
    Position,
    Institution,
    DisplayOrder,
    CreatedAt,
}
