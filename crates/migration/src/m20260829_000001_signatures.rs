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
                    .table(Signatures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Signatures::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Signatures::Name).string().not_null())
                    .col(ColumnDef::new(Signatures::Position).string())
                    .col(ColumnDef::new(Signatures::Institution).string())
                    .col(ColumnDef::new(Signatures::Address).string())
                    .col(ColumnDef::new(Signatures::AddressGnafId).string())
                    .col(ColumnDef::new(Signatures::FederalElectorate).string())
                    .col(ColumnDef::new(Signatures::StateElectorate).string())
                    .col(ColumnDef::new(Signatures::Latitude).double())
                    .col(ColumnDef::new(Signatures::Longitude).double())
                    .col(ColumnDef::new(Signatures::Sa2Code).string())
                    .col(ColumnDef::new(Signatures::LgaName).string())
                    .col(ColumnDef::new(Signatures::Postcode).string())
                    .col(ColumnDef::new(Signatures::State).string())
                    .col(ColumnDef::new(Signatures::EmailHash).string().not_null())
                    .col(ColumnDef::new(Signatures::PhoneHash).string().not_null())
                    .col(
                        ColumnDef::new(Signatures::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Signatures::PhoneVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Signatures::VerificationCompletedAt).big_integer())
                    .col(
                        ColumnDef::new(Signatures::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Signatures::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Duplicate-identity lookups hit these on every submission.
        manager
            .create_index(
                Index::create()
                    .name("idx_signatures_email_hash")
                    .table(Signatures::Table)
                    .col(Signatures::EmailHash)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_signatures_phone_hash")
                    .table(Signatures::Table)
                    .col(Signatures::PhoneHash)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(Index::drop().name("idx_signatures_email_hash").to_owned())
            .await;
        let _ = manager
            .drop_index(Index::drop().name("idx_signatures_phone_hash").to_owned())
            .await;

        manager
            .drop_table(Table::drop().table(Signatures::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Signatures {
    Table,
    Id,
    Name,
    Position,
    Institution,
    Address,
    AddressGnafId,
    FederalElectorate,
    StateElectorate,
    Latitude,
    Longitude,
    Sa2Code,
    LgaName,
    Postcode,
    State,
    EmailHash,
    PhoneHash,
    EmailVerified,
    PhoneVerified,
    VerificationCompletedAt,
    CreatedAt,
    UpdatedAt,
}
