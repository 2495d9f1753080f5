//! Create `post_deposits` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostDeposits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostDeposits::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(PostDeposits::DepositorName, 128).not_null())
                    .col(decimal_len(PostDeposits::Amount, 20, 8).not_null())
                    .col(string_len(PostDeposits::Currency, 16).not_null())
                    .col(ColumnDef::new(PostDeposits::ProofUrl).string_len(512).null())
                    .col(boolean(PostDeposits::IsPublished).not_null().default(false))
                    .col(timestamp_with_time_zone(PostDeposits::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(PostDeposits::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PostDeposits::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PostDeposits { Table, Id, DepositorName, Amount, Currency, ProofUrl, IsPublished, CreatedAt, UpdatedAt }
