//! Create `payouts` table with FK to `wallets`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payouts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payouts::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer(Payouts::WalletId).not_null())
                    .col(decimal_len(Payouts::Amount, 20, 8).not_null())
                    .col(string_len(Payouts::Status, 16).not_null())
                    .col(ColumnDef::new(Payouts::Destination).string_len(255).null())
                    .col(timestamp_with_time_zone(Payouts::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Payouts::UpdatedAt).not_null())
                    .col(ColumnDef::new(Payouts::ProcessedAt).timestamp_with_time_zone().null())
                    .check(Expr::col(Payouts::Amount).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payout_wallet")
                            .from(Payouts::Table, Payouts::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Payouts::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Payouts { Table, Id, WalletId, Amount, Status, Destination, CreatedAt, UpdatedAt, ProcessedAt }

#[derive(DeriveIden)]
enum Wallets { Table, Id }
