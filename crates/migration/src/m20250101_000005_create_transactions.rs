//! Create `transactions` table with FK to `wallets`.
//!
//! Holds deposit / withdrawal requests and earning bookkeeping rows.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer(Transactions::WalletId).not_null())
                    .col(string_len(Transactions::Kind, 16).not_null())
                    .col(decimal_len(Transactions::Amount, 20, 8).not_null())
                    .col(string_len(Transactions::Status, 16).not_null())
                    .col(ColumnDef::new(Transactions::Reference).string_len(255).null())
                    .col(ColumnDef::new(Transactions::SubscriptionId).big_integer().null())
                    .col(timestamp_with_time_zone(Transactions::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Transactions::UpdatedAt).not_null())
                    .col(ColumnDef::new(Transactions::ProcessedAt).timestamp_with_time_zone().null())
                    .check(Expr::col(Transactions::Amount).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_wallet")
                            .from(Transactions::Table, Transactions::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_subscription")
                            .from(Transactions::Table, Transactions::SubscriptionId)
                            .to(Subscriptions::Table, Subscriptions::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    WalletId,
    Kind,
    Amount,
    Status,
    Reference,
    SubscriptionId,
    CreatedAt,
    UpdatedAt,
    ProcessedAt,
}

#[derive(DeriveIden)]
enum Wallets { Table, Id }

#[derive(DeriveIden)]
enum Subscriptions { Table, Id }
