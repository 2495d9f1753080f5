use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Transactions: per-wallet history filtered by kind/status
        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_wallet_kind_status")
                    .table(Transactions::Table)
                    .col(Transactions::WalletId)
                    .col(Transactions::Kind)
                    .col(Transactions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payout_wallet_status")
                    .table(Payouts::Table)
                    .col(Payouts::WalletId)
                    .col(Payouts::Status)
                    .to_owned(),
            )
            .await?;

        // Subscriptions: expiry sweep scans active rows by end_date
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_status_end_date")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::Status)
                    .col(Subscriptions::EndDate)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_wallet")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::WalletId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_transaction_wallet_kind_status").table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payout_wallet_status").table(Payouts::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subscription_status_end_date").table(Subscriptions::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subscription_wallet").table(Subscriptions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Transactions { Table, WalletId, Kind, Status }

#[derive(DeriveIden)]
enum Payouts { Table, WalletId, Status }

#[derive(DeriveIden)]
enum Subscriptions { Table, WalletId, Status, EndDate }
