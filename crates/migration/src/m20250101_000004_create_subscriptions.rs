//! Create `subscriptions` table with FKs to `wallets` and `subscription_plans`.
//!
//! `renewed_from` links a reinvested subscription to its predecessor.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Subscriptions::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer(Subscriptions::WalletId).not_null())
                    .col(big_integer(Subscriptions::PlanId).not_null())
                    .col(decimal_len(Subscriptions::Amount, 20, 8).not_null())
                    .col(decimal_len(Subscriptions::Earnings, 20, 8).not_null().default(0))
                    .col(boolean(Subscriptions::Reinvest).not_null().default(false))
                    .col(string_len(Subscriptions::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Subscriptions::StartDate).not_null())
                    .col(timestamp_with_time_zone(Subscriptions::EndDate).not_null())
                    .col(ColumnDef::new(Subscriptions::RenewedFrom).big_integer().null())
                    .col(timestamp_with_time_zone(Subscriptions::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Subscriptions::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_wallet")
                            .from(Subscriptions::Table, Subscriptions::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_plan")
                            .from(Subscriptions::Table, Subscriptions::PlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Subscriptions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    WalletId,
    PlanId,
    Amount,
    Earnings,
    Reinvest,
    Status,
    StartDate,
    EndDate,
    RenewedFrom,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Wallets { Table, Id }

#[derive(DeriveIden)]
enum SubscriptionPlans { Table, Id }
