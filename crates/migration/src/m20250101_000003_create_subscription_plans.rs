//! Create `subscription_plans` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SubscriptionPlans::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(SubscriptionPlans::Name, 128).not_null())
                    .col(string_len(SubscriptionPlans::Label, 64).not_null())
                    .col(decimal_len(SubscriptionPlans::Rate, 10, 4).not_null())
                    .col(integer(SubscriptionPlans::DurationDays).not_null())
                    .col(decimal_len(SubscriptionPlans::MinInvestment, 20, 8).not_null())
                    .col(decimal_len(SubscriptionPlans::MaxInvestment, 20, 8).not_null())
                    .col(decimal_len(SubscriptionPlans::AvgMonthlyReturn, 10, 4).not_null())
                    .col(boolean(SubscriptionPlans::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(SubscriptionPlans::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(SubscriptionPlans::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SubscriptionPlans::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SubscriptionPlans {
    Table,
    Id,
    Name,
    Label,
    Rate,
    DurationDays,
    MinInvestment,
    MaxInvestment,
    AvgMonthlyReturn,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
