//! Create `payment_gateways` table.
//!
//! Deposit destinations shown to users (coin, network, receiving address).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentGateways::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PaymentGateways::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(PaymentGateways::Name, 128).not_null())
                    .col(string_len(PaymentGateways::Currency, 16).not_null())
                    .col(ColumnDef::new(PaymentGateways::Network).string_len(64).null())
                    .col(string_len(PaymentGateways::Address, 255).not_null())
                    .col(ColumnDef::new(PaymentGateways::QrCodeUrl).string_len(512).null())
                    .col(string_len(PaymentGateways::Status, 16).not_null().default("active"))
                    .col(timestamp_with_time_zone(PaymentGateways::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(PaymentGateways::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PaymentGateways::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PaymentGateways { Table, Id, Name, Currency, Network, Address, QrCodeUrl, Status, CreatedAt, UpdatedAt }
