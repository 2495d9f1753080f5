//! Create `wallets` table with FK to `users`.
//!
//! One wallet per user is enforced by the unique `user_id` column.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wallets::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer(Wallets::UserId).unique_key().not_null())
                    .col(decimal_len(Wallets::Balance, 20, 8).not_null().default(0))
                    .col(timestamp_with_time_zone(Wallets::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Wallets::UpdatedAt).not_null())
                    .check(Expr::col(Wallets::Balance).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_user")
                            .from(Wallets::Table, Wallets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wallets::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Wallets { Table, Id, UserId, Balance, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
