//! Create `users` table.
//!
//! Account identity; `password_hash` holds an argon2 PHC string.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(Users::Username, 64).unique_key().not_null())
                    .col(string_len(Users::Email, 255).unique_key().not_null())
                    .col(string_len(Users::PasswordHash, 255).not_null())
                    .col(string_len(Users::FullName, 128).not_null())
                    .col(ColumnDef::new(Users::Phone).string_len(32).null())
                    .col(ColumnDef::new(Users::Country).string_len(64).null())
                    .col(string_len(Users::Role, 16).not_null().default("user"))
                    .col(string_len(Users::Status, 16).not_null().default("active"))
                    .col(timestamp_with_time_zone(Users::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Users::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, Username, Email, PasswordHash, FullName, Phone, Country, Role, Status, CreatedAt, UpdatedAt }
