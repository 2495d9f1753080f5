//! Create `crypto_news` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CryptoNews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CryptoNews::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(CryptoNews::Title, 255).not_null())
                    .col(string_len(CryptoNews::Summary, 512).not_null())
                    .col(text(CryptoNews::Content).not_null())
                    .col(ColumnDef::new(CryptoNews::SourceUrl).string_len(512).null())
                    .col(ColumnDef::new(CryptoNews::ImageUrl).string_len(512).null())
                    .col(boolean(CryptoNews::IsPublished).not_null().default(false))
                    .col(big_integer(CryptoNews::Views).not_null().default(0))
                    .col(ColumnDef::new(CryptoNews::PublishedAt).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(CryptoNews::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(CryptoNews::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CryptoNews::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CryptoNews {
    Table,
    Id,
    Title,
    Summary,
    Content,
    SourceUrl,
    ImageUrl,
    IsPublished,
    Views,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}
