//! Create `blog_posts` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlogPosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogPosts::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(BlogPosts::Title, 255).not_null())
                    .col(string_len(BlogPosts::Slug, 255).unique_key().not_null())
                    .col(text(BlogPosts::Content).not_null())
                    .col(string_len(BlogPosts::Author, 128).not_null())
                    .col(ColumnDef::new(BlogPosts::ImageUrl).string_len(512).null())
                    .col(string_len(BlogPosts::Status, 16).not_null().default("draft"))
                    .col(big_integer(BlogPosts::Views).not_null().default(0))
                    .col(timestamp_with_time_zone(BlogPosts::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(BlogPosts::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BlogPosts::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BlogPosts { Table, Id, Title, Slug, Content, Author, ImageUrl, Status, Views, CreatedAt, UpdatedAt }
