//! Create `testimonials` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Testimonials::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Testimonials::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(string_len(Testimonials::Name, 128).not_null())
                    .col(ColumnDef::new(Testimonials::Designation).string_len(128).null())
                    .col(text(Testimonials::Message).not_null())
                    .col(small_integer(Testimonials::Rating).not_null().default(5))
                    .col(ColumnDef::new(Testimonials::ImageUrl).string_len(512).null())
                    .col(boolean(Testimonials::IsPublished).not_null().default(false))
                    .col(timestamp_with_time_zone(Testimonials::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Testimonials::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Testimonials::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Testimonials { Table, Id, Name, Designation, Message, Rating, ImageUrl, IsPublished, CreatedAt, UpdatedAt }
