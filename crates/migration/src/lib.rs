//! Migrator registering table migrations in FK dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_wallets;
mod m20250101_000003_create_subscription_plans;
mod m20250101_000004_create_subscriptions;
mod m20250101_000005_create_transactions;
mod m20250101_000006_create_payouts;
mod m20250101_000007_create_blog_posts;
mod m20250101_000008_create_testimonials;
mod m20250101_000009_create_crypto_news;
mod m20250101_000010_create_payment_gateways;
mod m20250101_000011_create_post_deposits;
mod m20250101_000012_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_wallets::Migration),
            Box::new(m20250101_000003_create_subscription_plans::Migration),
            Box::new(m20250101_000004_create_subscriptions::Migration),
            Box::new(m20250101_000005_create_transactions::Migration),
            Box::new(m20250101_000006_create_payouts::Migration),
            Box::new(m20250101_000007_create_blog_posts::Migration),
            Box::new(m20250101_000008_create_testimonials::Migration),
            Box::new(m20250101_000009_create_crypto_news::Migration),
            Box::new(m20250101_000010_create_payment_gateways::Migration),
            Box::new(m20250101_000011_create_post_deposits::Migration),
            // Indexes should always be applied last
            Box::new(m20250101_000012_add_indexes::Migration),
        ]
    }
}
