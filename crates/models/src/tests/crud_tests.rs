use anyhow::Result;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};

use super::{new_user, setup_test_db};
use crate::{blog_post, crypto_news, payment_gateway, post_deposit, subscription_plan, testimonial, transaction, user, wallet};

#[tokio::test]
async fn user_and_wallet_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let u = new_user(&db).await?;
    assert_eq!(u.role, "user");
    assert_eq!(u.status, "active");

    let w = wallet::create(&db, u.id).await?;
    assert_eq!(w.balance, dec!(0));

    let found = wallet::Entity::find().filter(wallet::Column::UserId.eq(u.id)).one(&db).await?;
    assert_eq!(found.map(|w| w.id), Some(w.id));

    // wallets cascade with their user
    assert!(user::hard_delete(&db, u.id).await?);
    assert!(wallet::Entity::find_by_id(w.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn pending_transaction_row_has_no_processed_at() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let u = new_user(&db).await?;
    let w = wallet::create(&db, u.id).await?;
    let tx = transaction::new_row(w.id, "deposit", dec!(12.5), "pending", Some("ref-1".into()), None)
        .insert(&db)
        .await?;
    assert!(tx.processed_at.is_none());
    assert_eq!(tx.amount, dec!(12.5));

    let earning = transaction::new_row(w.id, "earning", dec!(1), "accepted", None, None).insert(&db).await?;
    assert!(earning.processed_at.is_some());

    user::hard_delete(&db, u.id).await?;
    Ok(())
}

#[tokio::test]
async fn plan_stores_derived_monthly_return() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let plan = subscription_plan::create(
        &db,
        subscription_plan::NewPlan {
            name: "Starter".into(),
            label: "Silver".into(),
            rate: dec!(12),
            duration_days: 90,
            min_investment: dec!(100),
            max_investment: dec!(1000),
            is_active: true,
        },
    )
    .await?;
    assert_eq!(plan.avg_monthly_return, dec!(4));
    subscription_plan::Entity::delete_by_id(plan.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn content_tables_round_trip() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let tag = uuid::Uuid::new_v4().simple().to_string();

    let post = blog_post::create(
        &db,
        blog_post::NewBlogPost {
            title: format!("Market Update {}", tag),
            slug: None,
            content: "body".into(),
            author: "desk".into(),
            image_url: None,
            status: None,
        },
    )
    .await?;
    assert_eq!(post.slug, format!("market-update-{}", tag));
    assert_eq!(post.status, "draft");

    let t = testimonial::create(
        &db,
        testimonial::NewTestimonial {
            name: "Ada".into(),
            designation: None,
            message: "great".into(),
            rating: 4,
            image_url: None,
            is_published: true,
        },
    )
    .await?;
    assert_eq!(t.rating, 4);

    let n = crypto_news::create(
        &db,
        crypto_news::NewNews {
            title: "ETH upgrade".into(),
            summary: "short".into(),
            content: "long".into(),
            source_url: None,
            image_url: None,
            is_published: true,
        },
    )
    .await?;
    assert!(n.published_at.is_some());

    let g = payment_gateway::create(
        &db,
        payment_gateway::NewGateway {
            name: "Tether".into(),
            currency: "usdt".into(),
            network: Some("TRC20".into()),
            address: " TXYZ ".into(),
            qr_code_url: None,
            status: None,
        },
    )
    .await?;
    assert_eq!(g.currency, "USDT");
    assert_eq!(g.address, "TXYZ");

    let d = post_deposit::create(
        &db,
        post_deposit::NewPostDeposit {
            depositor_name: "J. Doe".into(),
            amount: dec!(250),
            currency: "btc".into(),
            proof_url: None,
            is_published: false,
        },
    )
    .await?;
    assert_eq!(d.currency, "BTC");

    blog_post::Entity::delete_by_id(post.id).exec(&db).await?;
    testimonial::Entity::delete_by_id(t.id).exec(&db).await?;
    crypto_news::Entity::delete_by_id(n.id).exec(&db).await?;
    payment_gateway::Entity::delete_by_id(g.id).exec(&db).await?;
    post_deposit::Entity::delete_by_id(d.id).exec(&db).await?;
    Ok(())
}
