use anyhow::Result;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};

use super::{new_user, setup_test_db};
use crate::errors::ModelError;
use crate::{transaction, user, wallet};

#[tokio::test]
async fn second_wallet_for_user_is_conflict() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let u = new_user(&db).await?;
    wallet::create(&db, u.id).await?;
    let err = wallet::create(&db, u.id).await.unwrap_err();
    assert!(matches!(err, ModelError::Conflict(_)), "got {err:?}");

    user::hard_delete(&db, u.id).await?;
    Ok(())
}

#[tokio::test]
async fn negative_balance_is_rejected_by_check() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let u = new_user(&db).await?;
    let w = wallet::create(&db, u.id).await?;
    let mut am: wallet::ActiveModel = w.into();
    am.balance = Set(dec!(-1));
    assert!(am.update(&db).await.is_err());

    user::hard_delete(&db, u.id).await?;
    Ok(())
}

#[tokio::test]
async fn zero_amount_transaction_is_rejected_by_check() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let u = new_user(&db).await?;
    let w = wallet::create(&db, u.id).await?;
    let res = transaction::new_row(w.id, "deposit", dec!(0), "pending", None, None).insert(&db).await;
    assert!(res.is_err());

    user::hard_delete(&db, u.id).await?;
    Ok(())
}
