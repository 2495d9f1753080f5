use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Deserialize;

use models::post_deposit::{self, NewPostDeposit};
use crate::{errors::ServiceError, pagination::Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDepositUpdate {
    pub depositor_name: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub proof_url: Option<String>,
    pub is_published: Option<bool>,
}

pub async fn create_post_deposit(db: &DatabaseConnection, new: NewPostDeposit) -> Result<post_deposit::Model, ServiceError> {
    Ok(post_deposit::create(db, new).await?)
}

pub async fn get_post_deposit(db: &DatabaseConnection, id: i64) -> Result<Option<post_deposit::Model>, ServiceError> {
    Ok(post_deposit::Entity::find_by_id(id).one(db).await?)
}

pub async fn list_post_deposits(db: &DatabaseConnection, published: Option<bool>, page: Pagination) -> Result<Vec<post_deposit::Model>, ServiceError> {
    let (offset, limit) = page.window();
    let mut q = post_deposit::Entity::find();
    if let Some(p) = published {
        q = q.filter(post_deposit::Column::IsPublished.eq(p));
    }
    Ok(q.order_by_desc(post_deposit::Column::Id).offset(offset).limit(limit).all(db).await?)
}

pub async fn update_post_deposit(db: &DatabaseConnection, id: i64, patch: PostDepositUpdate) -> Result<post_deposit::Model, ServiceError> {
    let mut am: post_deposit::ActiveModel =
        get_post_deposit(db, id).await?.ok_or_else(|| ServiceError::not_found("post deposit"))?.into();
    if let Some(name) = patch.depositor_name {
        models::errors::require("depositor_name", &name)?;
        am.depositor_name = Set(name);
    }
    if let Some(amount) = patch.amount {
        post_deposit::validate_amount(amount)?;
        am.amount = Set(amount);
    }
    if let Some(currency) = patch.currency {
        models::errors::require("currency", &currency)?;
        am.currency = Set(currency.trim().to_uppercase());
    }
    if let Some(url) = patch.proof_url {
        am.proof_url = Set(Some(url));
    }
    if let Some(p) = patch.is_published {
        am.is_published = Set(p);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_post_deposit(db: &DatabaseConnection, id: i64) -> Result<bool, ServiceError> {
    let res = post_deposit::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn post_deposit_crud_service() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };

        let d = create_post_deposit(
            &db,
            NewPostDeposit {
                depositor_name: "M. K.".into(),
                amount: dec!(0.015),
                currency: "btc".into(),
                proof_url: None,
                is_published: true,
            },
        )
        .await?;
        let fetched = get_post_deposit(&db, d.id).await?.unwrap();
        assert_eq!(fetched.amount, dec!(0.015));
        assert_eq!(fetched.currency, "BTC");
        assert!(update_post_deposit(&db, d.id, PostDepositUpdate { amount: Some(dec!(0)), ..Default::default() }).await.is_err());

        assert!(delete_post_deposit(&db, d.id).await?);
        assert!(get_post_deposit(&db, d.id).await?.is_none());
        Ok(())
    }
}
