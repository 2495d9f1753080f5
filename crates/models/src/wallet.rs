use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{payout, subscription, transaction, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub balance: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Transactions,
    Payouts,
    Subscriptions,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::Transactions => Entity::has_many(transaction::Entity).into(),
            Relation::Payouts => Entity::has_many(payout::Entity).into(),
            Relation::Subscriptions => Entity::has_many(subscription::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef { Relation::Transactions.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a zero-balance wallet for `user_id`.
pub async fn create<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Model, ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(user_id),
        balance: Set(Decimal::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
