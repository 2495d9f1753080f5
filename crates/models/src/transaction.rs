use chrono::Utc;
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::{subscription, wallet};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    /// `deposit`, `withdrawal` or `earning`
    pub kind: String,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub amount: Decimal,
    /// `pending`, `accepted` or `rejected`
    pub status: String,
    pub reference: Option<String>,
    pub subscription_id: Option<i64>,
    pub processed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Wallet,
    Subscription,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Wallet => Entity::belongs_to(wallet::Entity).from(Column::WalletId).to(wallet::Column::Id).into(),
            Relation::Subscription => Entity::belongs_to(subscription::Entity)
                .from(Column::SubscriptionId)
                .to(subscription::Column::Id)
                .into(),
        }
    }
}

impl Related<wallet::Entity> for Entity {
    fn to() -> RelationDef { Relation::Wallet.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Active model for a new ledger row; settled rows get `processed_at` now.
pub fn new_row(
    wallet_id: i64,
    kind: &str,
    amount: Decimal,
    status: &str,
    reference: Option<String>,
    subscription_id: Option<i64>,
) -> ActiveModel {
    let now: DateTimeWithTimeZone = Utc::now().into();
    ActiveModel {
        wallet_id: Set(wallet_id),
        kind: Set(kind.to_string()),
        amount: Set(amount),
        status: Set(status.to_string()),
        reference: Set(reference),
        subscription_id: Set(subscription_id),
        processed_at: Set(if status == "pending" { None } else { Some(now) }),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}
