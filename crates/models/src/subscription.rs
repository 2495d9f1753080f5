use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{subscription_plan, wallet};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub plan_id: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub earnings: Decimal,
    pub reinvest: bool,
    /// `active`, `completed` or `reinvested`
    pub status: String,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub renewed_from: Option<i64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Wallet,
    Plan,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Wallet => Entity::belongs_to(wallet::Entity).from(Column::WalletId).to(wallet::Column::Id).into(),
            Relation::Plan => Entity::belongs_to(subscription_plan::Entity)
                .from(Column::PlanId)
                .to(subscription_plan::Column::Id)
                .into(),
        }
    }
}

impl Related<wallet::Entity> for Entity {
    fn to() -> RelationDef { Relation::Wallet.def() }
}

impl Related<subscription_plan::Entity> for Entity {
    fn to() -> RelationDef { Relation::Plan.def() }
}

impl ActiveModelBehavior for ActiveModel {}
