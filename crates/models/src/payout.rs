use chrono::Utc;
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::wallet;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payouts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub amount: Decimal,
    pub status: String,
    pub destination: Option<String>,
    pub processed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Wallet,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Wallet => Entity::belongs_to(wallet::Entity).from(Column::WalletId).to(wallet::Column::Id).into(),
        }
    }
}

impl Related<wallet::Entity> for Entity {
    fn to() -> RelationDef { Relation::Wallet.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn new_pending(wallet_id: i64, amount: Decimal, destination: Option<String>) -> ActiveModel {
    let now: DateTimeWithTimeZone = Utc::now().into();
    ActiveModel {
        wallet_id: Set(wallet_id),
        amount: Set(amount),
        status: Set("pending".into()),
        destination: Set(destination),
        processed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}
