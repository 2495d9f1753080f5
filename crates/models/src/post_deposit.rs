use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

/// Public "recent deposit" showcase entry. Not tied to any wallet.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post_deposits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub depositor_name: String,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub amount: Decimal,
    pub currency: String,
    pub proof_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPostDeposit {
    pub depositor_name: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub proof_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

pub fn validate_amount(amount: Decimal) -> Result<(), ModelError> {
    if amount > Decimal::ZERO { Ok(()) } else { Err(ModelError::Validation("amount must be positive".into())) }
}

pub async fn create(db: &DatabaseConnection, new: NewPostDeposit) -> Result<Model, ModelError> {
    errors::require("depositor_name", &new.depositor_name)?;
    errors::require("currency", &new.currency)?;
    validate_amount(new.amount)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        depositor_name: Set(new.depositor_name),
        amount: Set(new.amount),
        currency: Set(new.currency.trim().to_uppercase()),
        proof_url: Set(new.proof_url),
        is_published: Set(new.is_published),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
