use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_gateways")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub currency: String,
    pub network: Option<String>,
    /// Receiving address users send deposits to.
    pub address: String,
    pub qr_code_url: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_status(status: &str) -> Result<(), ModelError> {
    match status {
        "active" | "inactive" => Ok(()),
        other => Err(ModelError::Validation(format!("unknown gateway status '{other}'"))),
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewGateway {
    pub name: String,
    pub currency: String,
    #[serde(default)]
    pub network: Option<String>,
    pub address: String,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn create(db: &DatabaseConnection, new: NewGateway) -> Result<Model, ModelError> {
    errors::require("name", &new.name)?;
    errors::require("currency", &new.currency)?;
    errors::require("address", &new.address)?;
    let status = new.status.unwrap_or_else(|| "active".into());
    validate_status(&status)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        name: Set(new.name),
        currency: Set(new.currency.trim().to_uppercase()),
        network: Set(new.network),
        address: Set(new.address.trim().to_string()),
        qr_code_url: Set(new.qr_code_url),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
