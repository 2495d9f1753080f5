use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Tier label shown to users, e.g. `Gold`.
    pub label: String,
    /// Percent return over the whole duration.
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub rate: Decimal,
    pub duration_days: i32,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub min_investment: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub max_investment: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub avg_monthly_return: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

/// Monthly return in percent: `rate / (duration_days / 30)`, 4 dp.
/// Fails when the result does not fit the rate column.
pub fn avg_monthly_return(rate: Decimal, duration_days: i32) -> Result<Decimal, ModelError> {
    if duration_days <= 0 {
        return Ok(Decimal::ZERO);
    }
    let monthly = rate
        .checked_mul(Decimal::from(30))
        .and_then(|r| r.checked_div(Decimal::from(duration_days)))
        .map(|r| r.round_dp(4))
        .filter(|r| crate::fits_decimal(*r, crate::RATE_PRECISION))
        .ok_or_else(|| ModelError::Validation("rate is too large for the plan duration".into()))?;
    Ok(monthly)
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPlan {
    pub name: String,
    pub label: String,
    pub rate: Decimal,
    pub duration_days: i32,
    pub min_investment: Decimal,
    pub max_investment: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool { true }

/// Bounds shared by create and update.
pub fn validate_terms(rate: Decimal, duration_days: i32, min: Decimal, max: Decimal) -> Result<(), ModelError> {
    if rate < Decimal::ZERO {
        return Err(ModelError::Validation("rate must not be negative".into()));
    }
    if !crate::fits_decimal(rate, crate::RATE_PRECISION) {
        return Err(ModelError::Validation("rate must be below 1000000 with at most 4 decimal places".into()));
    }
    if duration_days <= 0 {
        return Err(ModelError::Validation("duration_days must be positive".into()));
    }
    if min <= Decimal::ZERO {
        return Err(ModelError::Validation("min_investment must be positive".into()));
    }
    if !crate::fits_decimal(min, crate::MONEY_PRECISION) || !crate::fits_decimal(max, crate::MONEY_PRECISION) {
        return Err(ModelError::Validation("investment bounds must be below 10^12 with at most 8 decimal places".into()));
    }
    if max < min {
        return Err(ModelError::Validation("max_investment must be >= min_investment".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, new: NewPlan) -> Result<Model, ModelError> {
    errors::require("name", &new.name)?;
    errors::require("label", &new.label)?;
    validate_terms(new.rate, new.duration_days, new.min_investment, new.max_investment)?;
    let monthly = avg_monthly_return(new.rate, new.duration_days)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        name: Set(new.name),
        label: Set(new.label),
        rate: Set(new.rate),
        duration_days: Set(new.duration_days),
        min_investment: Set(new.min_investment),
        max_investment: Set(new.max_investment),
        avg_monthly_return: Set(monthly),
        is_active: Set(new.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
