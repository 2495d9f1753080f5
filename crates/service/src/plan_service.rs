use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Deserialize;
use tracing::info;

use models::subscription_plan::{self, NewPlan};
use crate::{errors::ServiceError, pagination::Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub label: Option<String>,
    pub rate: Option<Decimal>,
    pub duration_days: Option<i32>,
    pub min_investment: Option<Decimal>,
    pub max_investment: Option<Decimal>,
    pub is_active: Option<bool>,
}

pub async fn create_plan(db: &DatabaseConnection, new: NewPlan) -> Result<subscription_plan::Model, ServiceError> {
    let plan = subscription_plan::create(db, new).await?;
    info!(plan_id = plan.id, name = %plan.name, "plan_created");
    Ok(plan)
}

pub async fn get_plan(db: &DatabaseConnection, id: i64) -> Result<Option<subscription_plan::Model>, ServiceError> {
    Ok(subscription_plan::Entity::find_by_id(id).one(db).await?)
}

/// List plans ordered by minimum investment, optionally only active ones.
pub async fn list_plans(db: &DatabaseConnection, active: Option<bool>, page: Pagination) -> Result<Vec<subscription_plan::Model>, ServiceError> {
    let (offset, limit) = page.window();
    let mut q = subscription_plan::Entity::find();
    if let Some(a) = active {
        q = q.filter(subscription_plan::Column::IsActive.eq(a));
    }
    let plans = q
        .order_by_asc(subscription_plan::Column::MinInvestment)
        .order_by_asc(subscription_plan::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;
    Ok(plans)
}

/// Apply a partial update; `avg_monthly_return` is recomputed from the result.
pub async fn update_plan(db: &DatabaseConnection, id: i64, patch: PlanUpdate) -> Result<subscription_plan::Model, ServiceError> {
    let current = get_plan(db, id).await?.ok_or_else(|| ServiceError::not_found("plan"))?;
    let rate = patch.rate.unwrap_or(current.rate);
    let duration_days = patch.duration_days.unwrap_or(current.duration_days);
    let min = patch.min_investment.unwrap_or(current.min_investment);
    let max = patch.max_investment.unwrap_or(current.max_investment);
    subscription_plan::validate_terms(rate, duration_days, min, max)?;
    let monthly = subscription_plan::avg_monthly_return(rate, duration_days)?;

    let mut am: subscription_plan::ActiveModel = current.into();
    if let Some(name) = patch.name {
        models::errors::require("name", &name)?;
        am.name = Set(name);
    }
    if let Some(label) = patch.label {
        models::errors::require("label", &label)?;
        am.label = Set(label);
    }
    if let Some(active) = patch.is_active {
        am.is_active = Set(active);
    }
    am.rate = Set(rate);
    am.duration_days = Set(duration_days);
    am.min_investment = Set(min);
    am.max_investment = Set(max);
    am.avg_monthly_return = Set(monthly);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Delete a plan. Plans still referenced by subscriptions cannot be deleted.
pub async fn delete_plan(db: &DatabaseConnection, id: i64) -> Result<bool, ServiceError> {
    let res = subscription_plan::Entity::delete_by_id(id).exec(db).await.map_err(|e| match ServiceError::from(e) {
        ServiceError::Validation(_) => ServiceError::Conflict("plan has subscriptions".into()),
        other => other,
    })?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn plan_crud_recomputes_monthly_return() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };

        let plan = create_plan(
            &db,
            NewPlan {
                name: "Growth".into(),
                label: "Gold".into(),
                rate: dec!(30),
                duration_days: 180,
                min_investment: dec!(500),
                max_investment: dec!(5000),
                is_active: true,
            },
        )
        .await?;
        assert_eq!(plan.avg_monthly_return, dec!(5));

        let fetched = get_plan(&db, plan.id).await?.unwrap();
        assert_eq!(fetched.name, plan.name);
        assert_eq!(fetched.rate, plan.rate);

        let updated = update_plan(&db, plan.id, PlanUpdate { duration_days: Some(90), ..Default::default() }).await?;
        assert_eq!(updated.avg_monthly_return, dec!(10));
        assert!(update_plan(&db, plan.id, PlanUpdate { max_investment: Some(dec!(1)), ..Default::default() }).await.is_err());
        let oversized = update_plan(&db, plan.id, PlanUpdate { rate: Some(Decimal::MAX), ..Default::default() }).await;
        assert!(matches!(oversized, Err(ServiceError::Validation(_))));

        assert!(delete_plan(&db, plan.id).await?);
        assert!(get_plan(&db, plan.id).await?.is_none());
        Ok(())
    }
}
