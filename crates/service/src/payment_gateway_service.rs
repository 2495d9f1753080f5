use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Deserialize;

use models::payment_gateway::{self, NewGateway};
use crate::{errors::ServiceError, pagination::Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayUpdate {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub network: Option<String>,
    pub address: Option<String>,
    pub qr_code_url: Option<String>,
    pub status: Option<String>,
}

pub async fn create_gateway(db: &DatabaseConnection, new: NewGateway) -> Result<payment_gateway::Model, ServiceError> {
    Ok(payment_gateway::create(db, new).await?)
}

pub async fn get_gateway(db: &DatabaseConnection, id: i64) -> Result<Option<payment_gateway::Model>, ServiceError> {
    Ok(payment_gateway::Entity::find_by_id(id).one(db).await?)
}

pub async fn list_gateways(db: &DatabaseConnection, status: Option<&str>, page: Pagination) -> Result<Vec<payment_gateway::Model>, ServiceError> {
    let (offset, limit) = page.window();
    let mut q = payment_gateway::Entity::find();
    if let Some(s) = status {
        payment_gateway::validate_status(s)?;
        q = q.filter(payment_gateway::Column::Status.eq(s));
    }
    Ok(q.order_by_asc(payment_gateway::Column::Id).offset(offset).limit(limit).all(db).await?)
}

pub async fn update_gateway(db: &DatabaseConnection, id: i64, patch: GatewayUpdate) -> Result<payment_gateway::Model, ServiceError> {
    let mut am: payment_gateway::ActiveModel =
        get_gateway(db, id).await?.ok_or_else(|| ServiceError::not_found("payment gateway"))?.into();
    if let Some(name) = patch.name {
        models::errors::require("name", &name)?;
        am.name = Set(name);
    }
    if let Some(currency) = patch.currency {
        models::errors::require("currency", &currency)?;
        am.currency = Set(currency.trim().to_uppercase());
    }
    if let Some(network) = patch.network {
        am.network = Set(Some(network));
    }
    if let Some(address) = patch.address {
        models::errors::require("address", &address)?;
        am.address = Set(address.trim().to_string());
    }
    if let Some(url) = patch.qr_code_url {
        am.qr_code_url = Set(Some(url));
    }
    if let Some(status) = patch.status {
        payment_gateway::validate_status(&status)?;
        am.status = Set(status);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_gateway(db: &DatabaseConnection, id: i64) -> Result<bool, ServiceError> {
    let res = payment_gateway::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn gateway_crud_service() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };

        let g = create_gateway(
            &db,
            NewGateway {
                name: "Bitcoin".into(),
                currency: "btc".into(),
                network: Some("mainnet".into()),
                address: "bc1qexample".into(),
                qr_code_url: None,
                status: None,
            },
        )
        .await?;
        assert_eq!(g.status, "active");

        let off = update_gateway(&db, g.id, GatewayUpdate { status: Some("inactive".into()), ..Default::default() }).await?;
        assert_eq!(off.status, "inactive");
        let inactive = list_gateways(&db, Some("inactive"), Pagination::default()).await?;
        assert!(inactive.iter().any(|x| x.id == g.id));
        assert!(list_gateways(&db, Some("paused"), Pagination::default()).await.is_err());

        assert!(delete_gateway(&db, g.id).await?);
        assert!(get_gateway(&db, g.id).await?.is_none());
        Ok(())
    }
}
