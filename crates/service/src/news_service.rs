use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;

use models::crypto_news::{self, NewNews};
use crate::{errors::ServiceError, pagination::Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
}

pub async fn create_news(db: &DatabaseConnection, new: NewNews) -> Result<crypto_news::Model, ServiceError> {
    Ok(crypto_news::create(db, new).await?)
}

/// Fetch an article and count the view.
pub async fn get_news(db: &DatabaseConnection, id: i64) -> Result<Option<crypto_news::Model>, ServiceError> {
    let Some(mut item) = crypto_news::Entity::find_by_id(id).one(db).await? else { return Ok(None) };
    crypto_news::Entity::update_many()
        .col_expr(crypto_news::Column::Views, Expr::col(crypto_news::Column::Views).add(1))
        .filter(crypto_news::Column::Id.eq(id))
        .exec(db)
        .await?;
    item.views += 1;
    Ok(Some(item))
}

/// Newest first by publication, then creation.
pub async fn list_news(db: &DatabaseConnection, published: Option<bool>, page: Pagination) -> Result<Vec<crypto_news::Model>, ServiceError> {
    let (offset, limit) = page.window();
    let mut q = crypto_news::Entity::find();
    if let Some(p) = published {
        q = q.filter(crypto_news::Column::IsPublished.eq(p));
    }
    Ok(q
        .order_by_desc(crypto_news::Column::PublishedAt)
        .order_by_desc(crypto_news::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?)
}

pub async fn update_news(db: &DatabaseConnection, id: i64, patch: NewsUpdate) -> Result<crypto_news::Model, ServiceError> {
    let current = crypto_news::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("news"))?;
    let first_publish = current.published_at.is_none();
    let mut am: crypto_news::ActiveModel = current.into();
    if let Some(title) = patch.title {
        models::errors::require("title", &title)?;
        am.title = Set(title);
    }
    if let Some(summary) = patch.summary {
        models::errors::require("summary", &summary)?;
        am.summary = Set(summary);
    }
    if let Some(content) = patch.content {
        models::errors::require("content", &content)?;
        am.content = Set(content);
    }
    if let Some(url) = patch.source_url {
        crypto_news::validate_source_url(Some(&url))?;
        am.source_url = Set(Some(url));
    }
    if let Some(url) = patch.image_url {
        am.image_url = Set(Some(url));
    }
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    if let Some(p) = patch.is_published {
        am.is_published = Set(p);
        if p && first_publish {
            am.published_at = Set(Some(now));
        }
    }
    am.updated_at = Set(now);
    Ok(am.update(db).await?)
}

pub async fn delete_news(db: &DatabaseConnection, id: i64) -> Result<bool, ServiceError> {
    let res = crypto_news::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
