use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crypto_news")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub summary: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub views: i64,
    /// Set the first time the article is published, never cleared.
    pub published_at: Option<DateTimeWithTimeZone>,
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
pub struct NewNews {
    pub title: String,
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

pub fn validate_source_url(url: Option<&str>) -> Result<(), ModelError> {
    match url {
        Some(u) if !(u.starts_with("http://") || u.starts_with("https://")) => {
            Err(ModelError::Validation("source_url must be an http(s) URL".into()))
        }
        _ => Ok(()),
    }
}

pub async fn create(db: &DatabaseConnection, new: NewNews) -> Result<Model, ModelError> {
    errors::require("title", &new.title)?;
    errors::require("summary", &new.summary)?;
    errors::require("content", &new.content)?;
    validate_source_url(new.source_url.as_deref())?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = ActiveModel {
        title: Set(new.title),
        summary: Set(new.summary),
        content: Set(new.content),
        source_url: Set(new.source_url),
        image_url: Set(new.image_url),
        is_published: Set(new.is_published),
        views: Set(0),
        published_at: Set(new.is_published.then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
