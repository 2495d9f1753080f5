use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author: String,
    pub image_url: Option<String>,
    /// `draft` or `published`
    pub status: String,
    pub views: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lowercase ASCII words joined by single dashes.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

pub fn validate_status(status: &str) -> Result<(), ModelError> {
    match status {
        "draft" | "published" => Ok(()),
        other => Err(ModelError::Validation(format!("unknown blog status '{other}'"))),
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn create(db: &DatabaseConnection, new: NewBlogPost) -> Result<Model, ModelError> {
    errors::require("title", &new.title)?;
    errors::require("content", &new.content)?;
    errors::require("author", &new.author)?;
    let slug = slugify(new.slug.as_deref().unwrap_or(&new.title));
    if slug.is_empty() {
        return Err(ModelError::Validation("slug must contain at least one letter or digit".into()));
    }
    let status = new.status.unwrap_or_else(|| "draft".into());
    validate_status(&status)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        title: Set(new.title),
        slug: Set(slug),
        content: Set(new.content),
        author: Set(new.author),
        image_url: Set(new.image_url),
        status: Set(status),
        views: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
