use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "testimonials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub designation: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub rating: i16,
    pub image_url: Option<String>,
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

pub fn validate_rating(rating: i16) -> Result<(), ModelError> {
    if (1..=5).contains(&rating) { Ok(()) } else { Err(ModelError::Validation("rating must be between 1 and 5".into())) }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewTestimonial {
    pub name: String,
    #[serde(default)]
    pub designation: Option<String>,
    pub message: String,
    #[serde(default = "default_rating")]
    pub rating: i16,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

fn default_rating() -> i16 { 5 }

pub async fn create(db: &DatabaseConnection, new: NewTestimonial) -> Result<Model, ModelError> {
    errors::require("name", &new.name)?;
    errors::require("message", &new.message)?;
    validate_rating(new.rating)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        name: Set(new.name),
        designation: Set(new.designation),
        message: Set(new.message),
        rating: Set(new.rating),
        image_url: Set(new.image_url),
        is_published: Set(new.is_published),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
