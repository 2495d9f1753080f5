use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Deserialize;

use models::testimonial::{self, NewTestimonial};
use crate::{errors::ServiceError, pagination::Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestimonialUpdate {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub message: Option<String>,
    pub rating: Option<i16>,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
}

pub async fn create_testimonial(db: &DatabaseConnection, new: NewTestimonial) -> Result<testimonial::Model, ServiceError> {
    Ok(testimonial::create(db, new).await?)
}

pub async fn get_testimonial(db: &DatabaseConnection, id: i64) -> Result<Option<testimonial::Model>, ServiceError> {
    Ok(testimonial::Entity::find_by_id(id).one(db).await?)
}

pub async fn list_testimonials(db: &DatabaseConnection, published: Option<bool>, page: Pagination) -> Result<Vec<testimonial::Model>, ServiceError> {
    let (offset, limit) = page.window();
    let mut q = testimonial::Entity::find();
    if let Some(p) = published {
        q = q.filter(testimonial::Column::IsPublished.eq(p));
    }
    Ok(q.order_by_desc(testimonial::Column::Id).offset(offset).limit(limit).all(db).await?)
}

pub async fn update_testimonial(db: &DatabaseConnection, id: i64, patch: TestimonialUpdate) -> Result<testimonial::Model, ServiceError> {
    let mut am: testimonial::ActiveModel = get_testimonial(db, id).await?.ok_or_else(|| ServiceError::not_found("testimonial"))?.into();
    if let Some(name) = patch.name {
        models::errors::require("name", &name)?;
        am.name = Set(name);
    }
    if let Some(d) = patch.designation {
        am.designation = Set(Some(d));
    }
    if let Some(message) = patch.message {
        models::errors::require("message", &message)?;
        am.message = Set(message);
    }
    if let Some(rating) = patch.rating {
        testimonial::validate_rating(rating)?;
        am.rating = Set(rating);
    }
    if let Some(url) = patch.image_url {
        am.image_url = Set(Some(url));
    }
    if let Some(p) = patch.is_published {
        am.is_published = Set(p);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_testimonial(db: &DatabaseConnection, id: i64) -> Result<bool, ServiceError> {
    let res = testimonial::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn delete_then_get_returns_not_found() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };

        let t = create_testimonial(
            &db,
            NewTestimonial {
                name: "Chidi".into(),
                designation: Some("Trader".into()),
                message: "Withdrawals arrive quickly".into(),
                rating: 5,
                image_url: None,
                is_published: false,
            },
        )
        .await?;
        let published = update_testimonial(&db, t.id, TestimonialUpdate { is_published: Some(true), ..Default::default() }).await?;
        assert!(published.is_published);
        assert!(update_testimonial(&db, t.id, TestimonialUpdate { rating: Some(9), ..Default::default() }).await.is_err());

        let listed = list_testimonials(&db, Some(true), Pagination::default()).await?;
        assert!(listed.iter().any(|x| x.id == t.id));

        assert!(delete_testimonial(&db, t.id).await?);
        assert!(get_testimonial(&db, t.id).await?.is_none());
        Ok(())
    }
}
