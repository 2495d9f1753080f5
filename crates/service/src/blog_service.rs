use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;

use models::blog_post::{self, NewBlogPost};
use crate::{errors::ServiceError, pagination::Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
}

pub async fn create_post(db: &DatabaseConnection, new: NewBlogPost) -> Result<blog_post::Model, ServiceError> {
    Ok(blog_post::create(db, new).await?)
}

async fn bump_views(db: &DatabaseConnection, found: Option<blog_post::Model>) -> Result<Option<blog_post::Model>, ServiceError> {
    let Some(mut post) = found else { return Ok(None) };
    blog_post::Entity::update_many()
        .col_expr(blog_post::Column::Views, Expr::col(blog_post::Column::Views).add(1))
        .filter(blog_post::Column::Id.eq(post.id))
        .exec(db)
        .await?;
    post.views += 1;
    Ok(Some(post))
}

/// Fetch a post and count the view.
pub async fn get_post(db: &DatabaseConnection, id: i64) -> Result<Option<blog_post::Model>, ServiceError> {
    let found = blog_post::Entity::find_by_id(id).one(db).await?;
    bump_views(db, found).await
}

pub async fn get_post_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<blog_post::Model>, ServiceError> {
    let found = blog_post::Entity::find().filter(blog_post::Column::Slug.eq(slug)).one(db).await?;
    bump_views(db, found).await
}

pub async fn list_posts(db: &DatabaseConnection, status: Option<&str>, page: Pagination) -> Result<Vec<blog_post::Model>, ServiceError> {
    let (offset, limit) = page.window();
    let mut q = blog_post::Entity::find();
    if let Some(s) = status {
        blog_post::validate_status(s)?;
        q = q.filter(blog_post::Column::Status.eq(s));
    }
    Ok(q.order_by_desc(blog_post::Column::Id).offset(offset).limit(limit).all(db).await?)
}

pub async fn update_post(db: &DatabaseConnection, id: i64, patch: BlogUpdate) -> Result<blog_post::Model, ServiceError> {
    let mut am: blog_post::ActiveModel = blog_post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("blog post"))?
        .into();
    if let Some(title) = patch.title {
        models::errors::require("title", &title)?;
        am.title = Set(title);
    }
    if let Some(slug) = patch.slug {
        let slug = blog_post::slugify(&slug);
        if slug.is_empty() {
            return Err(ServiceError::Validation("slug must contain at least one letter or digit".into()));
        }
        am.slug = Set(slug);
    }
    if let Some(content) = patch.content {
        models::errors::require("content", &content)?;
        am.content = Set(content);
    }
    if let Some(author) = patch.author {
        am.author = Set(author);
    }
    if let Some(url) = patch.image_url {
        am.image_url = Set(Some(url));
    }
    if let Some(status) = patch.status {
        blog_post::validate_status(&status)?;
        am.status = Set(status);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_post(db: &DatabaseConnection, id: i64) -> Result<bool, ServiceError> {
    let res = blog_post::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn post_then_get_returns_the_same_fields() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let tag = uuid::Uuid::new_v4().simple().to_string();

        let created = create_post(
            &db,
            NewBlogPost {
                title: format!("Staking 101 {tag}"),
                slug: None,
                content: "how staking works".into(),
                author: "research".into(),
                image_url: Some("https://cdn.example.com/a.png".into()),
                status: Some("published".into()),
            },
        )
        .await?;

        let fetched = get_post(&db, created.id).await?.unwrap();
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.content, created.content);
        assert_eq!(fetched.image_url, created.image_url);
        assert_eq!(fetched.views, 1);

        let by_slug = get_post_by_slug(&db, &created.slug).await?.unwrap();
        assert_eq!(by_slug.id, created.id);
        assert_eq!(by_slug.views, 2);

        let updated = update_post(&db, created.id, BlogUpdate { status: Some("draft".into()), ..Default::default() }).await?;
        assert_eq!(updated.status, "draft");

        assert!(delete_post(&db, created.id).await?);
        assert!(get_post(&db, created.id).await?.is_none());
        assert!(!delete_post(&db, created.id).await?);
        Ok(())
    }
}
