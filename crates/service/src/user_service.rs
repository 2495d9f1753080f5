use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use chrono::Utc;
use rand::rngs::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Deserialize;
use tracing::{info, instrument};

use models::user;
use crate::{errors::ServiceError, pagination::Pagination};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUpdate {
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<String>,
    pub status: Option<String>,
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::Hash(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Register a new account with an argon2 password hash.
#[instrument(skip(db, input), fields(username = %input.username))]
pub async fn register(db: &DatabaseConnection, input: RegisterInput) -> Result<user::Model, ServiceError> {
    let password_hash = hash_password(&input.password)?;
    let created = user::create(
        db,
        user::NewUser {
            username: input.username,
            email: input.email,
            password_hash,
            full_name: input.full_name,
            phone: input.phone,
            country: input.country,
        },
    )
    .await?;
    info!(user_id = created.id, "user_registered");
    Ok(created)
}

/// Get a user by id.
pub async fn get_user(db: &DatabaseConnection, id: i64) -> Result<Option<user::Model>, ServiceError> {
    let found = user::Entity::find_by_id(id).one(db).await?;
    Ok(found)
}

/// List users, newest first, optionally filtered by role and status.
pub async fn list_users(db: &DatabaseConnection, filter: &UserFilter, page: Pagination) -> Result<Vec<user::Model>, ServiceError> {
    let (offset, limit) = page.window();
    let mut q = user::Entity::find();
    if let Some(role) = &filter.role {
        q = q.filter(user::Column::Role.eq(role.as_str()));
    }
    if let Some(status) = &filter.status {
        q = q.filter(user::Column::Status.eq(status.as_str()));
    }
    let users = q.order_by_desc(user::Column::Id).offset(offset).limit(limit).all(db).await?;
    Ok(users)
}

async fn load(db: &DatabaseConnection, id: i64) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("user"))
}

/// Update the caller-editable profile fields.
pub async fn update_profile(db: &DatabaseConnection, id: i64, patch: ProfileUpdate) -> Result<user::Model, ServiceError> {
    let mut am: user::ActiveModel = load(db, id).await?.into();
    if let Some(name) = patch.full_name {
        models::errors::require("full_name", &name)?;
        am.full_name = Set(name);
    }
    if let Some(email) = patch.email {
        user::validate_email(&email)?;
        am.email = Set(email.trim().to_lowercase());
    }
    if let Some(phone) = patch.phone {
        am.phone = Set(Some(phone));
    }
    if let Some(country) = patch.country {
        am.country = Set(Some(country));
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Change role and/or account status.
#[instrument(skip(db))]
pub async fn admin_update(db: &DatabaseConnection, id: i64, patch: AdminUpdate) -> Result<user::Model, ServiceError> {
    let mut am: user::ActiveModel = load(db, id).await?.into();
    if let Some(role) = patch.role {
        user::validate_role(&role)?;
        am.role = Set(role);
    }
    if let Some(status) = patch.status {
        user::validate_status(&status)?;
        am.status = Set(status);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(user_id = id, role = %updated.role, status = %updated.status, "user_admin_updated");
    Ok(updated)
}

/// Replace the password after verifying the current one.
#[instrument(skip(db, current, new_password))]
pub async fn change_password(db: &DatabaseConnection, id: i64, current: &str, new_password: &str) -> Result<(), ServiceError> {
    let found = load(db, id).await?;
    if !verify_password(current, &found.password_hash)? {
        return Err(ServiceError::Validation("current password is incorrect".into()));
    }
    let hash = hash_password(new_password)?;
    let mut am: user::ActiveModel = found.into();
    am.password_hash = Set(hash);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await?;
    info!(user_id = id, "password_changed");
    Ok(())
}

/// Delete a user. Wallet and ledger rows go with it.
pub async fn delete_user(db: &DatabaseConnection, id: i64) -> Result<bool, ServiceError> {
    Ok(user::hard_delete(db, id).await?)
}
