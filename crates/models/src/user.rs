use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::wallet;

pub const ROLES: [&str; 2] = ["admin", "user"];
pub const STATUSES: [&str; 3] = ["active", "suspended", "closed"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub role: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Wallet,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Wallet => Entity::has_one(wallet::Entity).into(),
        }
    }
}

impl Related<wallet::Entity> for Entity {
    fn to() -> RelationDef { Relation::Wallet.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => Ok(()),
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let len = username.chars().count();
    if !(3..=64).contains(&len) {
        return Err(ModelError::Validation("username must be 3-64 characters".into()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-') {
        return Err(ModelError::Validation("username may only contain letters, digits, '_', '.' and '-'".into()));
    }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<(), ModelError> {
    if ROLES.contains(&role) { Ok(()) } else { Err(ModelError::Validation(format!("unknown role '{role}'"))) }
}

pub fn validate_status(status: &str) -> Result<(), ModelError> {
    if STATUSES.contains(&status) { Ok(()) } else { Err(ModelError::Validation(format!("unknown user status '{status}'"))) }
}

/// Fields for a new account. The password is already hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub country: Option<String>,
}

pub async fn create(db: &DatabaseConnection, new: NewUser) -> Result<Model, ModelError> {
    validate_username(&new.username)?;
    validate_email(&new.email)?;
    errors::require("full_name", &new.full_name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        username: Set(new.username),
        email: Set(new.email.trim().to_lowercase()),
        password_hash: Set(new.password_hash),
        full_name: Set(new.full_name),
        phone: Set(new.phone),
        country: Set(new.country),
        role: Set("user".into()),
        status: Set("active".into()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn hard_delete(db: &DatabaseConnection, id: i64) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_local_part_and_dotted_domain() {
        assert!(validate_email("a@b.io").is_ok());
        assert!(validate_email("@b.io").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }

    #[test]
    fn username_charset_and_length() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn role_and_status_are_closed_sets() {
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("root").is_err());
        assert!(validate_status("suspended").is_ok());
        assert!(validate_status("deleted").is_err());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let now = Utc::now().into();
        let m = Model {
            id: 1,
            username: "alice".into(),
            email: "a@b.io".into(),
            password_hash: "secret".into(),
            full_name: "Alice".into(),
            phone: None,
            country: None,
            role: "user".into(),
            status: "active".into(),
            created_at: now,
            updated_at: now,
        };
        let v = serde_json::to_value(&m).unwrap();
        assert!(v.get("password_hash").is_none());
        assert_eq!(v["username"], "alice");
    }
}
