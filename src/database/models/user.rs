use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use thiserror::Error;

use super::{Base, Context, Document, Entity, Language, Note};

#[derive(Debug, Error)]
#[error("invalid role: {0}")]
pub struct InvalidRole(pub i64);

/// Serialized as its number, which is also what tokens carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Role {
    Admin = 1,
    #[default]
    Customer = 2,
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role as u8
    }
}

impl TryFrom<i64> for Role {
    type Error = InvalidRole;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Customer),
            other => Err(InvalidRole(other)),
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = InvalidRole;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Role::try_from(value as i64)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: Base,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "i64")]
    pub role: Role,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<Language>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["name", "email", "password_hash", "role"];

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(json!(self.name)),
            "email" => Some(json!(self.email)),
            "password_hash" => Some(json!(self.password_hash)),
            "role" => Some(json!(self.role as i64)),
            _ => self.base.column(name),
        }
    }
}

/// Join row for the user/language many-to-many.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserLanguage {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: Base,
    pub user_id: String,
    pub language_id: String,
}

impl Entity for UserLanguage {
    const TABLE: &'static str = "user_languages";
    const COLUMNS: &'static [&'static str] = &["user_id", "language_id"];

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "user_id" => Some(json!(self.user_id)),
            "language_id" => Some(json!(self.language_id)),
            _ => self.base.column(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_as_number() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!(1));
        assert_eq!(serde_json::from_value::<Role>(json!(2)).unwrap(), Role::Customer);
        assert!(serde_json::from_value::<Role>(json!(7)).is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User { name: "Ada".into(), password_hash: "secret".into(), ..Default::default() };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["role"], json!(2));
        assert!(value.get("notes").is_none());
    }
}
