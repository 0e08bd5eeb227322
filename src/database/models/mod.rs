use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{postgres::PgRow, FromRow};

pub mod context;
pub mod document;
pub mod language;
pub mod note;
pub mod prompt;
pub mod user;

pub use context::Context;
pub use document::Document;
pub use language::Language;
pub use note::Note;
pub use prompt::Prompt;
pub use user::{InvalidRole, Role, User, UserLanguage};

/// Columns every table carries. Stamped by the repository on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Base {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Base {
    pub fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "created_at" => Some(timestamp(&self.created_at)),
            "updated_at" => Some(timestamp(&self.updated_at)),
            _ => None,
        }
    }
}

// Fixed-width RFC 3339 so lexical order matches chronological order.
fn timestamp(at: &DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

/// A persisted record type.
///
/// `column` is the explicit accessor the in-memory store evaluates predicates and sort keys
/// against, and the relational store binds insert/update parameters from. It must answer for
/// every name in `COLUMNS` plus the base columns.
pub trait Entity:
    Clone + Send + Sync + Unpin + Serialize + for<'r> FromRow<'r, PgRow> + 'static
{
    const TABLE: &'static str;

    /// Writable columns, excluding `id`, `created_at` and `updated_at`.
    const COLUMNS: &'static [&'static str];

    fn base(&self) -> &Base;

    fn base_mut(&mut self) -> &mut Base;

    fn column(&self, name: &str) -> Option<Value>;

    fn id(&self) -> &str {
        &self.base().id
    }
}
