use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{Base, Document, Entity, Note, Prompt};

/// Conversation scope shared with the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: Base,
    pub user_id: String,
    pub language_id: String,
    /// Correlation id on the assistant side.
    pub external_id: String,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<Prompt>,
}

impl Entity for Context {
    const TABLE: &'static str = "contexts";
    const COLUMNS: &'static [&'static str] = &["user_id", "language_id", "external_id"];

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
            "external_id" => Some(json!(self.external_id)),
            _ => self.base.column(name),
        }
    }
}
