use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{Base, Document, Entity};

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: Base,
    pub header: String,
    pub payload: String,
    pub user_id: String,
    pub language_id: String,
    pub context_id: String,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,
}

impl Entity for Note {
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] = &["header", "payload", "user_id", "language_id", "context_id"];

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "header" => Some(json!(self.header)),
            "payload" => Some(json!(self.payload)),
            "user_id" => Some(json!(self.user_id)),
            "language_id" => Some(json!(self.language_id)),
            "context_id" => Some(json!(self.context_id)),
            _ => self.base.column(name),
        }
    }
}
