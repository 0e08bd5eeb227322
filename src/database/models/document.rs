use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{Base, Entity};

/// Metadata for a stored file. The bytes live in file storage under `location`/`name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: Base,
    pub name: String,
    pub location: String,
    pub extension: String,
    pub note_id: Option<String>,
    pub user_id: String,
    pub context_id: String,
    pub is_readable_by_all: bool,
}

impl Entity for Document {
    const TABLE: &'static str = "documents";
    const COLUMNS: &'static [&'static str] =
        &["name", "location", "extension", "note_id", "user_id", "context_id", "is_readable_by_all"];

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(json!(self.name)),
            "location" => Some(json!(self.location)),
            "extension" => Some(json!(self.extension)),
            "note_id" => Some(json!(self.note_id)),
            "user_id" => Some(json!(self.user_id)),
            "context_id" => Some(json!(self.context_id)),
            "is_readable_by_all" => Some(json!(self.is_readable_by_all)),
            _ => self.base.column(name),
        }
    }
}
