use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{Base, Entity};

/// Rendered text sent to the assistant, correlated to the entity that produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: Base,
    pub value: String,
    pub context_id: String,
    pub entity_id: Option<String>,
}

impl Entity for Prompt {
    const TABLE: &'static str = "prompts";
    const COLUMNS: &'static [&'static str] = &["value", "context_id", "entity_id"];

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "value" => Some(json!(self.value)),
            "context_id" => Some(json!(self.context_id)),
            "entity_id" => Some(json!(self.entity_id)),
            _ => self.base.column(name),
        }
    }
}
