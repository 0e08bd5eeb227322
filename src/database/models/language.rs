use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{Base, Context, Entity, Note};

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: Base,
    pub name: String,
    pub alpha2_code: String,
    pub alpha3_code: String,
    pub icon: String,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
}

impl Entity for Language {
    const TABLE: &'static str = "languages";
    const COLUMNS: &'static [&'static str] = &["name", "alpha2_code", "alpha3_code", "icon"];

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(json!(self.name)),
            "alpha2_code" => Some(json!(self.alpha2_code)),
            "alpha3_code" => Some(json!(self.alpha3_code)),
            "icon" => Some(json!(self.icon)),
            _ => self.base.column(name),
        }
    }
}
