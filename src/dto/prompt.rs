use serde::{Deserialize, Serialize};

use super::comma_separated;
use crate::ports::{PromptAction, PromptSource};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPromptsRequest {
    #[serde(default, deserialize_with = "comma_separated")]
    pub ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub context_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct CreatePromptRequest {
    pub source: PromptSource,
    pub context_id: String,
    pub entity_id: Option<String>,
    pub action: PromptAction,
}

impl CreatePromptRequest {
    /// Remember-style prompt correlated with `entity_id`.
    pub fn remember(source: PromptSource, context_id: impl Into<String>, entity_id: Option<String>) -> Self {
        Self { source, context_id: context_id.into(), entity_id, action: PromptAction::Remember }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub value: String,
    #[serde(default)]
    pub context_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub reply: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPromptByEntityAndContextRequest {
    pub entity_id: String,
    pub context_id: Option<String>,
}
