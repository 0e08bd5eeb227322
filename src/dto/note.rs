use serde::{Deserialize, Serialize};

use super::comma_separated;
use crate::database::models::Note;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNotesRequest {
    #[serde(default, deserialize_with = "comma_separated")]
    pub ids: Option<Vec<String>>,
    pub header: Option<String>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub user_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub language_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub context_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub header: String,
    #[serde(default)]
    pub payload: String,
    pub language_id: String,
    /// Filled from the token on authenticated routes.
    pub user_id: Option<String>,
    #[serde(default)]
    pub context_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub id: String,
    pub header: Option<String>,
    pub payload: Option<String>,
    pub language_id: Option<String>,
}

/// A note plus the outcome of forwarding it to the assistant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    #[serde(flatten)]
    pub note: Note,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}
