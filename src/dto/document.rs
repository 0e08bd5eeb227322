use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::comma_separated;
use crate::database::models::Document;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDocumentsRequest {
    #[serde(default, deserialize_with = "comma_separated")]
    pub ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub user_ids: Option<Vec<String>>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub extension: Option<String>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub note_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub context_ids: Option<Vec<String>>,
}

/// Fields shared by single and bulk uploads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentBase {
    #[serde(default)]
    pub user_id: String,
    pub location: String,
    #[serde(default)]
    pub is_readable_by_all: bool,
    pub context_id: String,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: String,
}

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub base: CreateDocumentBase,
    pub file: UploadedFile,
}

#[derive(Debug, Clone)]
pub struct CreateDocumentsRequest {
    pub base: CreateDocumentBase,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentWrapped {
    #[serde(flatten)]
    pub document: Document,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    #[serde(flatten)]
    pub document: DocumentWrapped,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}
