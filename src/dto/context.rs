use serde::Deserialize;

use super::comma_separated;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterContextsRequest {
    #[serde(default, deserialize_with = "comma_separated")]
    pub ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub user_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub language_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContextRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub language_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContextRequest {
    pub id: String,
    pub language_id: Option<String>,
    pub external_id: Option<String>,
}
