use serde::Deserialize;

use super::comma_separated;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterLanguagesRequest {
    #[serde(default, deserialize_with = "comma_separated")]
    pub ids: Option<Vec<String>>,
    pub name: Option<String>,
    pub alpha2_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLanguageRequest {
    pub name: String,
    pub alpha2_code: String,
    pub alpha3_code: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLanguageRequest {
    pub id: String,
    pub name: Option<String>,
    pub alpha2_code: Option<String>,
    pub alpha3_code: Option<String>,
    pub icon: Option<String>,
}
