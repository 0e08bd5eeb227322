use serde::{Deserialize, Deserializer};

pub mod auth;
pub mod context;
pub mod document;
pub mod language;
pub mod note;
pub mod pagination;
pub mod prompt;
pub mod user;

pub use pagination::{PageQuery, PageRequest, PaginationResponse};

/// Query-string lists arrive as `ids=1,2,3`. Blank input is treated as absent.
pub fn comma_separated<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let values: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    Ok(if values.is_empty() { None } else { Some(values) })
}

/// Optional update fields: an empty string means "leave unchanged", same as an absent one.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
