use std::cmp::Ordering;

use serde_json::Value;

use super::error::FilterError;
use super::filter::is_valid_identifier;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(order: Option<&FilterOrderInfo>) -> Result<String, FilterError> {
        let Some(info) = order else { return Ok(String::new()) };
        if !is_valid_identifier(&info.column) {
            return Err(FilterError::InvalidColumn(info.column.clone()));
        }
        Ok(format!("ORDER BY \"{}\" {}", info.column, info.sort.to_sql()))
    }

    /// Lexical comparison of the string form of two column values. Numbers sort as text.
    pub fn compare(left: Option<&Value>, right: Option<&Value>, sort: SortDirection) -> Ordering {
        let ordering = sort_key(left).cmp(&sort_key(right));
        match sort {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn sort_key(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
