use serde_json::Value;

use super::error::FilterError;
use super::filter::is_valid_identifier;
use super::types::{Condition, FilterOp};

pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self { param_values: vec![], param_index: starting_param_index }
    }

    /// Renders the conditions as an AND-joined SQL fragment. Empty input renders as an empty string.
    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(filter_where.build_sql_condition(condition)?);
        }
        Ok((sql_conditions.join(" AND "), filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> Result<String, FilterError> {
        if !is_valid_identifier(&condition.column) {
            return Err(FilterError::InvalidColumn(condition.column.clone()));
        }

        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() { Ok(format!("{} IS NULL", quoted_column)) }
                else { Ok(format!("{} = {}", quoted_column, self.param(condition.data.clone()))) }
            }
            FilterOp::Neq => {
                if condition.data.is_null() { Ok(format!("{} IS NOT NULL", quoted_column)) }
                else { Ok(format!("{} <> {}", quoted_column, self.param(condition.data.clone()))) }
            }
            FilterOp::Like => {
                if !condition.data.is_string() {
                    return Err(FilterError::InvalidOperatorData(format!("LIKE on {} requires a string pattern", condition.column)));
                }
                Ok(format!("{} LIKE {}", quoted_column, self.param(condition.data.clone())))
            }
            FilterOp::In => {
                if let Value::Array(values) = &condition.data {
                    if values.is_empty() { return Ok("1=0".to_string()); }
                    let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                    Ok(format!("{} IN ({})", quoted_column, params.join(", ")))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.param(condition.data.clone())))
                }
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// Evaluates a condition against a value read through an entity's column accessor.
    /// A missing column compares as null.
    pub fn matches(condition: &Condition, field: Option<&Value>) -> bool {
        let field = field.unwrap_or(&Value::Null);
        match condition.operator {
            FilterOp::Eq => values_equal(field, &condition.data),
            FilterOp::Neq => !values_equal(field, &condition.data),
            FilterOp::Like => match (field.as_str(), condition.data.as_str()) {
                (Some(text), Some(pattern)) => like_matches(text, pattern),
                _ => false,
            },
            FilterOp::In => match &condition.data {
                Value::Array(values) => values.iter().any(|v| values_equal(field, v)),
                other => values_equal(field, other),
            },
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// SQL `LIKE` matching without escape support.
pub fn like_matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut ti, mut pi) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        if pi < pattern.len() && pattern[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < pattern.len() && (pattern[pi] == '_' || pattern[pi] == text[ti]) {
            ti += 1;
            pi += 1;
        } else if let Some((star, mark)) = backtrack {
            pi = star + 1;
            ti = mark + 1;
            backtrack = Some((star, mark + 1));
        } else {
            return false;
        }
    }
    while pi < pattern.len() && pattern[pi] == '%' { pi += 1; }
    pi == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generates_and_joined_conditions() {
        let conditions = vec![
            Condition::eq("user_id", "7"),
            Condition::like("header", "%verb%"),
            Condition::is_in("language_id", ["1", "2"]),
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(sql, "\"user_id\" = $1 AND \"header\" LIKE $2 AND \"language_id\" IN ($3, $4)");
        assert_eq!(params, vec![json!("7"), json!("%verb%"), json!("1"), json!("2")]);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, params) = FilterWhere::generate(&[Condition::is_in("id", Vec::<String>::new())], 0).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn null_equality_renders_is_null() {
        let (sql, _) = FilterWhere::generate(&[Condition::eq("note_id", Value::Null)], 3).unwrap();
        assert_eq!(sql, "\"note_id\" IS NULL");
    }

    #[test]
    fn rejects_unsafe_column_names() {
        let result = FilterWhere::generate(&[Condition::eq("id; DROP TABLE users", "1")], 0);
        assert!(matches!(result, Err(FilterError::InvalidColumn(_))));
    }

    #[test]
    fn evaluates_conditions_in_memory() {
        assert!(FilterWhere::matches(&Condition::eq("role", 2), Some(&json!(2))));
        assert!(!FilterWhere::matches(&Condition::eq("role", 1), Some(&json!(2))));
        assert!(FilterWhere::matches(&Condition::is_in("id", ["1", "3"]), Some(&json!("3"))));
        assert!(!FilterWhere::matches(&Condition::is_in("id", ["1", "3"]), None));
        assert!(FilterWhere::matches(&Condition::eq("note_id", Value::Null), None));
        assert!(FilterWhere::matches(&Condition::neq("name", "a"), Some(&json!("b"))));
    }

    #[test]
    fn like_wildcards() {
        assert!(like_matches("irregular verbs", "%verb%"));
        assert!(like_matches("verbs", "verb_"));
        assert!(like_matches("abc", "%"));
        assert!(like_matches("", "%"));
        assert!(!like_matches("verbs", "verb"));
        assert!(!like_matches("nouns", "%verb%"));
        assert!(like_matches("a%b", "a%b"));
        assert!(like_matches("mississippi", "m%iss%ppi"));
    }
}
