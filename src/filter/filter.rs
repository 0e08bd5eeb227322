use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, FilterOrderInfo, Locking, SortDirection, SqlResult};

/// Chainable query description shared by every repository backend.
///
/// Each call returns the builder by value, so a `Filter` obtained from `Repository::query`
/// is independent of every other one. The relational backend renders it to SQL; the
/// in-memory backend evaluates it against each entity's column accessor.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    conditions: Vec<Condition>,
    order: Option<FilterOrderInfo>,
    limit: Option<u64>,
    offset: Option<u64>,
    locking: Option<Locking>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            conditions: vec![],
            order: None,
            limit: None,
            offset: None,
            locking: None,
        }
    }

    /// Appends a predicate; predicates accumulate with AND.
    pub fn where_clause(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Sets the sort key. The last call wins.
    pub fn order(mut self, column: impl Into<String>, sort: SortDirection) -> Self {
        self.order = Some(FilterOrderInfo { column: column.into(), sort });
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Requests a row lock on reads. Only the relational backend honours it.
    pub fn clauses(mut self, locking: Locking) -> Self {
        self.locking = Some(locking);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn locking(&self) -> Option<Locking> {
        self.locking
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        self.validate_table_name()?;
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let order_clause = FilterOrder::generate(self.order.as_ref())?;

        let query = [
            format!("SELECT * FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            self.build_limit_clause(),
            self.build_locking_clause(),
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    /// Count over the same predicates, ignoring order and pagination.
    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        self.validate_table_name()?;
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) as count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) as count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        Ok(SqlResult { query, params })
    }

    /// Single-row lookup by id under the accumulated predicates and locking clause.
    pub fn to_first_sql(&self, id: &str) -> Result<SqlResult, FilterError> {
        self.validate_table_name()?;
        let (where_clause, mut params) = FilterWhere::generate(&self.conditions, 0)?;
        params.push(Value::String(id.to_string()));
        let id_clause = format!("\"id\" = ${}", params.len());

        let query = [
            format!("SELECT * FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { format!("WHERE {}", id_clause) } else { format!("WHERE {} AND {}", where_clause, id_clause) },
            "LIMIT 1".to_string(),
            self.build_locking_clause(),
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    /// True when every predicate holds for the values `lookup` returns per column.
    pub fn matches<F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<Value>,
    {
        self.conditions
            .iter()
            .all(|condition| FilterWhere::matches(condition, lookup(&condition.column).as_ref()))
    }

    /// Sorts (stable) by the order key, then applies offset and limit.
    pub fn arrange<T, F>(&self, mut items: Vec<T>, lookup: F) -> Vec<T>
    where
        F: Fn(&T, &str) -> Option<Value>,
    {
        if let Some(order) = &self.order {
            items.sort_by(|a, b| {
                let left = lookup(a, &order.column);
                let right = lookup(b, &order.column);
                FilterOrder::compare(left.as_ref(), right.as_ref(), order.sort)
            });
        }

        let offset = self.offset.unwrap_or(0) as usize;
        let limit = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }

    fn validate_table_name(&self) -> Result<(), FilterError> {
        if !is_valid_identifier(&self.table_name) {
            return Err(FilterError::InvalidTableName(self.table_name.clone()));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }

    fn build_locking_clause(&self) -> String {
        self.locking.map(|l| l.to_sql().to_string()).unwrap_or_default()
    }
}

pub(crate) fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_full_select() {
        let filter = Filter::new("notes")
            .where_clause(Condition::eq("user_id", "u1"))
            .where_clause(Condition::like("header", "%a%"))
            .order("created_at", SortDirection::Asc)
            .offset(20)
            .limit(10);
        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"notes\" WHERE \"user_id\" = $1 AND \"header\" LIKE $2 ORDER BY \"created_at\" ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn count_ignores_order_and_pagination() {
        let filter = Filter::new("notes")
            .where_clause(Condition::eq("user_id", "u1"))
            .order("created_at", SortDirection::Desc)
            .limit(5);
        let sql = filter.to_count_sql().unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) as count FROM \"notes\" WHERE \"user_id\" = $1");
    }

    #[test]
    fn first_appends_id_and_lock() {
        let filter = Filter::new("languages").clauses(Locking::ForUpdate);
        let sql = filter.to_first_sql("abc").unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"languages\" WHERE \"id\" = $1 LIMIT 1 FOR UPDATE");
        assert_eq!(sql.params, vec![json!("abc")]);

        let scoped = Filter::new("notes").where_clause(Condition::eq("user_id", "u1"));
        let sql = scoped.to_first_sql("n1").unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"notes\" WHERE \"user_id\" = $1 AND \"id\" = $2 LIMIT 1");
    }

    #[test]
    fn last_order_call_wins() {
        let filter = Filter::new("notes")
            .order("header", SortDirection::Desc)
            .order("created_at", SortDirection::Asc);
        assert!(filter.to_sql().unwrap().query.ends_with("ORDER BY \"created_at\" ASC"));
    }

    #[test]
    fn builders_are_independent() {
        let base = Filter::new("notes");
        let narrowed = base.clone().where_clause(Condition::eq("id", "1"));
        assert!(base.conditions().is_empty());
        assert_eq!(narrowed.conditions().len(), 1);
    }

    #[test]
    fn rejects_invalid_table() {
        assert!(matches!(Filter::new("bad-table").to_sql(), Err(FilterError::InvalidTableName(_))));
    }

    #[test]
    fn arranges_in_memory() {
        let filter = Filter::new("t").order("k", SortDirection::Desc).offset(1).limit(2);
        let rows = vec!["a", "d", "b", "c"];
        let out = filter.arrange(rows, |row, _| Some(json!(row)));
        assert_eq!(out, vec!["c", "b"]);
    }
}
