use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Eq,
    Neq,
    Like,
    In,
}

/// A single predicate against a named column. Predicates on a `Filter` are joined with AND.
#[derive(Debug, Clone)]
pub struct Condition {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { column: column.into(), operator: FilterOp::Eq, data: value.into() }
    }

    pub fn neq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { column: column.into(), operator: FilterOp::Neq, data: value.into() }
    }

    /// SQL `LIKE` semantics: `%` matches any run of characters, `_` exactly one.
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self { column: column.into(), operator: FilterOp::Like, data: Value::String(pattern.into()) }
    }

    pub fn is_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let data = Value::Array(values.into_iter().map(Into::into).collect());
        Self { column: column.into(), operator: FilterOp::In, data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// Backend-specific row locking requested through `Filter::clauses`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Locking {
    ForUpdate,
    ForShare,
}

impl Locking {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Locking::ForUpdate => "FOR UPDATE",
            Locking::ForShare => "FOR SHARE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
