use std::marker::PhantomData;

use serde_json::Value;
use sqlx::{postgres::PgArguments, FromRow, PgExecutor, Row};

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::filter::{Filter, SqlResult};

/// A rendered statement for one entity type, executed against a pool or a transaction.
pub struct QueryBuilder<T> {
    sql: SqlResult,
    _phantom: PhantomData<T>,
}

impl<T: Entity> QueryBuilder<T> {
    pub fn new(sql: SqlResult) -> Self {
        Self { sql, _phantom: PhantomData }
    }

    pub fn select(filter: &Filter) -> Result<Self, DatabaseError> {
        Ok(Self::new(filter.to_sql()?))
    }

    pub fn select_by_id(filter: &Filter, id: &str) -> Result<Self, DatabaseError> {
        Ok(Self::new(filter.to_first_sql(id)?))
    }

    pub fn count(filter: &Filter) -> Result<Self, DatabaseError> {
        Ok(Self::new(filter.to_count_sql()?))
    }

    /// `INSERT ... RETURNING *` with the entity's writable columns; timestamps come from the database.
    pub fn insert(entity: &T, id: &str) -> Self {
        let mut columns = vec!["\"id\"".to_string()];
        let mut placeholders = vec!["$1".to_string()];
        let mut params = vec![Value::String(id.to_string())];

        for column in T::COLUMNS {
            params.push(entity.column(column).unwrap_or(Value::Null));
            columns.push(format!("\"{}\"", column));
            placeholders.push(format!("${}", params.len()));
        }

        let query = format!(
            "INSERT INTO \"{}\" ({}, \"created_at\", \"updated_at\") VALUES ({}, now(), now()) RETURNING *",
            T::TABLE,
            columns.join(", "),
            placeholders.join(", ")
        );
        Self::new(SqlResult { query, params })
    }

    /// `UPDATE ... RETURNING *` overwriting every writable column of the row with the entity's id.
    pub fn update(entity: &T) -> Self {
        let mut assignments = Vec::with_capacity(T::COLUMNS.len());
        let mut params = Vec::with_capacity(T::COLUMNS.len() + 1);

        for column in T::COLUMNS {
            params.push(entity.column(column).unwrap_or(Value::Null));
            assignments.push(format!("\"{}\" = ${}", column, params.len()));
        }
        params.push(Value::String(entity.id().to_string()));

        let query = format!(
            "UPDATE \"{}\" SET {}, \"updated_at\" = now() WHERE \"id\" = ${} RETURNING *",
            T::TABLE,
            assignments.join(", "),
            params.len()
        );
        Self::new(SqlResult { query, params })
    }

    pub fn query(&self) -> &str {
        &self.sql.query
    }

    pub async fn fetch_all<'c, E>(&self, executor: E) -> Result<Vec<T>, DatabaseError>
    where
        E: PgExecutor<'c>,
    {
        let mut q = sqlx::query_as::<_, T>(&self.sql.query);
        for p in self.sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(executor).await?)
    }

    pub async fn fetch_optional<'c, E>(&self, executor: E) -> Result<Option<T>, DatabaseError>
    where
        E: PgExecutor<'c>,
    {
        let mut q = sqlx::query_as::<_, T>(&self.sql.query);
        for p in self.sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_optional(executor).await?)
    }

    pub async fn fetch_count<'c, E>(&self, executor: E) -> Result<i64, DatabaseError>
    where
        E: PgExecutor<'c>,
    {
        let mut q = sqlx::query(&self.sql.query);
        for p in self.sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(executor).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

/// Runs a statement that returns no rows and reports the affected row count.
pub async fn execute<'c, E>(sql: &SqlResult, executor: E) -> Result<u64, DatabaseError>
where
    E: PgExecutor<'c>,
{
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query(q, p);
    }
    Ok(q.execute(executor).await?.rows_affected())
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
