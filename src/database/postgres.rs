use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::database::preload::Preload;
use crate::database::query_builder::{execute, QueryBuilder};
use crate::database::repository::{ApplyFn, Repository};
use crate::filter::{Filter, SqlResult};

/// Rows removed together with their owner: `DELETE FROM table WHERE foreign_key = <owner id>`.
/// With `through`, the rows hang off an intermediate table instead:
/// `foreign_key IN (SELECT id FROM <through.0> WHERE <through.1> = <owner id>)`.
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub through: Option<(&'static str, &'static str)>,
}

impl Cascade {
    pub fn to_sql(&self) -> String {
        match self.through {
            None => format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", self.table, self.foreign_key),
            Some((parent, parent_key)) => format!(
                "DELETE FROM \"{}\" WHERE \"{}\" IN (SELECT \"id\" FROM \"{}\" WHERE \"{}\" = $1)",
                self.table, self.foreign_key, parent, parent_key
            ),
        }
    }
}

/// Postgres-backed repository. Relations to preload and owned rows to cascade are declared
/// per repository when the application state is assembled.
pub struct PgRepository<T: Entity> {
    pool: PgPool,
    preloads: Vec<Arc<dyn Preload<T>>>,
    cascades: Vec<Cascade>,
}

impl<T: Entity> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, preloads: vec![], cascades: vec![] }
    }

    pub fn with_preload(mut self, preload: impl Preload<T> + 'static) -> Self {
        self.preloads.push(Arc::new(preload));
        self
    }

    pub fn with_cascade(mut self, table: &'static str, foreign_key: &'static str) -> Self {
        self.cascades.push(Cascade { table, foreign_key, through: None });
        self
    }

    /// Cascades run in declaration order, so declare these before the cascade that removes
    /// the intermediate rows.
    pub fn with_cascade_through(
        mut self,
        table: &'static str,
        foreign_key: &'static str,
        parent: &'static str,
        parent_key: &'static str,
    ) -> Self {
        self.cascades.push(Cascade { table, foreign_key, through: Some((parent, parent_key)) });
        self
    }

    async fn run_preloads(&self, rows: &mut [T]) -> Result<(), DatabaseError> {
        for preload in &self.preloads {
            preload.load(&self.pool, rows).await?;
        }
        Ok(())
    }

    fn not_found(id: &str) -> DatabaseError {
        DatabaseError::NotFound(format!("{} {} not found", T::TABLE, id))
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository<T> {
    async fn find(&self, filter: &Filter, preload: bool) -> Result<Vec<T>, DatabaseError> {
        let mut rows = QueryBuilder::<T>::select(filter)?.fetch_all(&self.pool).await?;
        if preload {
            self.run_preloads(&mut rows).await?;
        }
        Ok(rows)
    }

    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        QueryBuilder::<T>::count(filter)?.fetch_count(&self.pool).await
    }

    async fn first(&self, filter: &Filter, id: &str, preload: bool) -> Result<T, DatabaseError> {
        let mut row = QueryBuilder::<T>::select_by_id(filter, id)?
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        if preload {
            self.run_preloads(std::slice::from_mut(&mut row)).await?;
        }
        Ok(row)
    }

    async fn create(&self, entity: T) -> Result<T, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let created = QueryBuilder::<T>::insert(&entity, &id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(&id))?;
        tracing::debug!("Created {} {}", T::TABLE, id);
        Ok(created)
    }

    async fn update(&self, entity: T) -> Result<T, DatabaseError> {
        QueryBuilder::<T>::update(&entity)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(entity.id()))
    }

    async fn delete(&self, id: &str) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let params = vec![Value::String(id.to_string())];

        for cascade in &self.cascades {
            let sql = SqlResult { query: cascade.to_sql(), params: params.clone() };
            let removed = execute(&sql, &mut *tx).await?;
            if removed > 0 {
                tracing::debug!("Cascaded delete of {} rows from {}", removed, cascade.table);
            }
        }

        let sql = SqlResult { query: format!("DELETE FROM \"{}\" WHERE \"id\" = $1", T::TABLE), params };
        if execute(&sql, &mut *tx).await? == 0 {
            tx.rollback().await?;
            return Err(Self::not_found(id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn modify(&self, filter: &Filter, id: &str, apply: ApplyFn<T>) -> Result<T, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut row = QueryBuilder::<T>::select_by_id(filter, id)?
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        apply(&mut row);
        row.base_mut().id = id.to_string();

        let updated = QueryBuilder::<T>::update(&row)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        tx.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascades_render_direct_and_nested_deletes() {
        let direct = Cascade { table: "notes", foreign_key: "user_id", through: None };
        assert_eq!(direct.to_sql(), "DELETE FROM \"notes\" WHERE \"user_id\" = $1");

        let nested = Cascade { table: "prompts", foreign_key: "context_id", through: Some(("contexts", "user_id")) };
        assert_eq!(
            nested.to_sql(),
            "DELETE FROM \"prompts\" WHERE \"context_id\" IN (SELECT \"id\" FROM \"contexts\" WHERE \"user_id\" = $1)"
        );
    }
}
