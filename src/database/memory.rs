use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::database::repository::{ApplyFn, Repository};
use crate::filter::Filter;

struct MemoryState<T> {
    rows: BTreeMap<u64, T>,
    id_counter: u64,
}

/// Map-backed repository used by tests and by the server when no database is configured.
///
/// Ids are a counter rendered as strings, starting at "1". Predicates are evaluated through
/// `Entity::column`, ordering is lexical on the column's string form, and row locking is not
/// emulated. Clones share the same rows.
pub struct InMemoryRepository<T> {
    state: Arc<RwLock<MemoryState<T>>>,
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self { state: Arc::clone(&self.state) }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState { rows: BTreeMap::new(), id_counter: 0 })),
        }
    }
}

fn key(id: &str) -> Option<u64> {
    id.parse().ok()
}

fn not_found<T: Entity>(id: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {} not found", T::TABLE, id))
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn find(&self, filter: &Filter, _preload: bool) -> Result<Vec<T>, DatabaseError> {
        let state = self.state.read().await;
        let matched: Vec<T> = state
            .rows
            .values()
            .filter(|row| filter.matches(|column| row.column(column)))
            .cloned()
            .collect();
        Ok(filter.arrange(matched, |row, column| row.column(column)))
    }

    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        let state = self.state.read().await;
        let total = state.rows.values().filter(|row| filter.matches(|column| row.column(column))).count();
        Ok(total as i64)
    }

    async fn first(&self, filter: &Filter, id: &str, _preload: bool) -> Result<T, DatabaseError> {
        let state = self.state.read().await;
        key(id)
            .and_then(|k| state.rows.get(&k))
            .filter(|row| filter.matches(|column| row.column(column)))
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    async fn create(&self, mut entity: T) -> Result<T, DatabaseError> {
        let mut state = self.state.write().await;
        state.id_counter += 1;
        let id = state.id_counter;

        let now = Utc::now();
        let base = entity.base_mut();
        base.id = id.to_string();
        base.created_at = now;
        base.updated_at = now;

        state.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, mut entity: T) -> Result<T, DatabaseError> {
        let mut state = self.state.write().await;
        let id = entity.id().to_string();
        let slot = match key(&id) {
            Some(k) => state.rows.get_mut(&k),
            None => None,
        }
        .ok_or_else(|| not_found::<T>(&id))?;

        entity.base_mut().updated_at = Utc::now();
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: &str) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        key(id)
            .and_then(|k| state.rows.remove(&k))
            .map(|_| ())
            .ok_or_else(|| not_found::<T>(id))
    }

    async fn modify(&self, filter: &Filter, id: &str, apply: ApplyFn<T>) -> Result<T, DatabaseError> {
        let mut state = self.state.write().await;
        let slot = match key(id) {
            Some(k) => state.rows.get_mut(&k),
            None => None,
        }
        .filter(|row| filter.matches(|column| row.column(column)))
        .ok_or_else(|| not_found::<T>(id))?;

        let mut entity = slot.clone();
        apply(&mut entity);
        let base = entity.base_mut();
        base.id = id.to_string();
        base.created_at = slot.base().created_at;
        base.updated_at = Utc::now();

        *slot = entity.clone();
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Note;
    use crate::filter::{Condition, SortDirection};

    fn note(header: &str, user_id: &str) -> Note {
        Note { header: header.to_string(), user_id: user_id.to_string(), ..Default::default() }
    }

    async fn seeded() -> InMemoryRepository<Note> {
        let repo = InMemoryRepository::new();
        for (header, user) in [("b", "u1"), ("a", "u1"), ("c", "u2"), ("d", "u1")] {
            repo.create(note(header, user)).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn create_assigns_monotonic_string_ids() {
        let repo = InMemoryRepository::new();
        let first = repo.create(note("a", "u1")).await.unwrap();
        let second = repo.create(note("b", "u1")).await.unwrap();
        assert_eq!(first.base.id, "1");
        assert_eq!(second.base.id, "2");
        assert_eq!(first.base.created_at, first.base.updated_at);
    }

    #[tokio::test]
    async fn find_requires_every_predicate() {
        let repo = seeded().await;
        let filter = repo
            .query()
            .where_clause(Condition::eq("user_id", "u1"))
            .where_clause(Condition::is_in("header", ["a", "c"]));
        let rows = repo.find(&filter, false).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].header, "a");
    }

    #[tokio::test]
    async fn count_ignores_pagination_on_same_filter() {
        let repo = seeded().await;
        let filter = repo
            .query()
            .where_clause(Condition::eq("user_id", "u1"))
            .order("header", SortDirection::Asc)
            .offset(1)
            .limit(1);
        let rows = repo.find(&filter, false).await.unwrap();
        let total = repo.count(&filter).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.iter().map(|n| n.header.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[tokio::test]
    async fn first_and_delete_report_missing_ids() {
        let repo = seeded().await;
        assert!(matches!(repo.get("99", false).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(repo.get("not-a-number", false).await, Err(DatabaseError::NotFound(_))));
        repo.delete("1").await.unwrap();
        assert!(matches!(repo.delete("1").await, Err(DatabaseError::NotFound(_))));
        assert_eq!(repo.count(&repo.query()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn update_overwrites_and_restamps() {
        let repo = seeded().await;
        let mut stored = repo.get("2", false).await.unwrap();
        stored.header = "changed".into();
        let updated = repo.update(stored.clone()).await.unwrap();
        assert_eq!(updated.header, "changed");
        assert!(updated.base.updated_at >= stored.base.updated_at);
        assert_eq!(repo.get("2", false).await.unwrap().header, "changed");

        let ghost = Note { base: crate::database::models::Base { id: "42".into(), ..Default::default() }, ..Default::default() };
        assert!(matches!(repo.update(ghost).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn modify_keeps_identity() {
        let repo = seeded().await;
        let before = repo.get("3", false).await.unwrap();
        let after = repo
            .modify(&repo.query(), "3", Box::new(|n: &mut Note| {
                n.header = "z".into();
                n.base.id = "hijack".into();
            }))
            .await
            .unwrap();
        assert_eq!(after.base.id, "3");
        assert_eq!(after.base.created_at, before.base.created_at);
        assert_eq!(repo.get("3", false).await.unwrap().header, "z");
    }

    #[tokio::test]
    async fn scoped_first_hides_foreign_rows() {
        let repo = seeded().await;
        let scoped = repo.query().where_clause(Condition::eq("user_id", "u2"));
        assert!(repo.first(&scoped, "3", false).await.is_ok());
        assert!(matches!(repo.first(&scoped, "1", false).await, Err(DatabaseError::NotFound(_))));
    }
}
