use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::filter::Filter;

/// Mutation applied to a freshly read row by `Repository::modify`.
pub type ApplyFn<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Persistence contract every service depends on, whatever the backing store.
///
/// Queries are described with a `Filter` obtained from `query()`; `count` and `find` take the
/// same filter so pagination metadata always reflects the predicates of the returned page.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// A fresh builder scoped to this entity's table.
    fn query(&self) -> Filter {
        Filter::new(T::TABLE)
    }

    /// Ordered, filtered, paginated rows. `preload` populates declared relations.
    async fn find(&self, filter: &Filter, preload: bool) -> Result<Vec<T>, DatabaseError>;

    /// Rows matching the filter's predicates, ignoring offset and limit.
    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError>;

    /// Exactly one row by id under the filter's predicates, or `DatabaseError::NotFound`.
    async fn first(&self, filter: &Filter, id: &str, preload: bool) -> Result<T, DatabaseError>;

    /// Assigns an id, stamps both timestamps and returns the stored row.
    async fn create(&self, entity: T) -> Result<T, DatabaseError>;

    /// Overwrites the row with the entity's id and stamps `updated_at`.
    async fn update(&self, entity: T) -> Result<T, DatabaseError>;

    /// Removes the row; relational backends also remove declared owned rows.
    async fn delete(&self, id: &str) -> Result<(), DatabaseError>;

    /// Read, apply, write. Runs under the filter's locking clause where the backend supports it.
    async fn modify(&self, filter: &Filter, id: &str, apply: ApplyFn<T>) -> Result<T, DatabaseError>;

    async fn get(&self, id: &str, preload: bool) -> Result<T, DatabaseError> {
        self.first(&self.query(), id, preload).await
    }
}
