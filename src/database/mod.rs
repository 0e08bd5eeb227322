pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod preload;
pub mod query_builder;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryRepository;
pub use models::Entity;
pub use postgres::PgRepository;
pub use preload::{HasMany, ManyToMany, Preload};
pub use repository::{ApplyFn, Repository};
