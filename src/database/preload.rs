use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;

/// Eager loader for one declared relation of `P`.
#[async_trait]
pub trait Preload<P: Entity>: Send + Sync {
    async fn load(&self, pool: &PgPool, parents: &mut [P]) -> Result<(), DatabaseError>;
}

/// Children whose `foreign_key` column holds the parent id.
pub struct HasMany<P, C> {
    foreign_key: &'static str,
    attach: fn(&mut P, Vec<C>),
    _phantom: PhantomData<fn() -> (P, C)>,
}

impl<P, C> HasMany<P, C> {
    pub fn new(foreign_key: &'static str, attach: fn(&mut P, Vec<C>)) -> Self {
        Self { foreign_key, attach, _phantom: PhantomData }
    }
}

#[async_trait]
impl<P: Entity, C: Entity> Preload<P> for HasMany<P, C> {
    async fn load(&self, pool: &PgPool, parents: &mut [P]) -> Result<(), DatabaseError> {
        if parents.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = parents.iter().map(|p| p.id().to_string()).collect();
        let query = format!(
            "SELECT * FROM \"{}\" WHERE \"{}\" = ANY($1) ORDER BY \"created_at\" ASC",
            C::TABLE,
            self.foreign_key
        );
        let children = sqlx::query_as::<_, C>(&query).bind(&ids).fetch_all(pool).await?;

        let mut grouped: HashMap<String, Vec<C>> = HashMap::new();
        for child in children {
            if let Some(Value::String(owner)) = child.column(self.foreign_key) {
                grouped.entry(owner).or_default().push(child);
            }
        }
        for parent in parents.iter_mut() {
            let owner = parent.id().to_string();
            (self.attach)(parent, grouped.remove(&owner).unwrap_or_default());
        }
        Ok(())
    }
}

/// Targets reached through a join table holding `owner_key` and `target_key`.
pub struct ManyToMany<P, C> {
    join_table: &'static str,
    owner_key: &'static str,
    target_key: &'static str,
    attach: fn(&mut P, Vec<C>),
    _phantom: PhantomData<fn() -> (P, C)>,
}

impl<P, C> ManyToMany<P, C> {
    pub fn new(
        join_table: &'static str,
        owner_key: &'static str,
        target_key: &'static str,
        attach: fn(&mut P, Vec<C>),
    ) -> Self {
        Self { join_table, owner_key, target_key, attach, _phantom: PhantomData }
    }
}

#[async_trait]
impl<P: Entity, C: Entity> Preload<P> for ManyToMany<P, C> {
    async fn load(&self, pool: &PgPool, parents: &mut [P]) -> Result<(), DatabaseError> {
        if parents.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = parents.iter().map(|p| p.id().to_string()).collect();
        let query = format!(
            "SELECT t.*, j.\"{owner}\" AS \"preload_owner_id\" FROM \"{target}\" t \
             JOIN \"{join}\" j ON j.\"{target_key}\" = t.\"id\" \
             WHERE j.\"{owner}\" = ANY($1) ORDER BY t.\"created_at\" ASC",
            owner = self.owner_key,
            target = C::TABLE,
            join = self.join_table,
            target_key = self.target_key,
        );
        let rows = sqlx::query(&query).bind(&ids).fetch_all(pool).await?;

        let mut grouped: HashMap<String, Vec<C>> = HashMap::new();
        for row in rows.iter() {
            let owner: String = row.try_get("preload_owner_id")?;
            grouped.entry(owner).or_default().push(C::from_row(row)?);
        }
        for parent in parents.iter_mut() {
            let owner = parent.id().to_string();
            (self.attach)(parent, grouped.remove(&owner).unwrap_or_default());
        }
        Ok(())
    }
}
