//! # Entity Store Contract
//!
//! The facade never talks to a database itself. Everything it needs from persistence goes
//! through the [`EntityStore`] trait: lazy resolution of an initial entity, queries, and the
//! create/update/delete lifecycle. The return shapes matter more than the bodies: the
//! presenter picks collection-style or single-style wrapping from them.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::error::Result;

/// Attribute payload for `create` and `update`.
pub type Attributes = Map<String, Value>;

/// Equality filters applied to entity attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    conditions: BTreeMap<String, Value>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an `attribute == value` condition.
    pub fn eq(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(attribute.into(), value.into());
        self
    }

    /// True when every condition holds for `entity`.
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        self.conditions
            .iter()
            .all(|(name, expected)| entity.attribute(name).as_ref() == Some(expected))
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub per_page: usize,
    pub total: usize,
    /// Cursor for the following page, `None` on the last one.
    pub next_cursor: Option<String>,
}

/// Persistence backend consumed by the facade.
///
/// Implementations may block on I/O; the facade treats every call as an opaque synchronous
/// request.
pub trait EntityStore: Send + Sync + 'static {
    type Entity: Entity;

    /// Produces the entity a facade binds to when nothing was injected.
    fn fetch_factory(&self) -> Result<Option<Self::Entity>>;

    fn get(&self, filters: &Filters) -> Result<Vec<Self::Entity>>;

    fn first(&self, filters: &Filters) -> Result<Option<Self::Entity>>;

    fn paginate(
        &self,
        per_page: usize,
        filters: &Filters,
        cursor: Option<&str>,
    ) -> Result<Page<Self::Entity>>;

    fn create(&self, attributes: Attributes) -> Result<Self::Entity>;

    /// Applies `attributes` to a persisted entity and refreshes `entity` in place.
    /// Returns `false` when the entity is not (or no longer) stored.
    fn update(&self, entity: &mut Self::Entity, attributes: Attributes) -> Result<bool>;

    /// Removes a persisted entity. Returns `false` when there was nothing to remove.
    fn delete(&self, entity: &Self::Entity) -> Result<bool>;
}
