//! # In-Memory Entity Store
//!
//! `MemoryStore<E>` is a complete [`EntityStore`] that keeps entities in a map guarded by a
//! read/write lock. It is what the tests and the demo application run against, and it is a
//! reasonable default for prototypes that have no database yet.
//!
//! ## Implementation Details
//!
//! The store keeps an ordered map from numeric id to entity and a counter (`next_id`) for id
//! generation, starting at 1.
//!
//! * **Create**: takes the next id, overlays the attributes on a default entity, writes the
//!   id into the [`Entity::KEY`] attribute and stores the result.
//! * **Update**: overlays the attributes on the stored entity (the key attribute is never
//!   overwritten) and refreshes the caller's copy.
//! * **Delete**: removes the entity by id.
//! * **Paginate**: the cursor is the last id of the previous page.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::entity::Entity;
use crate::error::{RepositoryError, Result};
use crate::lock;
use crate::store::{Attributes, EntityStore, Filters, Page};

/// Errors specific to the in-memory store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(String),
    #[error("Page size must be at least 1")]
    InvalidPageSize,
    #[error("Entity does not serialize to an object")]
    NotAnObject,
}

/// Thread-safe in-memory entity store.
pub struct MemoryStore<E> {
    entities: RwLock<BTreeMap<u64, E>>,
    next_id: AtomicU64,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Default for MemoryStore<E> {
    fn default() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            _entity: PhantomData,
        }
    }
}

impl<E> MemoryStore<E>
where
    E: Entity + DeserializeOwned + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock::read(&self.entities, "memory_store.len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a stored entity by its numeric id.
    pub fn find(&self, id: u64) -> Option<E> {
        lock::read(&self.entities, "memory_store.find")
            .get(&id)
            .cloned()
    }

    fn entity_type() -> &'static str {
        std::any::type_name::<E>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
    }

    fn stored_id(entity: &E) -> Option<u64> {
        entity.identity()?.parse().ok()
    }

    fn overlay(base: &E, attributes: Attributes) -> Result<E> {
        let Value::Object(mut fields) = serde_json::to_value(base)? else {
            return Err(RepositoryError::entity(MemoryStoreError::NotAnObject));
        };
        fields.extend(attributes);
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

impl<E> EntityStore for MemoryStore<E>
where
    E: Entity + DeserializeOwned + Default,
{
    type Entity = E;

    fn fetch_factory(&self) -> Result<Option<E>> {
        Ok(Some(E::default()))
    }

    fn get(&self, filters: &Filters) -> Result<Vec<E>> {
        let entities = lock::read(&self.entities, "memory_store.get");
        let found: Vec<E> = entities
            .values()
            .filter(|entity| filters.matches(*entity))
            .cloned()
            .collect();
        debug!(entity_type = Self::entity_type(), found = found.len(), "Get");
        Ok(found)
    }

    fn first(&self, filters: &Filters) -> Result<Option<E>> {
        let entities = lock::read(&self.entities, "memory_store.first");
        let found = entities
            .values()
            .find(|entity| filters.matches(*entity))
            .cloned();
        debug!(entity_type = Self::entity_type(), found = found.is_some(), "First");
        Ok(found)
    }

    fn paginate(&self, per_page: usize, filters: &Filters, cursor: Option<&str>) -> Result<Page<E>> {
        if per_page == 0 {
            return Err(RepositoryError::entity(MemoryStoreError::InvalidPageSize));
        }
        let after = match cursor {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| RepositoryError::entity(MemoryStoreError::InvalidCursor(raw.into())))?,
            None => 0,
        };
        let entities = lock::read(&self.entities, "memory_store.paginate");
        let matching: Vec<(&u64, &E)> = entities
            .iter()
            .filter(|(_, entity)| filters.matches(*entity))
            .collect();
        let remaining: Vec<&(&u64, &E)> = matching.iter().filter(|(id, _)| **id > after).collect();
        let items: Vec<E> = remaining
            .iter()
            .take(per_page)
            .map(|(_, entity)| (*entity).clone())
            .collect();
        let next_cursor = if remaining.len() > per_page {
            remaining
                .get(per_page - 1)
                .map(|(id, _)| id.to_string())
        } else {
            None
        };
        debug!(entity_type = Self::entity_type(), after, returned = items.len(), "Paginate");
        Ok(Page {
            items,
            per_page,
            total: matching.len(),
            next_cursor,
        })
    }

    fn create(&self, mut attributes: Attributes) -> Result<E> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        attributes.insert(E::KEY.to_string(), Value::from(id));
        let entity = Self::overlay(&E::default(), attributes)?;

        let mut entities = lock::write(&self.entities, "memory_store.create");
        entities.insert(id, entity.clone());
        info!(entity_type = Self::entity_type(), id, size = entities.len(), "Created");
        Ok(entity)
    }

    fn update(&self, entity: &mut E, mut attributes: Attributes) -> Result<bool> {
        let Some(id) = Self::stored_id(entity) else {
            return Ok(false);
        };
        attributes.remove(E::KEY);

        let mut entities = lock::write(&self.entities, "memory_store.update");
        let Some(stored) = entities.get_mut(&id) else {
            debug!(entity_type = Self::entity_type(), id, "Not found");
            return Ok(false);
        };
        let updated = Self::overlay(stored, attributes)?;
        *stored = updated.clone();
        *entity = updated;
        info!(entity_type = Self::entity_type(), id, "Updated");
        Ok(true)
    }

    fn delete(&self, entity: &E) -> Result<bool> {
        let Some(id) = Self::stored_id(entity) else {
            return Ok(false);
        };
        let mut entities = lock::write(&self.entities, "memory_store.delete");
        let removed = entities.remove(&id).is_some();
        if removed {
            info!(entity_type = Self::entity_type(), id, size = entities.len(), "Deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Task {
        id: Option<u64>,
        title: String,
        done: bool,
    }

    impl Entity for Task {}

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test attributes are objects"),
        }
    }

    fn seeded(count: usize) -> MemoryStore<Task> {
        let store = MemoryStore::new();
        for n in 0..count {
            store
                .create(attrs(json!({ "title": format!("task {n}"), "done": n % 2 == 0 })))
                .unwrap();
        }
        store
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let store = seeded(2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.find(1).unwrap().title, "task 0");
        assert_eq!(store.find(2).unwrap().id, Some(2));
    }

    #[test]
    fn get_and_first_apply_filters() {
        let store = seeded(4);
        let done = store.get(&Filters::new().eq("done", true)).unwrap();
        assert_eq!(done.len(), 2);
        let first_open = store.first(&Filters::new().eq("done", false)).unwrap();
        assert_eq!(first_open.unwrap().id, Some(2));
        let none = store.first(&Filters::new().eq("title", "nope")).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn update_refreshes_the_callers_copy() {
        let store = seeded(1);
        let mut task = store.find(1).unwrap();
        let changed = store
            .update(&mut task, attrs(json!({ "title": "renamed", "id": 99 })))
            .unwrap();
        assert!(changed);
        assert_eq!(task.title, "renamed");
        assert_eq!(task.id, Some(1));
        assert_eq!(store.find(1).unwrap().title, "renamed");
    }

    #[test]
    fn update_and_delete_report_missing_entities() {
        let store = seeded(1);
        let mut unsaved = Task::default();
        assert!(!store.update(&mut unsaved, Attributes::new()).unwrap());

        let task = store.find(1).unwrap();
        assert!(store.delete(&task).unwrap());
        assert!(!store.delete(&task).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn paginate_walks_pages_with_cursors() {
        let store = seeded(5);
        let first = store.paginate(2, &Filters::new(), None).unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total, 5);
        assert_eq!(first.next_cursor.as_deref(), Some("2"));

        let last = store.paginate(2, &Filters::new(), Some("4")).unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.next_cursor, None);
    }

    #[test]
    fn paginate_rejects_garbage_cursors() {
        let store = seeded(1);
        let err = store.paginate(2, &Filters::new(), Some("abc")).unwrap_err();
        assert!(matches!(err, RepositoryError::Entity(_)));
    }

    #[test]
    fn paginate_rejects_empty_pages() {
        let store = seeded(1);
        let err = store.paginate(0, &Filters::new(), None).unwrap_err();
        assert_eq!(err.to_string(), "Page size must be at least 1");
    }
}
