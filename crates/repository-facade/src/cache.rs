//! # Cache Store
//!
//! Memoized member values live here, grouped under a [`CacheKey`] that names the repository
//! type and (depending on the [`CacheScope`]) the identity of the wrapped entity.
//!
//! ## Concurrency Model
//!
//! The shared [`CacheStore`] is a sharded map of slots, one per `(key, member)` pair. Each
//! slot is a mutex around an optional value. [`CacheStore::get_or_try_insert_with`] holds the
//! slot's mutex while computing, so callers racing on the same slot wait for the first
//! computation instead of running their own. Different slots never block each other.
//!
//! A computation must not read or write its own slot; doing so deadlocks.
//!
//! [`LocalCache`] is the instance-owned variant used by the `Local` scope and needs no locks.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::lock;

/// How cached members are shared between facade instances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheScope {
    /// One bucket per repository type, whatever entity it wraps.
    Class,
    /// One bucket per repository type and entity identity.
    #[default]
    Identity,
    /// Values stay on the facade instance and are never shared.
    Local,
}

/// Names a bucket in the shared cache store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub repository: &'static str,
    pub identity: Option<String>,
}

impl CacheKey {
    /// Derives the key for a repository under the given scope.
    ///
    /// `Class` drops the identity. `Local` has no shared bucket, but the key is still derived
    /// the same way as `Identity` so that logs stay comparable.
    pub fn derive(repository: &'static str, scope: CacheScope, identity: Option<String>) -> Self {
        let identity = match scope {
            CacheScope::Class => None,
            CacheScope::Identity | CacheScope::Local => identity,
        };
        Self {
            repository,
            identity,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            Some(identity) => write!(f, "{}{}", self.repository, identity),
            None => f.write_str(self.repository),
        }
    }
}

type Slot = Arc<Mutex<Option<Value>>>;

/// Process-wide store of computed member values.
#[derive(Default)]
pub struct CacheStore {
    slots: DashMap<(CacheKey, String), Slot>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &CacheKey, member: &str) -> Option<Slot> {
        self.slots
            .get(&(key.clone(), member.to_string()))
            .map(|slot| Arc::clone(slot.value()))
    }

    fn slot_or_insert(&self, key: &CacheKey, member: &str) -> Slot {
        // The shard guard is released before the slot is locked.
        let slot = self
            .slots
            .entry((key.clone(), member.to_string()))
            .or_default();
        Arc::clone(slot.value())
    }

    pub fn has(&self, key: &CacheKey, member: &str) -> bool {
        let Some(slot) = self.slot(key, member) else {
            return false;
        };
        let filled = lock::lock(&slot, "cache.has").is_some();
        filled
    }

    pub fn get(&self, key: &CacheKey, member: &str) -> Option<Value> {
        let slot = self.slot(key, member)?;
        let value = lock::lock(&slot, "cache.get").clone();
        value
    }

    pub fn set(&self, key: &CacheKey, member: &str, value: Value) {
        let slot = self.slot_or_insert(key, member);
        *lock::lock(&slot, "cache.set") = Some(value);
    }

    pub fn unset(&self, key: &CacheKey, member: &str) {
        if let Some(slot) = self.slot(key, member) {
            lock::lock(&slot, "cache.unset").take();
        }
    }

    /// Drops every member cached under `key`.
    pub fn clear_all(&self, key: &CacheKey) {
        self.slots.retain(|(slot_key, _), _| slot_key != key);
    }

    /// Returns the cached value, computing and storing it first if the slot is empty.
    ///
    /// Concurrent callers for the same `(key, member)` pair run `compute` at most once
    /// between them. An error leaves the slot empty and is returned to the caller that ran
    /// the computation; waiting callers then try again themselves.
    pub fn get_or_try_insert_with<F>(&self, key: &CacheKey, member: &str, compute: F) -> Result<Value>
    where
        F: FnOnce() -> Result<Value>,
    {
        let slot = self.slot_or_insert(key, member);
        let mut guard = lock::lock(&slot, "cache.compute");
        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }
        let value = compute()?;
        *guard = Some(value.clone());
        Ok(value)
    }

    /// Number of members holding a value, across all keys.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots.iter().map(|slot| Arc::clone(slot.value())).collect();
        slots
            .iter()
            .filter(|slot| lock::lock(slot, "cache.len").is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Member values owned by a single facade instance.
#[derive(Debug, Default, Clone)]
pub struct LocalCache {
    values: HashMap<String, Value>,
}

impl LocalCache {
    pub fn has(&self, member: &str) -> bool {
        self.values.contains_key(member)
    }

    pub fn get(&self, member: &str) -> Option<Value> {
        self.values.get(member).cloned()
    }

    pub fn set(&mut self, member: &str, value: Value) {
        self.values.insert(member.to_string(), value);
    }

    pub fn unset(&mut self, member: &str) {
        self.values.remove(member);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
