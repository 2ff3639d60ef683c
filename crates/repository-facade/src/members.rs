//! # Computed Members
//!
//! Each repository type declares the members it can compute in a registration table. The
//! facade consults the table to decide whether a name is a cacheable computed member or a
//! pass-through attribute of the wrapped entity.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::facade::Facade;
use crate::repository::Repository;

/// A compute function for one member.
pub type Compute<R> = Arc<dyn Fn(&mut Facade<R>, &[Value]) -> Result<Value> + Send + Sync>;

/// Registration table of computed members for a repository type.
pub struct Members<R: Repository> {
    table: HashMap<&'static str, Compute<R>>,
}

impl<R: Repository> Default for Members<R> {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
        }
    }
}

impl<R: Repository> Members<R> {
    /// Builds the table declared by `R`.
    pub fn for_repository() -> Self {
        let mut members = Self::default();
        R::members(&mut members);
        members
    }

    /// Registers `compute` under `name`. A later registration with the same name wins.
    pub fn register<F>(&mut self, name: &'static str, compute: F) -> &mut Self
    where
        F: Fn(&mut Facade<R>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.table.insert(name, Arc::new(compute));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Compute<R>> {
        self.table.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.table.keys().copied()
    }
}
