//! # Repository Context
//!
//! Facades are cheap, short-lived objects; what they share lives in a `RepositoryContext`:
//! the entity store, the cache store, the configuration, and the member and formula tables
//! built once for the repository type. The context hands out fresh facades, unbound or bound
//! to a given entity.
//!
//! Which lifetime the context has (per request, per session, process-wide) is up to the
//! embedding application. Dropping the context and its facades drops the shared cache.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::CacheStore;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::facade::Facade;
use crate::formula::FormulaRegistry;
use crate::members::Members;
use crate::repository::{EntityOf, Repository};

/// Factory for facades of repository type `R`.
pub struct RepositoryContext<R: Repository> {
    prototype: R,
    store: Arc<R::Store>,
    cache: Arc<CacheStore>,
    config: CacheConfig,
    members: Arc<Members<R>>,
    formulas: Arc<FormulaRegistry<EntityOf<R>>>,
}

impl<R: Repository + Clone> RepositoryContext<R> {
    /// `prototype` is cloned into every facade this context creates.
    pub fn new(prototype: R, store: Arc<R::Store>, cache: Arc<CacheStore>, config: CacheConfig) -> Self {
        let mut formulas = FormulaRegistry::default();
        R::formulas(&mut formulas);
        let members = Members::for_repository();
        debug!(
            repository = R::name(),
            members = members.names().count(),
            scope = ?config.scope_for::<R>(),
            "Repository context ready"
        );
        Self {
            prototype,
            store,
            cache,
            config,
            members: Arc::new(members),
            formulas: Arc::new(formulas),
        }
    }

    pub fn store(&self) -> &Arc<R::Store> {
        &self.store
    }

    pub fn cache_store(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// A fresh, unbound facade.
    pub fn facade(&self) -> Facade<R> {
        Facade::from_parts(
            self.prototype.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.cache),
            self.config.scope_for::<R>(),
            Arc::clone(&self.members),
            Arc::clone(&self.formulas),
        )
    }

    /// A fresh facade bound to `entity`.
    pub fn for_entity(&self, entity: EntityOf<R>) -> Facade<R> {
        self.facade().with_entity(entity)
    }

    /// Recomputes `member` on a fresh facade and returns it.
    pub fn call(&self, member: &str, args: &[Value]) -> Result<Option<Value>> {
        self.facade().re_cache(member, args)
    }
}
