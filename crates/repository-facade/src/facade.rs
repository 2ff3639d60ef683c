//! # Repository Facade
//!
//! `Facade<R>` is the orchestrator. It combines a user-defined [`Repository`] with an
//! [`EntityHandle`], a [`CacheStore`] (or an instance-local cache) and the resource
//! presenter, and exposes the memoization and dispatch operations callers use.
//!
//! ## Dispatch Rules
//!
//! * **Computed members** are the names registered in [`Repository::members`]. They are
//!   computed at most once per cache bucket and served from the cache afterwards.
//! * **Properties** ([`Facade::property`]) route through [`Facade::cache`] when the name is a
//!   computed member or already cached; otherwise the attribute is read off the live entity
//!   and cached as a side effect.
//! * **Forwarded calls** ([`Facade::forward`]) go straight to the entity and are never cached.
//!
//! ## Cache Buckets
//!
//! The bucket is chosen by the repository's [`CacheScope`]:
//!
//! | Scope | Bucket |
//! |-------|--------|
//! | `Class` | repository name |
//! | `Identity` | repository name + entity identity |
//! | `Local` | this facade instance only |
//!
//! ## Resource Wrapping
//!
//! [`Facade::resource`] returns a [`Wrapped`] builder. Each of its operations consumes it, so
//! a resource applies to exactly one access and later calls return raw values again.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheKey, CacheScope, CacheStore, LocalCache};
use crate::config::CacheConfig;
use crate::entity::{Entity, Subject};
use crate::error::{RepositoryError, Result};
use crate::formula::{Formula, FormulaRegistry};
use crate::handle::EntityHandle;
use crate::members::Members;
use crate::presenter::{present, Payload, Resource};
use crate::repository::{EntityOf, Repository};
use crate::store::{Attributes, EntityStore, Filters, Page};

/// Caching, dispatching facade over a repository's entity.
pub struct Facade<R: Repository> {
    repository: R,
    handle: EntityHandle<R::Store>,
    cache: Arc<CacheStore>,
    local: LocalCache,
    scope: CacheScope,
    members: Arc<Members<R>>,
    formulas: Arc<FormulaRegistry<EntityOf<R>>>,
    success: Option<bool>,
}

impl<R: Repository> fmt::Debug for Facade<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("repository", &R::name())
            .field("scope", &self.scope)
            .field("identity", &self.identity())
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl<R: Repository> Facade<R> {
    /// Creates an unbound facade with the repository's own scope (or `Identity`).
    pub fn new(repository: R, store: Arc<R::Store>, cache: Arc<CacheStore>) -> Self {
        let mut formulas = FormulaRegistry::default();
        R::formulas(&mut formulas);
        Self::from_parts(
            repository,
            store,
            cache,
            CacheConfig::default().scope_for::<R>(),
            Arc::new(Members::for_repository()),
            Arc::new(formulas),
        )
    }

    pub(crate) fn from_parts(
        repository: R,
        store: Arc<R::Store>,
        cache: Arc<CacheStore>,
        scope: CacheScope,
        members: Arc<Members<R>>,
        formulas: Arc<FormulaRegistry<EntityOf<R>>>,
    ) -> Self {
        Self {
            repository,
            handle: EntityHandle::new(store),
            cache,
            local: LocalCache::default(),
            scope,
            members,
            formulas,
            success: None,
        }
    }

    /// Applies the configured default scope unless the repository pins its own.
    pub fn with_config(mut self, config: &CacheConfig) -> Self {
        self.scope = config.scope_for::<R>();
        self
    }

    pub fn with_scope(mut self, scope: CacheScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_entity(mut self, entity: EntityOf<R>) -> Self {
        self.handle.replace(Subject::Entity(entity));
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache_scope(&self) -> CacheScope {
        self.scope
    }

    /// The bucket this facade currently reads and writes.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::derive(R::name(), self.scope, self.handle.identity())
    }

    // --- Memoization ---

    pub fn has_cache(&self, member: &str) -> bool {
        match self.scope {
            CacheScope::Local => self.local.has(member),
            CacheScope::Class | CacheScope::Identity => self.cache.has(&self.cache_key(), member),
        }
    }

    /// Returns the cached value of `member`, computing it first when it is a registered member
    /// that has no value yet.
    ///
    /// Names that are neither registered nor cached resolve to `Ok(None)`.
    pub fn cache(&mut self, member: &str, args: &[Value]) -> Result<Option<Value>> {
        let repository = R::name();
        let Some(compute) = self.members.get(member) else {
            let stored = self.stored(member);
            if stored.is_none() {
                debug!(repository, member, "Unknown member");
            }
            return Ok(stored);
        };

        match self.scope {
            CacheScope::Local => {
                if let Some(value) = self.local.get(member) {
                    debug!(repository, member, "Local cache hit");
                    return Ok(Some(value));
                }
                debug!(repository, member, "Local cache miss");
                let value = compute(self, args)?;
                self.local.set(member, value.clone());
                Ok(Some(value))
            }
            CacheScope::Class | CacheScope::Identity => {
                let key = self.cache_key();
                let cache = Arc::clone(&self.cache);
                let value = cache.get_or_try_insert_with(&key, member, || {
                    debug!(repository, member, %key, "Cache miss");
                    compute(self, args)
                })?;
                Ok(Some(value))
            }
        }
    }

    /// Drops any cached value for `member`, then behaves like [`Facade::cache`].
    pub fn re_cache(&mut self, member: &str, args: &[Value]) -> Result<Option<Value>> {
        if self.has_cache(member) {
            debug!(repository = R::name(), member, "Evicting before recompute");
            self.unset(member);
        }
        self.cache(member, args)
    }

    /// Recomputes `member` for its side effect only.
    pub fn init_cache(&mut self, member: &str, args: &[Value]) -> Result<&mut Self> {
        self.re_cache(member, args)?;
        Ok(self)
    }

    /// Recomputes `member` only when `condition` holds.
    pub fn init_eq_cache(&mut self, condition: bool, member: &str, args: &[Value]) -> Result<&mut Self> {
        if condition {
            self.re_cache(member, args)?;
        }
        Ok(self)
    }

    /// Shortcut for [`Facade::re_cache`], for callers that treat the facade as a function.
    pub fn invoke(&mut self, member: &str, args: &[Value]) -> Result<Option<Value>> {
        self.re_cache(member, args)
    }

    /// Drops every cached member of the current bucket.
    pub fn clean(&mut self) -> &mut Self {
        match self.scope {
            CacheScope::Local => self.local.clear(),
            CacheScope::Class | CacheScope::Identity => self.clean_cache(),
        }
        self
    }

    /// Drops the shared bucket for this facade's key, whatever its scope.
    pub fn clean_cache(&self) {
        let key = self.cache_key();
        debug!(repository = R::name(), %key, "Clearing cache bucket");
        self.cache.clear_all(&key);
    }

    fn stored(&self, member: &str) -> Option<Value> {
        match self.scope {
            CacheScope::Local => self.local.get(member),
            CacheScope::Class | CacheScope::Identity => self.cache.get(&self.cache_key(), member),
        }
    }

    fn store(&mut self, member: &str, value: Value) {
        match self.scope {
            CacheScope::Local => self.local.set(member, value),
            CacheScope::Class | CacheScope::Identity => {
                self.cache.set(&self.cache_key(), member, value);
            }
        }
    }

    fn unset(&mut self, member: &str) {
        match self.scope {
            CacheScope::Local => self.local.unset(member),
            CacheScope::Class | CacheScope::Identity => self.cache.unset(&self.cache_key(), member),
        }
    }

    // --- Dynamic access ---

    /// Reads `name` as a property: a computed or cached member if there is one, otherwise the
    /// live entity's attribute, which is then cached.
    ///
    /// A missing attribute gives `Ok(None)` and, unlike a present one, is not written to the
    /// cache: no null placeholder is stored, so the next read asks the entity again.
    pub fn property(&mut self, name: &str) -> Result<Option<Value>> {
        if self.members.contains(name) || self.has_cache(name) {
            return self.cache(name, &[]);
        }
        let value = self
            .handle
            .resolve()?
            .and_then(|subject| subject.attribute(name));
        if let Some(value) = &value {
            debug!(repository = R::name(), member = name, "Caching entity attribute");
            self.store(name, value.clone());
        }
        Ok(value)
    }

    /// Writes `value` straight into the cache under `name`, bypassing computation.
    pub fn set_property(&mut self, name: &str, value: Value) -> &mut Self {
        self.store(name, value);
        self
    }

    /// Calls `method` on the live entity. The result is returned as-is and never cached.
    pub fn forward(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        let repository = R::name();
        let subject = self
            .handle
            .resolve()?
            .ok_or(RepositoryError::Unbound(repository))?;
        debug!(repository, method, "Forwarding call");
        subject.as_entity_mut()?.call(method, args)
    }

    // --- Resources ---

    /// Wraps the next access with `resource`.
    pub fn resource<'a>(&'a mut self, resource: &'a dyn Resource) -> Wrapped<'a, R> {
        Wrapped {
            facade: self,
            resource,
        }
    }

    /// [`Facade::cache`] followed by presentation through `resource`. Absent values stay absent.
    pub fn read_wrapped(
        &mut self,
        member: &str,
        args: &[Value],
        resource: &dyn Resource,
    ) -> Result<Option<Value>> {
        self.cache(member, args)?
            .map(|raw| present(Payload::from(raw), resource))
            .transpose()
    }

    /// Presents the current subject (not a member) through `resource`.
    pub fn wrap(&mut self, resource: &dyn Resource) -> Result<Value> {
        self.handle.resolve()?;
        self.present_current(resource)
    }

    fn present_current(&self, resource: &dyn Resource) -> Result<Value> {
        let payload = match self.handle.current() {
            Some(subject) => Payload::from_subject(subject)?,
            None => Payload::Item(Value::Null),
        };
        present(payload, resource)
    }

    // --- Subject transforms ---

    /// Resolves the formula registered as `name` and applies it.
    pub fn formula(&mut self, name: &str, args: &[Value]) -> Result<&mut Self> {
        let formula = self.formulas.resolve(name, args)?;
        debug!(repository = R::name(), formula = name, "Applying formula");
        self.apply_formula(formula.as_ref())
    }

    /// Applies `formula` to the current subject, replacing it if the formula returns one.
    pub fn apply_formula(&mut self, formula: &dyn Formula<EntityOf<R>>) -> Result<&mut Self> {
        let replacement = match self.handle.resolve()? {
            Some(subject) => formula.apply(subject)?,
            None => return Err(RepositoryError::Unbound(R::name())),
        };
        self.handle.replace_if_some(replacement);
        Ok(self)
    }

    /// Applies an ad hoc transform to the current subject, with the same replacement rule as
    /// formulas.
    pub fn scope<F>(&mut self, transform: F) -> Result<&mut Self>
    where
        F: FnOnce(&Subject<EntityOf<R>>) -> Result<Option<Subject<EntityOf<R>>>>,
    {
        let replacement = match self.handle.resolve()? {
            Some(subject) => transform(subject)?,
            None => return Err(RepositoryError::Unbound(R::name())),
        };
        self.handle.replace_if_some(replacement);
        Ok(self)
    }

    // --- Subject management ---

    /// The current subject, resolved through the store's factory on first access.
    pub fn model(&mut self) -> Result<Option<&Subject<EntityOf<R>>>> {
        Ok(self.handle.resolve()?.map(|subject| &*subject))
    }

    /// The current subject if it is a single entity.
    pub fn entity(&mut self) -> Result<Option<&EntityOf<R>>> {
        Ok(self.model()?.and_then(Subject::as_entity))
    }

    pub fn set_model(&mut self, subject: impl Into<Subject<EntityOf<R>>>) -> &mut Self {
        self.handle.replace(subject.into());
        self
    }

    pub fn set_entity(&mut self, entity: EntityOf<R>) -> &mut Self {
        self.set_model(entity)
    }

    pub fn reset_model(&mut self) -> &mut Self {
        self.handle.reset();
        self
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_bound()
    }

    pub fn identity(&self) -> Option<String> {
        self.handle.identity()
    }

    /// Outcome of the last `update` or `delete`.
    pub fn is_success(&self) -> Option<bool> {
        self.success
    }

    // --- Store helpers ---

    /// Fetches matching entities and makes the collection the new subject.
    pub fn fetch(&mut self, filters: &Filters) -> Result<Vec<EntityOf<R>>> {
        let items = self.handle.store().get(filters)?;
        self.handle.replace(Subject::Collection(items.clone()));
        Ok(items)
    }

    /// Fetches the first match and binds it. With no match the facade becomes unbound.
    pub fn first(&mut self, filters: &Filters) -> Result<Option<EntityOf<R>>> {
        let found = self.handle.store().first(filters)?;
        match &found {
            Some(entity) => self.handle.replace(Subject::Entity(entity.clone())),
            None => self.handle.reset(),
        }
        Ok(found)
    }

    pub fn paginate(
        &mut self,
        per_page: usize,
        filters: &Filters,
        cursor: Option<&str>,
    ) -> Result<Page<EntityOf<R>>> {
        let page = self.handle.store().paginate(per_page, filters, cursor)?;
        self.handle.replace(Subject::Page(page.clone()));
        Ok(page)
    }

    /// Creates an entity and binds it.
    pub fn create(&mut self, attributes: Attributes) -> Result<EntityOf<R>> {
        let entity = self.handle.store().create(attributes)?;
        self.handle.replace(Subject::Entity(entity.clone()));
        Ok(entity)
    }

    /// Updates the bound entity in place.
    pub fn update(&mut self, attributes: Attributes) -> Result<bool> {
        let store = Arc::clone(self.handle.store());
        let subject = self
            .handle
            .resolve()?
            .ok_or(RepositoryError::Unbound(R::name()))?;
        let updated = store.update(subject.as_entity_mut()?, attributes)?;
        self.success = Some(updated);
        Ok(updated)
    }

    /// Deletes the bound entity. The subject is kept so it can still be presented.
    pub fn delete(&mut self) -> Result<bool> {
        let store = Arc::clone(self.handle.store());
        let subject = self
            .handle
            .resolve()?
            .ok_or(RepositoryError::Unbound(R::name()))?;
        let deleted = store.delete(subject.as_entity_mut()?)?;
        self.success = Some(deleted);
        Ok(deleted)
    }
}

/// A facade armed with a resource for exactly one access.
///
/// Created by [`Facade::resource`]; every method consumes the builder.
pub struct Wrapped<'a, R: Repository> {
    facade: &'a mut Facade<R>,
    resource: &'a dyn Resource,
}

impl<'a, R: Repository> Wrapped<'a, R> {
    pub fn cache(self, member: &str, args: &[Value]) -> Result<Option<Value>> {
        self.facade.read_wrapped(member, args, self.resource)
    }

    pub fn re_cache(self, member: &str, args: &[Value]) -> Result<Option<Value>> {
        self.facade
            .re_cache(member, args)?
            .map(|raw| present(Payload::from(raw), self.resource))
            .transpose()
    }

    pub fn property(self, name: &str) -> Result<Option<Value>> {
        self.facade
            .property(name)?
            .map(|raw| present(Payload::from(raw), self.resource))
            .transpose()
    }

    pub fn wrap(self) -> Result<Value> {
        self.facade.wrap(self.resource)
    }

    pub fn fetch(self, filters: &Filters) -> Result<Value> {
        self.facade.fetch(filters)?;
        self.facade.present_current(self.resource)
    }

    pub fn first(self, filters: &Filters) -> Result<Value> {
        self.facade.first(filters)?;
        self.facade.present_current(self.resource)
    }

    pub fn paginate(self, per_page: usize, filters: &Filters, cursor: Option<&str>) -> Result<Value> {
        self.facade.paginate(per_page, filters, cursor)?;
        self.facade.present_current(self.resource)
    }

    pub fn create(self, attributes: Attributes) -> Result<Value> {
        self.facade.create(attributes)?;
        self.facade.present_current(self.resource)
    }

    pub fn update(self, attributes: Attributes) -> Result<Value> {
        self.facade.update(attributes)?;
        self.facade.present_current(self.resource)
    }

    pub fn delete(self) -> Result<Value> {
        self.facade.delete()?;
        self.facade.present_current(self.resource)
    }
}
