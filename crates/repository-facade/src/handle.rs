//! # Entity Handle
//!
//! The handle owns what a facade currently wraps. It starts empty (`UNBOUND`), resolves
//! lazily through [`EntityStore::fetch_factory`] on first access, and can be replaced or
//! reset at any time. Its identity feeds cache-key derivation.

use std::sync::Arc;

use tracing::debug;

use crate::entity::Subject;
use crate::error::Result;
use crate::store::EntityStore;

/// Lazily resolved, replaceable view of the wrapped entity.
pub struct EntityHandle<S: EntityStore> {
    store: Arc<S>,
    subject: Option<Subject<S::Entity>>,
}

impl<S: EntityStore> EntityHandle<S> {
    /// Creates an unbound handle backed by `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            subject: None,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn is_bound(&self) -> bool {
        self.subject.is_some()
    }

    /// The current subject, without triggering resolution.
    pub fn current(&self) -> Option<&Subject<S::Entity>> {
        self.subject.as_ref()
    }

    /// The current subject, resolving it through the store's factory if the handle is unbound.
    pub fn resolve(&mut self) -> Result<Option<&mut Subject<S::Entity>>> {
        if self.subject.is_none() {
            if let Some(entity) = self.store.fetch_factory()? {
                debug!("Resolved subject from factory");
                self.subject = Some(Subject::Entity(entity));
            }
        }
        Ok(self.subject.as_mut())
    }

    /// Identity of the current subject, used for cache keys. Does not resolve.
    pub fn identity(&self) -> Option<String> {
        self.subject.as_ref().and_then(Subject::identity)
    }

    /// Replaces the subject wholesale.
    pub fn replace(&mut self, subject: Subject<S::Entity>) {
        debug!(kind = subject.kind(), "Replaced subject");
        self.subject = Some(subject);
    }

    /// Replaces the subject only when a transform produced one.
    pub fn replace_if_some(&mut self, subject: Option<Subject<S::Entity>>) -> bool {
        match subject {
            Some(subject) => {
                self.replace(subject);
                true
            }
            None => false,
        }
    }

    /// Drops the subject, returning the handle to the unbound state.
    pub fn reset(&mut self) {
        self.subject = None;
    }
}
