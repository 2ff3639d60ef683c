//! # Formulas
//!
//! A formula is a reusable, one-shot transform of whatever a repository wraps: narrowing a
//! collection, swapping an entity for a related one, and so on. Returning `None` keeps the
//! current subject.
//!
//! Repositories register formulas by name in a [`FormulaRegistry`], together with a factory
//! that builds the formula from call arguments.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::entity::{Entity, Subject};
use crate::error::{RepositoryError, Result};

/// A stateless transform applied to the wrapped subject.
pub trait Formula<E: Entity>: Send + Sync {
    fn apply(&self, subject: &Subject<E>) -> Result<Option<Subject<E>>>;
}

impl<E, F> Formula<E> for F
where
    E: Entity,
    F: Fn(&Subject<E>) -> Result<Option<Subject<E>>> + Send + Sync,
{
    fn apply(&self, subject: &Subject<E>) -> Result<Option<Subject<E>>> {
        self(subject)
    }
}

type FormulaFactory<E> = Arc<dyn Fn(&[Value]) -> Result<Box<dyn Formula<E>>> + Send + Sync>;

/// Named formula factories for one repository type.
pub struct FormulaRegistry<E: Entity> {
    factories: HashMap<&'static str, FormulaFactory<E>>,
}

impl<E: Entity> Default for FormulaRegistry<E> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<E: Entity> FormulaRegistry<E> {
    /// Registers a factory under `name`. A later registration with the same name wins.
    pub fn register<F>(&mut self, name: &'static str, factory: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Box<dyn Formula<E>>> + Send + Sync + 'static,
    {
        self.factories.insert(name, Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds the formula registered under `name` from `args`.
    pub fn resolve(&self, name: &str, args: &[Value]) -> Result<Box<dyn Formula<E>>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RepositoryError::UnknownFormula(name.to_string()))?;
        factory(args)
    }
}
