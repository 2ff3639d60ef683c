//! # Repository Errors
//!
//! This module defines the error type shared by the facade, the cache store and every
//! collaborator (entity stores, entities, resources, formulas). Collaborators return
//! [`RepositoryError`] directly so their failures reach the caller untranslated.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Errors that can occur while resolving, computing or presenting repository members.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Repository {0} has no entity bound")]
    Unbound(&'static str),
    #[error("Expected a single entity, found a {found}")]
    NotAnEntity { found: &'static str },
    #[error("Entity has no method `{method}`")]
    UnknownMethod { method: String },
    #[error("Unknown formula: {0}")]
    UnknownFormula(String),
    #[error(transparent)]
    Entity(Box<dyn std::error::Error + Send + Sync>),
    #[error("Resource {resource} rejected the result: {reason}")]
    Resource { resource: String, reason: String },
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RepositoryError {
    /// Boxes an error raised by an entity store or an entity.
    pub fn entity<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Entity(Box::new(error))
    }

    /// Builds a [`RepositoryError::Resource`] for a resource that cannot wrap a payload.
    pub fn resource(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resource {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}
