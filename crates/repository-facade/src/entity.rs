//! # Entity Trait
//!
//! The `Entity` trait is the facade's view of a domain object: something that can be
//! serialized, asked for its identity, read attribute by attribute, and sent method calls by
//! name. Implementing it is enough for an entity type to be wrapped by a
//! [`Facade`](crate::Facade).
//!
//! # Provided Methods
//! - [`Entity::identity`] reads the primary-key attribute named by [`Entity::KEY`].
//! - [`Entity::attribute`] reads a field from the entity's serialized form.
//! - [`Entity::call`] rejects every method name.
//!
//! Override `call` to expose the methods that forwarding should reach.

use serde::Serialize;
use serde_json::Value;

use crate::error::{RepositoryError, Result};
use crate::store::Page;

/// Trait that any domain object must implement to be wrapped by a repository facade.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// Name of the primary-key attribute.
    const KEY: &'static str = "id";

    /// The identity used to scope cached members, or `None` for an unsaved entity.
    fn identity(&self) -> Option<String> {
        match self.attribute(Self::KEY)? {
            Value::Null => None,
            Value::String(id) => Some(id),
            other => Some(other.to_string()),
        }
    }

    /// Reads a single attribute by name.
    fn attribute(&self, name: &str) -> Option<Value> {
        match serde_json::to_value(self).ok()? {
            Value::Object(mut fields) => fields.remove(name),
            _ => None,
        }
    }

    /// Invokes a named method on the entity.
    fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value> {
        Err(RepositoryError::UnknownMethod {
            method: method.to_string(),
        })
    }
}

/// What a repository currently wraps: one entity, a fetched collection, or a page of results.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject<E> {
    Entity(E),
    Collection(Vec<E>),
    Page(Page<E>),
}

impl<E: Entity> Subject<E> {
    /// Short description of the variant, used in errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Entity(_) => "entity",
            Subject::Collection(_) => "collection",
            Subject::Page(_) => "page",
        }
    }

    /// True for collections and pages.
    pub fn is_list(&self) -> bool {
        !matches!(self, Subject::Entity(_))
    }

    /// Identity of a single entity; lists never have one.
    pub fn identity(&self) -> Option<String> {
        match self {
            Subject::Entity(entity) => entity.identity(),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&E> {
        match self {
            Subject::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_entity_mut(&mut self) -> Result<&mut E> {
        match self {
            Subject::Entity(entity) => Ok(entity),
            other => Err(RepositoryError::NotAnEntity {
                found: other.kind(),
            }),
        }
    }

    /// Reads an attribute off a single entity.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.as_entity()?.attribute(name)
    }

    /// The items of a list-shaped subject, or the lone entity.
    pub fn items(&self) -> &[E] {
        match self {
            Subject::Entity(entity) => std::slice::from_ref(entity),
            Subject::Collection(items) => items,
            Subject::Page(page) => &page.items,
        }
    }
}

impl<E> From<E> for Subject<E> {
    fn from(entity: E) -> Self {
        Subject::Entity(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Option<u64>,
        body: String,
    }

    impl Entity for Note {}

    #[test]
    fn identity_comes_from_the_key_attribute() {
        let saved = Note {
            id: Some(42),
            body: "hi".into(),
        };
        let unsaved = Note {
            id: None,
            body: "hi".into(),
        };
        assert_eq!(saved.identity().as_deref(), Some("42"));
        assert_eq!(unsaved.identity(), None);
    }

    #[test]
    fn attribute_reads_serialized_fields() {
        let note = Note {
            id: Some(1),
            body: "hello".into(),
        };
        assert_eq!(note.attribute("body"), Some(Value::from("hello")));
        assert_eq!(note.attribute("missing"), None);
    }

    #[test]
    fn default_call_rejects_every_method() {
        let mut note = Note {
            id: Some(1),
            body: String::new(),
        };
        let err = note.call("publish", &[]).unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownMethod { method } if method == "publish"));
    }

    #[test]
    fn collections_have_no_identity() {
        let note = Note {
            id: Some(7),
            body: String::new(),
        };
        let list = Subject::Collection(vec![note.clone()]);
        assert!(list.is_list());
        assert_eq!(list.identity(), None);
        assert_eq!(Subject::from(note).identity().as_deref(), Some("7"));
    }
}
