//! # Resource Presenter
//!
//! Resources turn raw results into their presentation-layer shape. A resource may expose a
//! collection constructor, a single-item constructor, both, or neither; it always supports
//! direct construction. [`present`] picks one, in this order:
//!
//! 1. a list-shaped payload and a resource with a collection constructor: `collection`;
//! 2. a resource with a single-item constructor: `make` (lists included);
//! 3. otherwise `construct`, with the raw payload as the only argument.
//!
//! The same call site can therefore serve rich resources and plain wrappers alike.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::entity::{Entity, Subject};
use crate::error::Result;
use crate::store::Page;

/// A raw result handed to a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Item(Value),
    List(Vec<Value>),
    Page(Page<Value>),
}

impl Payload {
    pub fn is_list(&self) -> bool {
        !matches!(self, Payload::Item(_))
    }

    /// Serializes a subject, keeping its shape.
    pub fn from_subject<E: Entity>(subject: &Subject<E>) -> Result<Self> {
        Ok(match subject {
            Subject::Entity(entity) => Payload::Item(serde_json::to_value(entity)?),
            Subject::Collection(items) => Payload::List(to_values(items)?),
            Subject::Page(page) => Payload::Page(Page {
                items: to_values(&page.items)?,
                per_page: page.per_page,
                total: page.total,
                next_cursor: page.next_cursor.clone(),
            }),
        })
    }

    /// Flattens the payload back into a single JSON value.
    pub fn into_value(self) -> Value {
        match self {
            Payload::Item(value) => value,
            Payload::List(items) => Value::Array(items),
            Payload::Page(page) => Value::Array(page.items),
        }
    }
}

/// Arrays are list-shaped; everything else is a single item.
impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Payload::List(items),
            other => Payload::Item(other),
        }
    }
}

fn to_values<T: Serialize>(items: &[T]) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(Into::into))
        .collect()
}

/// A presentation-layer wrapper type.
///
/// Override `has_collection`/`has_make` together with `collection`/`make` to expose the
/// corresponding constructor.
pub trait Resource: Send + Sync {
    fn name(&self) -> &str;

    fn has_collection(&self) -> bool {
        false
    }

    fn has_make(&self) -> bool {
        false
    }

    /// Collection-style construction.
    fn collection(&self, payload: Payload) -> Result<Value> {
        self.construct(payload)
    }

    /// Single-item construction.
    fn make(&self, payload: Payload) -> Result<Value> {
        self.construct(payload)
    }

    /// Direct construction with the raw payload.
    fn construct(&self, payload: Payload) -> Result<Value>;
}

/// Wraps `payload` with `resource`, following the three-tier fallback.
pub fn present(payload: Payload, resource: &dyn Resource) -> Result<Value> {
    if payload.is_list() && resource.has_collection() {
        debug!(resource = resource.name(), "Presenting collection");
        resource.collection(payload)
    } else if resource.has_make() {
        debug!(resource = resource.name(), "Presenting single item");
        resource.make(payload)
    } else {
        debug!(resource = resource.name(), "Constructing resource directly");
        resource.construct(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use serde_json::json;

    struct Full;

    impl Resource for Full {
        fn name(&self) -> &str {
            "Full"
        }
        fn has_collection(&self) -> bool {
            true
        }
        fn has_make(&self) -> bool {
            true
        }
        fn collection(&self, payload: Payload) -> Result<Value> {
            Ok(json!({ "via": "collection", "data": payload.into_value() }))
        }
        fn make(&self, payload: Payload) -> Result<Value> {
            Ok(json!({ "via": "make", "data": payload.into_value() }))
        }
        fn construct(&self, payload: Payload) -> Result<Value> {
            Ok(json!({ "via": "construct", "data": payload.into_value() }))
        }
    }

    struct MakeOnly;

    impl Resource for MakeOnly {
        fn name(&self) -> &str {
            "MakeOnly"
        }
        fn has_make(&self) -> bool {
            true
        }
        fn make(&self, payload: Payload) -> Result<Value> {
            Ok(json!({ "via": "make", "data": payload.into_value() }))
        }
        fn construct(&self, _payload: Payload) -> Result<Value> {
            unreachable!("make is preferred")
        }
    }

    struct Strict;

    impl Resource for Strict {
        fn name(&self) -> &str {
            "Strict"
        }
        fn construct(&self, payload: Payload) -> Result<Value> {
            match payload {
                Payload::Item(value) if value.is_object() => Ok(json!({ "via": "construct", "data": value })),
                _ => Err(RepositoryError::resource("Strict", "expected an object")),
            }
        }
    }

    #[test]
    fn list_payload_prefers_collection() {
        let out = present(Payload::from(json!([1, 2])), &Full).unwrap();
        assert_eq!(out["via"], "collection");
        assert_eq!(out["data"], json!([1, 2]));
    }

    #[test]
    fn single_payload_uses_make() {
        let out = present(Payload::from(json!({ "id": 1 })), &Full).unwrap();
        assert_eq!(out["via"], "make");
    }

    #[test]
    fn list_without_collection_falls_back_to_make() {
        let out = present(Payload::from(json!([1])), &MakeOnly).unwrap();
        assert_eq!(out["via"], "make");
    }

    #[test]
    fn neither_constructor_constructs_directly() {
        let out = present(Payload::from(json!({ "id": 3 })), &Strict).unwrap();
        assert_eq!(out["via"], "construct");
    }

    #[test]
    fn construction_failures_propagate() {
        let err = present(Payload::from(json!(5)), &Strict).unwrap_err();
        assert!(matches!(err, RepositoryError::Resource { .. }));
    }

    #[test]
    fn pages_are_list_shaped() {
        let page = Payload::Page(Page {
            items: vec![json!(1)],
            per_page: 10,
            total: 1,
            next_cursor: None,
        });
        assert!(page.is_list());
        assert_eq!(present(page, &Full).unwrap()["via"], "collection");
    }
}
