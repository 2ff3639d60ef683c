//! Presentation shapes for shop entities.
//!
//! [`UserResource`] knows both collection and single-item construction;
//! [`ReceiptResource`] only wraps whatever it is given.

use repository_facade::{Payload, Resource, Result};
use serde_json::{json, Map, Value};

/// Public view of a user: id, name and email only.
pub struct UserResource;

impl UserResource {
    fn public_fields(value: Value) -> Value {
        let Value::Object(fields) = value else {
            return value;
        };
        let public: Map<String, Value> = fields
            .into_iter()
            .filter(|(name, _)| matches!(name.as_str(), "id" | "name" | "email"))
            .collect();
        Value::Object(public)
    }
}

impl Resource for UserResource {
    fn name(&self) -> &str {
        "UserResource"
    }

    fn has_collection(&self) -> bool {
        true
    }

    fn has_make(&self) -> bool {
        true
    }

    fn collection(&self, payload: Payload) -> Result<Value> {
        let next_cursor = match &payload {
            Payload::Page(page) => page.next_cursor.clone(),
            _ => None,
        };
        let data: Vec<Value> = match payload.into_value() {
            Value::Array(items) => items.into_iter().map(Self::public_fields).collect(),
            other => vec![Self::public_fields(other)],
        };
        Ok(json!({ "count": data.len(), "data": data, "next_cursor": next_cursor }))
    }

    fn make(&self, payload: Payload) -> Result<Value> {
        Ok(json!({ "data": Self::public_fields(payload.into_value()) }))
    }

    fn construct(&self, payload: Payload) -> Result<Value> {
        self.make(payload)
    }
}

/// Plain envelope used for order receipts and computed values.
pub struct ReceiptResource;

impl Resource for ReceiptResource {
    fn name(&self) -> &str {
        "ReceiptResource"
    }

    fn construct(&self, payload: Payload) -> Result<Value> {
        Ok(json!({ "receipt": payload.into_value() }))
    }
}
