use repository_facade::{Entity, RepositoryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A registered customer of the shop.
///
/// # Forwarded methods
/// - `display_name`: `"Name <email>"`
/// - `deactivate`: flips `active` off and returns the previous value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<u64>,
    pub name: String,
    pub email: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

impl User {
    /// Creates an unsaved user. The store assigns `id` on create.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            active: true,
        }
    }
}

impl Entity for User {
    fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value> {
        match method {
            "display_name" => Ok(Value::from(format!("{} <{}>", self.name, self.email))),
            "deactivate" => {
                let was_active = self.active;
                self.active = false;
                Ok(Value::from(was_active))
            }
            _ => Err(RepositoryError::UnknownMethod {
                method: method.to_string(),
            }),
        }
    }
}
