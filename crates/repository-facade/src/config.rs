//! # Cache Configuration
//!
//! The only tunable is the default [`CacheScope`] for repositories that do not pin their own.
//! It can be loaded from TOML:
//!
//! ```toml
//! default_scope = "class"
//! ```
//!
//! Missing keys fall back to the defaults (`identity`).

use serde::{Deserialize, Serialize};

use crate::cache::CacheScope;
use crate::error::{RepositoryError, Result};
use crate::repository::Repository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Scope used by repositories whose `cache_scope` returns `None`.
    pub default_scope: CacheScope,
}

impl CacheConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| RepositoryError::Config(e.to_string()))
    }

    /// The effective scope for repository type `R`.
    pub fn scope_for<R: Repository>(&self) -> CacheScope {
        R::cache_scope().unwrap_or(self.default_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_uses_identity_scope() {
        let config = CacheConfig::from_toml_str("").unwrap();
        assert_eq!(config.default_scope, CacheScope::Identity);
    }

    #[test]
    fn parses_snake_case_scopes() {
        let config = CacheConfig::from_toml_str(r#"default_scope = "local""#).unwrap();
        assert_eq!(config.default_scope, CacheScope::Local);
    }

    #[test]
    fn rejects_unknown_scopes() {
        let err = CacheConfig::from_toml_str(r#"default_scope = "global""#).unwrap_err();
        assert!(matches!(err, RepositoryError::Config(_)));
    }
}
