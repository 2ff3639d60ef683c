//! # Repository Trait
//!
//! A `Repository` is the user-defined half of a facade: it names the entity store it works
//! against, declares which members it can compute, which formulas it knows, and how its
//! cache is scoped. The [`Facade`](crate::Facade) supplies everything else.
//!
//! ```rust
//! use repository_facade::{Entity, Facade, MemoryStore, Members, Repository, CacheStore};
//! use serde::{Deserialize, Serialize};
//! use serde_json::Value;
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default, Serialize, Deserialize)]
//! struct Invoice { id: Option<u64>, amount: u64 }
//! impl Entity for Invoice {}
//!
//! struct Invoices;
//!
//! impl Repository for Invoices {
//!     type Store = MemoryStore<Invoice>;
//!
//!     fn members(members: &mut Members<Self>) {
//!         members.register("doubled", |facade, _args| {
//!             let amount = facade.property("amount")?.unwrap_or(Value::from(0));
//!             Ok(Value::from(amount.as_u64().unwrap_or(0) * 2))
//!         });
//!     }
//! }
//!
//! let mut facade = Facade::new(Invoices, Arc::new(MemoryStore::new()), Arc::new(CacheStore::new()))
//!     .with_entity(Invoice { id: Some(1), amount: 21 });
//! assert_eq!(facade.cache("doubled", &[]).unwrap(), Some(Value::from(42)));
//! ```

use crate::cache::CacheScope;
use crate::formula::FormulaRegistry;
use crate::members::Members;
use crate::store::EntityStore;

/// Shorthand for the entity type a repository wraps.
pub type EntityOf<R> = <<R as Repository>::Store as EntityStore>::Entity;

/// Trait implemented by every concrete repository type.
pub trait Repository: Sized + Send + Sync + 'static {
    /// The persistence backend this repository reads from and writes to.
    type Store: EntityStore;

    /// Identifier used as the repository part of cache keys.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Repository")
    }

    /// Pins the cache scope for this repository type. `None` defers to the configured default.
    fn cache_scope() -> Option<CacheScope> {
        None
    }

    /// Declares the members this repository can compute.
    fn members(members: &mut Members<Self>);

    /// Declares the formulas this repository can apply by name.
    fn formulas(_formulas: &mut FormulaRegistry<EntityOf<Self>>) {}
}

