//! # Repository Facade
//!
//! This crate provides a caching, dispatching facade that sits between application code and
//! an entity store. A facade wraps one entity (or a fetched collection or page of them),
//! memoizes the members its repository type knows how to compute, passes everything else
//! through to the wrapped entity, and can present results through a resource type on demand.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into four layers:
//!
//! 1. **Entity Layer** ([`Entity`], [`EntityStore`]) - your domain objects and how they persist
//! 2. **Definition Layer** ([`Repository`]) - which members a repository computes, which formulas it knows
//! 3. **Runtime Layer** ([`Facade`], [`CacheStore`]) - memoization, dispatch and subject management
//! 4. **Presentation Layer** ([`Resource`]) - turning raw results into their outward shape
//!
//! You write the computation for a member **once** in the repository's registration table;
//! the facade decides when it runs, where its value lives, and who else sees it.
//!
//! ## Core Abstractions
//!
//! ### Computed members and the cache
//!
//! ```rust
//! use repository_facade::{CacheStore, Entity, Facade, Members, MemoryStore, Repository};
//! use serde::{Deserialize, Serialize};
//! use serde_json::Value;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default, Serialize, Deserialize)]
//! struct Account { id: Option<u64>, balance: i64 }
//! impl Entity for Account {}
//!
//! #[derive(Clone, Default)]
//! struct Accounts { audits: Arc<AtomicUsize> }
//!
//! impl Repository for Accounts {
//!     type Store = MemoryStore<Account>;
//!
//!     fn members(members: &mut Members<Self>) {
//!         members.register("audit", |facade, _args| {
//!             facade.repository().audits.fetch_add(1, Ordering::SeqCst);
//!             Ok(Value::from("clean"))
//!         });
//!     }
//! }
//!
//! let repo = Accounts::default();
//! let audits = Arc::clone(&repo.audits);
//! let mut facade = Facade::new(repo, Arc::new(MemoryStore::new()), Arc::new(CacheStore::new()))
//!     .with_entity(Account { id: Some(42), balance: 10 });
//!
//! facade.cache("audit", &[]).unwrap();
//! facade.cache("audit", &[]).unwrap();
//! assert_eq!(audits.load(Ordering::SeqCst), 1); // computed once
//!
//! facade.re_cache("audit", &[]).unwrap();
//! assert_eq!(audits.load(Ordering::SeqCst), 2); // forced refresh
//!
//! // Unknown members are not errors.
//! assert_eq!(facade.cache("nope", &[]).unwrap(), None);
//! ```
//!
//! ### Cache scopes
//!
//! Every repository type caches under a [`CacheScope`]:
//!
//! - **Identity** (default): repository name + entity identity. Two facades over different
//!   entities never see each other's values; two facades over the same entity share them.
//! - **Class**: repository name only, shared by every facade of the type.
//! - **Local**: values stay on the facade instance.
//!
//! ### Resources
//!
//! `facade.resource(&r)` arms a one-shot [`Wrapped`] builder. The next operation on it
//! presents its result through `r`; the builder is consumed, so later calls are raw again.
//! See [`presenter`] for the collection/single/direct construction order.
//!
//! ## Concurrency Model
//!
//! All operations are synchronous. The shared [`CacheStore`] is sharded and guards every
//! `(key, member)` slot with its own mutex, so concurrent facades racing on the same member
//! run the computation once. Facade instances themselves are owned by one caller at a time.
//!
//! ## Observability
//!
//! Everything logs through `tracing` with the repository name attached as `repository`.
//! Installing a subscriber is left to the application.

pub mod cache;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod facade;
pub mod formula;
pub mod handle;
mod lock;
pub mod members;
pub mod memory;
pub mod presenter;
pub mod repository;
pub mod store;

// Re-export core types for convenience
pub use cache::{CacheKey, CacheScope, CacheStore, LocalCache};
pub use config::CacheConfig;
pub use context::RepositoryContext;
pub use entity::{Entity, Subject};
pub use error::{RepositoryError, Result};
pub use facade::{Facade, Wrapped};
pub use formula::{Formula, FormulaRegistry};
pub use handle::EntityHandle;
pub use members::Members;
pub use memory::MemoryStore;
pub use presenter::{present, Payload, Resource};
pub use repository::{EntityOf, Repository};
pub use store::{Attributes, EntityStore, Filters, Page};
