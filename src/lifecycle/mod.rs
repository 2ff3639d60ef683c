//! # Shop Lifecycle
//!
//! Repositories are plain definitions; wiring them to stores and a shared cache is what
//! turns them into a working system. This module owns that wiring.
//!
//! ## The Shop Pattern
//!
//! [`Shop`] builds every store and the [`CacheStore`](repository_facade::CacheStore) once and
//! hands both to a [`RepositoryContext`](repository_facade::RepositoryContext) per repository:
//!
//! ```rust,ignore
//! let order_store = Arc::new(MemoryStore::<Order>::new());
//! let cache = Arc::new(CacheStore::new());
//!
//! // UserRepository reads orders to compute its statistics
//! let users = RepositoryContext::new(
//!     UserRepository::new(Arc::clone(&order_store)),
//!     Arc::new(MemoryStore::new()),
//!     Arc::clone(&cache),
//!     config.clone(),
//! );
//! let orders = RepositoryContext::new(OrderRepository, order_store, cache, config);
//! ```
//!
//! Cross-repository dependencies are injected into the repository value itself. The context
//! clones it into every facade it creates.
//!
//! ## Cache Invalidation
//!
//! Writes that change what a computed member would return are followed by `clean` on the
//! affected facade ([`Shop::place_order`]) or by `re_cache` of the member
//! ([`Shop::pay_order`]).
//!
//! ## Observability
//!
//! [`setup_tracing`] installs the subscriber. See the [`tracing`] module for filters and
//! sample output.

pub mod shop;
pub mod tracing;

pub use self::shop::Shop;
pub use self::tracing::setup_tracing;
