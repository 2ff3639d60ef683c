//! # Repository Recipe
//!
//! > **A recipe for caching repository facades in Rust.**
//!
//! This crate is a small shop built on [`repository_facade`]: users place orders, and the
//! user repository computes order statistics that are memoized per user until a write
//! invalidates them.
//!
//! ## 🏗️ Design Philosophy
//!
//! A facade wraps one entity (or a fetched collection of them) and answers three kinds of
//! questions:
//! - **Computed members** (`order_count`, `lifetime_value`): run once, then served from the
//!   cache until cleaned.
//! - **Attributes** (`name`, `email`): read from the live entity and cached on first access.
//! - **Methods** (`display_name`, `mark_paid`): forwarded to the entity, never cached.
//!
//! Presentation is opt-in: `facade.resource(&UserResource)` shapes exactly the next result.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Entities ([`model`])
//! Plain serde structs ([`User`](model::User), [`Order`](model::Order)) implementing
//! [`Entity`](repository_facade::Entity).
//!
//! ### 2. The Definitions ([`repositories`], [`formulas`])
//! Which members each repository computes and which named transforms it knows.
//!
//! ### 3. The Presentation ([`resources`])
//! A rich resource with collection and single-item constructors, and a plain one.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! [`Shop`](lifecycle::Shop) wires stores, the shared cache and the repository contexts.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with cache traces
//! RUST_LOG=debug cargo run
//!
//! # Run all tests
//! cargo test
//! ```

pub mod error;
pub mod formulas;
pub mod lifecycle;
pub mod model;
pub mod repositories;
pub mod resources;

pub use error::AppError;
