//! # Observability & Tracing
//!
//! The [`setup_tracing`] function installs the global `tracing` subscriber for the shop.
//!
//! ## Configuration
//!
//! Output uses the compact format without the module prefix (`with_target(false)`); every
//! event from the repository layer carries a `repository` field instead, plus `member`,
//! `key` or `entity_type` where they apply.
//!
//! Levels come from `RUST_LOG`:
//!
//! ```bash
//! # Store writes and lifecycle events
//! RUST_LOG=info cargo run
//!
//! # Cache hits, misses and computations
//! RUST_LOG=debug cargo run
//!
//! # Only the facade crate
//! RUST_LOG=repository_facade=debug cargo run
//! ```
//!
//! A `debug` run of the demo shows the memoization at work:
//!
//! ```text
//! DEBUG Cache miss repository="UserRepository" member="order_count" key=UserRepository1
//! DEBUG Evicting before recompute repository="UserRepository" member="order_count"
//! ```
//!
//! Call [`setup_tracing`] once, at the start of `main`. Tests leave it out; installing a
//! second global subscriber panics.

/// Installs a compact, `RUST_LOG`-filtered subscriber.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
