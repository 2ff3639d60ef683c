//! Repository definitions for the shop's entities.

pub mod order_repository;
pub mod user_repository;

pub use order_repository::OrderRepository;
pub use user_repository::UserRepository;
