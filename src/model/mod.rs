//! Domain entities managed by the shop repositories.

pub mod order;
pub mod user;

pub use order::{Order, OrderStatus};
pub use user::User;
