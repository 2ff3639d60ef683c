//! Error types for the shop application.

use repository_facade::RepositoryError;
use thiserror::Error;

use crate::model::OrderStatus;

/// Errors raised by the shop on top of the repository layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// A repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The requested order state change is not allowed.
    #[error("Cannot move order from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A formula or member was called without a required argument.
    #[error("{name} expects a {expected} argument")]
    MissingArgument {
        name: &'static str,
        expected: &'static str,
    },

    /// A money amount does not fit in `u64` cents.
    #[error("Amount overflows u64 cents")]
    AmountOverflow,

    /// No user with the given id exists.
    #[error("User not found: {0}")]
    UserNotFound(u64),
}
