use repository_facade::{Entity, RepositoryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Lifecycle state of an [`Order`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

/// An order placed by a [`User`](super::User). Amounts are in cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<u64>,
    pub user_id: u64,
    pub quantity: u32,
    pub unit_price_cents: u64,
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    /// Quantity times unit price. Fails with [`AppError::AmountOverflow`] past `u64::MAX`.
    pub fn total_cents(&self) -> Result<u64> {
        self.unit_price_cents
            .checked_mul(u64::from(self.quantity))
            .ok_or_else(|| RepositoryError::entity(AppError::AmountOverflow))
    }
}

impl Entity for Order {
    fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value> {
        match method {
            "mark_paid" => {
                if self.status == OrderStatus::Cancelled {
                    return Err(RepositoryError::entity(AppError::InvalidTransition {
                        from: self.status,
                        to: OrderStatus::Paid,
                    }));
                }
                self.status = OrderStatus::Paid;
                Ok(Value::from("paid"))
            }
            "total_cents" => Ok(Value::from(self.total_cents()?)),
            _ => Err(RepositoryError::UnknownMethod {
                method: method.to_string(),
            }),
        }
    }
}
