use std::sync::Arc;

use repository_facade::{
    EntityStore, Facade, Filters, FormulaRegistry, Members, MemoryStore, Repository,
    RepositoryError, Result,
};
use serde_json::Value;

use crate::error::AppError;
use crate::formulas::{ActiveOnly, EmailDomain};
use crate::model::{Order, OrderStatus, User};

/// Repository for [`User`]s, with order statistics computed from the order store.
///
/// # Members
/// - `order_count`: number of orders placed by the bound user
/// - `lifetime_value`: sum of paid order totals, in cents
/// - `display_name`: forwarded to [`User`] and memoized
/// - `greeting`: `"<salutation>, <name>!"`, salutation taken from the first argument
///
/// # Formulas
/// - `active`: keeps only active users
/// - `email_domain`: keeps users whose email ends with `@<domain>`
#[derive(Clone)]
pub struct UserRepository {
    orders: Arc<MemoryStore<Order>>,
}

impl UserRepository {
    pub fn new(orders: Arc<MemoryStore<Order>>) -> Self {
        Self { orders }
    }

    fn orders_of(facade: &Facade<Self>) -> Result<Vec<Order>> {
        let Some(user_id) = facade.identity().and_then(|id| id.parse::<u64>().ok()) else {
            return Ok(Vec::new());
        };
        facade
            .repository()
            .orders
            .get(&Filters::new().eq("user_id", user_id))
    }
}

impl Repository for UserRepository {
    type Store = MemoryStore<User>;

    fn members(members: &mut Members<Self>) {
        members
            .register("order_count", |facade, _args| {
                Ok(Value::from(Self::orders_of(facade)?.len()))
            })
            .register("lifetime_value", |facade, _args| {
                let mut paid: u64 = 0;
                for order in Self::orders_of(facade)?
                    .iter()
                    .filter(|order| order.status == OrderStatus::Paid)
                {
                    paid = paid
                        .checked_add(order.total_cents()?)
                        .ok_or_else(|| RepositoryError::entity(AppError::AmountOverflow))?;
                }
                Ok(Value::from(paid))
            })
            .register("display_name", |facade, args| {
                facade.forward("display_name", args)
            })
            .register("greeting", |facade, args| {
                let salutation = args.first().and_then(Value::as_str).unwrap_or("Hello");
                let name = facade.property("name")?;
                let name = name.as_ref().and_then(Value::as_str).unwrap_or("stranger");
                Ok(Value::from(format!("{salutation}, {name}!")))
            });
    }

    fn formulas(formulas: &mut FormulaRegistry<User>) {
        formulas
            .register("active", |_args| Ok(Box::new(ActiveOnly)))
            .register("email_domain", |args| {
                let domain = args.first().and_then(Value::as_str).ok_or_else(|| {
                    RepositoryError::entity(AppError::MissingArgument {
                        name: "email_domain",
                        expected: "domain",
                    })
                })?;
                Ok(Box::new(EmailDomain::new(domain)))
            });
    }
}

/// Binds the first user with the given email, or `None` if nobody has it.
pub fn find_by_email(facade: &mut Facade<UserRepository>, email: &str) -> Result<Option<User>> {
    facade.first(&Filters::new().eq("email", email))
}

