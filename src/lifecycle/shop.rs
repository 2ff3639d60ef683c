use std::sync::Arc;

use repository_facade::{
    Attributes, CacheConfig, CacheStore, Facade, MemoryStore, Repository, RepositoryContext,
    RepositoryError,
};
use serde_json::Value;
use tracing::info;

use crate::error::AppError;
use crate::model::{Order, User};
use crate::repositories::{OrderRepository, UserRepository};

/// Wires the shop's stores, the shared cache and one context per repository.
///
/// # Architecture
///
/// - **User store / order store**: in-memory entity stores
/// - **Cache store**: shared by both contexts; user members are scoped per user, order
///   members stay on each facade
/// - **Contexts**: hand out facades with the member and formula tables built once
///
/// # Example
///
/// ```ignore
/// let shop = Shop::new(CacheConfig::default());
/// let mut alice = shop.register_user("Alice", "alice@example.com")?;
/// let alice_id = alice.identity().and_then(|id| id.parse().ok()).unwrap_or_default();
/// shop.place_order(alice_id, 2, 1250)?;
/// let count = alice.cache("order_count", &[])?;
/// ```
pub struct Shop {
    /// Facades over users
    pub users: RepositoryContext<UserRepository>,

    /// Facades over orders
    pub orders: RepositoryContext<OrderRepository>,
}

impl Shop {
    /// Builds empty stores and a fresh cache configured by `config`.
    pub fn new(config: CacheConfig) -> Self {
        let user_store = Arc::new(MemoryStore::<User>::new());
        let order_store = Arc::new(MemoryStore::<Order>::new());
        let cache = Arc::new(CacheStore::new());

        let users = RepositoryContext::new(
            UserRepository::new(Arc::clone(&order_store)),
            user_store,
            Arc::clone(&cache),
            config.clone(),
        );
        let orders = RepositoryContext::new(OrderRepository, order_store, cache, config);

        info!(default_scope = ?users.config().default_scope, "Shop ready");
        Self { users, orders }
    }

    /// Creates a user and returns a facade bound to it.
    pub fn register_user(&self, name: &str, email: &str) -> Result<Facade<UserRepository>, AppError> {
        let mut facade = self.users.facade();
        let user = facade.create(attributes(User::new(name, email))?)?;
        info!(entity_type = "User", id = ?user.id, "User registered");
        Ok(facade)
    }

    /// Places an order for an existing user and returns a facade bound to it.
    ///
    /// Cached order statistics of the user are dropped so the next read sees the new order.
    pub fn place_order(
        &self,
        user_id: u64,
        quantity: u32,
        unit_price_cents: u64,
    ) -> Result<Facade<OrderRepository>, AppError> {
        let mut user = self
            .users
            .store()
            .find(user_id)
            .map(|user| self.users.for_entity(user))
            .ok_or(AppError::UserNotFound(user_id))?;

        let mut facade = self.orders.facade();
        let order = facade.create(attributes(Order {
            id: None,
            user_id,
            quantity,
            unit_price_cents,
            ..Order::default()
        })?)?;
        info!(entity_type = "Order", id = ?order.id, user_id, "Order placed");

        user.clean();
        Ok(facade)
    }

    /// Marks an order as paid and returns the owner's refreshed lifetime value.
    pub fn pay_order(&self, order: &mut Facade<OrderRepository>) -> Result<Option<Value>, AppError> {
        let status = order.forward("mark_paid", &[])?;
        let mut changes = Attributes::new();
        changes.insert("status".to_string(), status);
        order.update(changes)?;
        order.clean();

        let user_id = order
            .entity()?
            .map(|paid| paid.user_id)
            .ok_or(RepositoryError::Unbound(OrderRepository::name()))?;
        let owner = self
            .users
            .store()
            .find(user_id)
            .ok_or(AppError::UserNotFound(user_id))?;
        info!(entity_type = "Order", id = ?order.identity(), user_id, "Order paid");
        Ok(self.users.for_entity(owner).re_cache("lifetime_value", &[])?)
    }
}

fn attributes<T: serde::Serialize>(value: T) -> Result<Attributes, AppError> {
    match serde_json::to_value(value).map_err(RepositoryError::from)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        _ => Ok(Attributes::new()),
    }
}
