//! # Repository Recipe Demo
//!
//! Registers two users, places and pays orders, and shows the cache, formulas and resources
//! at work. Set `SHOP_CACHE_CONFIG` to a TOML file to change the default cache scope.

use repository_facade::{Attributes, CacheConfig, Filters, RepositoryError};
use repository_recipe::lifecycle::{setup_tracing, Shop};
use repository_recipe::resources::{ReceiptResource, UserResource};
use repository_recipe::AppError;
use serde_json::Value;
use tracing::{error, info, info_span};

fn load_config() -> Result<CacheConfig, AppError> {
    let Ok(path) = std::env::var("SHOP_CACHE_CONFIG") else {
        return Ok(CacheConfig::default());
    };
    let text = std::fs::read_to_string(&path)
        .map_err(|e| RepositoryError::Config(format!("{path}: {e}")))?;
    Ok(CacheConfig::from_toml_str(&text)?)
}

fn main() -> Result<(), AppError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let shop = Shop::new(load_config()?);
    info!("Starting shop demo");

    let mut alice = shop.register_user("Alice", "alice@example.com")?;
    let mut bob = shop.register_user("Bob", "bob@example.org")?;
    let mut changes = Attributes::new();
    changes.insert("active".to_string(), Value::Bool(false));
    bob.update(changes)?;

    let alice_id = alice
        .identity()
        .and_then(|id| id.parse::<u64>().ok())
        .unwrap_or_default();

    let span = info_span!("order_processing", user_id = alice_id);
    let entered = span.enter();

    let mut first = shop.place_order(alice_id, 2, 1250)?;
    shop.place_order(alice_id, 1, 4000)?;

    // Computed once, then served from the cache
    let count = alice.cache("order_count", &[])?;
    let count_again = alice.cache("order_count", &[])?;
    info!(?count, ?count_again, "Order count");

    match shop.pay_order(&mut first) {
        Ok(value) => info!(lifetime_value = ?value, "Order paid"),
        Err(e) => error!(error = %e, "Payment failed"),
    }

    let greeting = alice.cache("greeting", &[Value::from("Welcome back")])?;
    info!(?greeting, "Greeting");

    let profile = alice.resource(&UserResource).wrap()?;
    info!(%profile, "Profile");

    let receipt = first.resource(&ReceiptResource).cache("total_cents", &[])?;
    info!(?receipt, "Receipt");
    drop(entered);

    let mut everyone = shop.users.facade();
    everyone.fetch(&Filters::new())?;
    let active = everyone
        .formula("active", &[])?
        .resource(&UserResource)
        .wrap()?;
    info!(%active, "Active users");

    info!("Demo completed successfully");
    Ok(())
}
