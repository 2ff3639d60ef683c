use repository_facade::{Attributes, CacheConfig, CacheScope, Filters, RepositoryError};
use repository_recipe::lifecycle::Shop;
use repository_recipe::model::OrderStatus;
use repository_recipe::repositories::user_repository::find_by_email;
use repository_recipe::resources::{ReceiptResource, UserResource};
use repository_recipe::AppError;
use serde_json::{json, Value};

fn id_of<R: repository_facade::Repository>(facade: &repository_facade::Facade<R>) -> u64 {
    facade
        .identity()
        .and_then(|id| id.parse().ok())
        .expect("facade should be bound to a saved entity")
}

/// Full end-to-end flow: register, order, pay, present.
#[test]
fn test_full_shop_flow() {
    let shop = Shop::new(CacheConfig::default());

    let mut alice = shop
        .register_user("Alice", "alice@example.com")
        .expect("Failed to register user");
    let alice_id = id_of(&alice);

    let mut order = shop
        .place_order(alice_id, 3, 500)
        .expect("Failed to place order");
    assert_eq!(order.cache("total_cents", &[]).unwrap(), Some(json!(1500)));
    assert_eq!(order.cache("is_paid", &[]).unwrap(), Some(json!(false)));

    assert_eq!(alice.cache("order_count", &[]).unwrap(), Some(json!(1)));
    assert_eq!(alice.cache("lifetime_value", &[]).unwrap(), Some(json!(0)));

    let lifetime = shop.pay_order(&mut order).expect("Failed to pay order");
    assert_eq!(lifetime, Some(json!(1500)));

    // The shared bucket was refreshed by pay_order
    assert_eq!(alice.cache("lifetime_value", &[]).unwrap(), Some(json!(1500)));
    assert_eq!(order.cache("is_paid", &[]).unwrap(), Some(json!(true)));

    let stored = shop.orders.store().find(id_of(&order)).unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);

    let profile = alice.resource(&UserResource).wrap().unwrap();
    assert_eq!(
        profile,
        json!({ "data": { "id": alice_id, "name": "Alice", "email": "alice@example.com" } })
    );
}

#[test]
fn test_new_orders_invalidate_user_statistics() {
    let shop = Shop::new(CacheConfig::default());
    let mut alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let alice_id = id_of(&alice);

    shop.place_order(alice_id, 1, 100).unwrap();
    assert_eq!(alice.cache("order_count", &[]).unwrap(), Some(json!(1)));

    shop.place_order(alice_id, 1, 100).unwrap();
    assert!(!alice.has_cache("order_count"));
    assert_eq!(alice.cache("order_count", &[]).unwrap(), Some(json!(2)));
}

#[test]
fn test_statistics_are_scoped_per_user() {
    let shop = Shop::new(CacheConfig::default());
    let mut alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let mut bob = shop.register_user("Bob", "bob@example.com").unwrap();
    shop.place_order(id_of(&alice), 1, 100).unwrap();

    assert_eq!(alice.cache("order_count", &[]).unwrap(), Some(json!(1)));
    assert_eq!(bob.cache("order_count", &[]).unwrap(), Some(json!(0)));

    // A second facade over Alice sees the same bucket
    let alice_again = shop.users.for_entity(alice.entity().unwrap().unwrap().clone());
    assert!(alice_again.has_cache("order_count"));
}

#[test]
fn test_class_scope_shares_one_bucket() {
    let config = CacheConfig::from_toml_str(r#"default_scope = "class""#).unwrap();
    let shop = Shop::new(config);
    let mut alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let mut bob = shop.register_user("Bob", "bob@example.com").unwrap();
    shop.place_order(id_of(&alice), 1, 100).unwrap();

    assert_eq!(alice.cache_scope(), CacheScope::Class);
    assert_eq!(alice.cache("order_count", &[]).unwrap(), Some(json!(1)));
    // Bob reads Alice's value: the bucket is per repository type
    assert_eq!(bob.cache("order_count", &[]).unwrap(), Some(json!(1)));
}

#[test]
fn test_order_members_stay_on_the_facade() {
    let shop = Shop::new(CacheConfig::from_toml_str(r#"default_scope = "class""#).unwrap());
    let alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let mut order = shop.place_order(id_of(&alice), 2, 300).unwrap();

    assert_eq!(order.cache_scope(), CacheScope::Local);
    order.cache("total_cents", &[]).unwrap();
    assert!(order.has_cache("total_cents"));

    let other = shop
        .orders
        .for_entity(shop.orders.store().find(id_of(&order)).unwrap());
    assert!(!other.has_cache("total_cents"));
}

#[test]
fn test_cancelled_orders_cannot_be_paid() {
    let shop = Shop::new(CacheConfig::default());
    let alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let mut order = shop.place_order(id_of(&alice), 1, 100).unwrap();

    let mut changes = Attributes::new();
    changes.insert("status".to_string(), json!("cancelled"));
    assert!(order.update(changes).unwrap());
    assert_eq!(order.is_success(), Some(true));

    match shop.pay_order(&mut order).unwrap_err() {
        AppError::Repository(RepositoryError::Entity(source)) => {
            assert!(source.to_string().contains("Cancelled"));
        }
        other => panic!("expected an entity error, got {other:?}"),
    }
}

#[test]
fn test_orders_for_unknown_users_are_rejected() {
    let shop = Shop::new(CacheConfig::default());
    let err = shop.place_order(99, 1, 100).unwrap_err();
    assert!(matches!(err, AppError::UserNotFound(99)));
    assert!(shop.orders.store().is_empty());
}

#[test]
fn test_attributes_members_and_forwarding() {
    let shop = Shop::new(CacheConfig::default());
    let mut alice = shop.register_user("Alice", "alice@example.com").unwrap();

    assert_eq!(alice.property("email").unwrap(), Some(json!("alice@example.com")));
    assert!(alice.has_cache("email"));
    assert_eq!(alice.property("nickname").unwrap(), None);

    assert_eq!(
        alice.cache("display_name", &[]).unwrap(),
        Some(json!("Alice <alice@example.com>"))
    );
    assert_eq!(
        alice.cache("greeting", &[Value::from("Hi")]).unwrap(),
        Some(json!("Hi, Alice!"))
    );

    let err = alice.forward("explode", &[]).unwrap_err();
    assert!(matches!(err, RepositoryError::UnknownMethod { .. }));
}

#[test]
fn test_formulas_narrow_fetched_users() {
    let shop = Shop::new(CacheConfig::default());
    shop.register_user("Alice", "alice@corp.example").unwrap();
    let mut bob = shop.register_user("Bob", "bob@corp.example").unwrap();
    shop.register_user("Carol", "carol@home.example").unwrap();

    let mut changes = Attributes::new();
    changes.insert("active".to_string(), Value::Bool(false));
    bob.update(changes).unwrap();

    let mut users = shop.users.facade();
    users.fetch(&Filters::new()).unwrap();
    let shown = users
        .formula("active", &[])
        .unwrap()
        .formula("email_domain", &[json!("corp.example")])
        .unwrap()
        .resource(&UserResource)
        .wrap()
        .unwrap();
    assert_eq!(shown["count"], 1);
    assert_eq!(shown["data"][0]["name"], "Alice");

    let err = users.formula("email_domain", &[]).unwrap_err();
    assert!(err.to_string().contains("expects a domain argument"));
    let err = users.formula("nonexistent", &[]).unwrap_err();
    assert!(matches!(err, RepositoryError::UnknownFormula(_)));
}

#[test]
fn test_paginated_users_carry_a_cursor() {
    let shop = Shop::new(CacheConfig::default());
    for name in ["A", "B", "C"] {
        shop.register_user(name, &format!("{name}@example.com")).unwrap();
    }

    let mut users = shop.users.facade();
    let shown = users
        .resource(&UserResource)
        .paginate(2, &Filters::new(), None)
        .unwrap();
    assert_eq!(shown["count"], 2);
    let cursor = shown["next_cursor"].as_str().unwrap().to_string();

    let rest = users
        .resource(&UserResource)
        .paginate(2, &Filters::new(), Some(&cursor))
        .unwrap();
    assert_eq!(rest["count"], 1);
    assert_eq!(rest["next_cursor"], Value::Null);
}

#[test]
fn test_lookup_by_email() {
    let shop = Shop::new(CacheConfig::default());
    shop.register_user("Alice", "alice@example.com").unwrap();

    let mut facade = shop.users.facade();
    let found = find_by_email(&mut facade, "alice@example.com").unwrap();
    assert_eq!(found.map(|u| u.name), Some("Alice".to_string()));
    assert!(facade.is_bound());

    assert!(find_by_email(&mut facade, "nobody@example.com").unwrap().is_none());
    assert!(!facade.is_bound());
}

#[test]
fn test_receipts_wrap_exactly_one_read() {
    let shop = Shop::new(CacheConfig::default());
    let alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let mut order = shop.place_order(id_of(&alice), 4, 250).unwrap();

    let wrapped = order.resource(&ReceiptResource).cache("total_cents", &[]).unwrap();
    assert_eq!(wrapped, Some(json!({ "receipt": 1000 })));
    assert_eq!(order.cache("total_cents", &[]).unwrap(), Some(json!(1000)));
}

#[test]
fn test_order_totals_report_overflow() {
    let shop = Shop::new(CacheConfig::default());
    let alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let mut order = shop.place_order(id_of(&alice), 2, u64::MAX / 2 + 1).unwrap();

    match order.cache("total_cents", &[]).unwrap_err() {
        RepositoryError::Entity(source) => {
            assert_eq!(source.to_string(), "Amount overflows u64 cents");
        }
        other => panic!("expected an entity error, got {other:?}"),
    }
    assert!(!order.has_cache("total_cents"));
}

#[test]
fn test_lifetime_value_reports_overflow() {
    let shop = Shop::new(CacheConfig::default());
    let alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let alice_id = id_of(&alice);
    let mut first = shop.place_order(alice_id, 1, u64::MAX / 2 + 1).unwrap();
    let mut second = shop.place_order(alice_id, 1, u64::MAX / 2 + 1).unwrap();

    assert_eq!(shop.pay_order(&mut first).unwrap(), Some(json!(u64::MAX / 2 + 1)));
    let err = shop.pay_order(&mut second).unwrap_err();
    assert!(err.to_string().contains("overflows"));
}

#[test]
fn test_facades_describe_themselves() {
    let shop = Shop::new(CacheConfig::default());
    let alice = shop.register_user("Alice", "alice@example.com").unwrap();
    let order = shop.place_order(id_of(&alice), 1, 100).unwrap();

    let described = format!("{order:?}");
    assert!(described.contains("OrderRepository"));
    assert!(described.contains("Local"));
    assert!(described.contains("bound: true"));
}
