use repository_facade::{
    CacheScope, FormulaRegistry, Members, MemoryStore, Repository, Result, Subject,
};
use serde_json::Value;

use crate::model::{Order, OrderStatus};

/// Repository for [`Order`]s.
///
/// Orders change state often, so their computed members are kept on each facade instead of
/// being shared.
///
/// # Members
/// - `total_cents`: quantity times unit price
/// - `is_paid`: whether the order has been paid
#[derive(Clone, Default)]
pub struct OrderRepository;

impl Repository for OrderRepository {
    type Store = MemoryStore<Order>;

    fn cache_scope() -> Option<CacheScope> {
        Some(CacheScope::Local)
    }

    fn members(members: &mut Members<Self>) {
        members
            .register("total_cents", |facade, _args| {
                let total = match facade.entity()? {
                    Some(order) => order.total_cents()?,
                    None => 0,
                };
                Ok(Value::from(total))
            })
            .register("is_paid", |facade, _args| {
                let status = facade.entity()?.map(|order| order.status);
                Ok(Value::from(status == Some(OrderStatus::Paid)))
            });
    }

    fn formulas(formulas: &mut FormulaRegistry<Order>) {
        formulas.register("paid", |_args| Ok(Box::new(paid_only)));
    }
}

fn paid_only(subject: &Subject<Order>) -> Result<Option<Subject<Order>>> {
    let paid = subject
        .items()
        .iter()
        .filter(|order| order.status == OrderStatus::Paid)
        .cloned()
        .collect();
    Ok(Some(Subject::Collection(paid)))
}
