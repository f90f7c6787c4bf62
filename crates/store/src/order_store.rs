use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use stockbook_core::{DomainError, DomainResult, ExpectedVersion};
use stockbook_parties::PartyId;
use stockbook_sales::{Order, OrderId, OrderStatus};

/// Persistence seam for sales order aggregates.
///
/// An order and its line items are one value: `insert` persists the whole
/// aggregate in a single write, which is what makes `create_order`
/// all-or-nothing.
pub trait OrderStore: Send + Sync {
    fn insert(&self, order: Order) -> DomainResult<Order>;

    fn get(&self, id: OrderId) -> DomainResult<Order>;

    fn save(&self, order: Order, expected: ExpectedVersion) -> DomainResult<Order>;

    fn list(&self) -> DomainResult<Vec<Order>>;

    fn find_by_customer(&self, customer_id: PartyId) -> DomainResult<Vec<Order>>;

    /// Orders whose `order_date` falls within `[start, end]`, inclusive.
    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Order>>;

    fn find_by_status(&self, status: OrderStatus) -> DomainResult<Vec<Order>>;

    /// Three-way branch on the bounds: both present is an inclusive range,
    /// only min is strictly greater, only max is strictly less, neither is
    /// unconstrained.
    fn find_by_total_amount(
        &self,
        min: Option<u64>,
        max: Option<u64>,
    ) -> DomainResult<Vec<Order>>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn insert(&self, order: Order) -> DomainResult<Order> {
        (**self).insert(order)
    }

    fn get(&self, id: OrderId) -> DomainResult<Order> {
        (**self).get(id)
    }

    fn save(&self, order: Order, expected: ExpectedVersion) -> DomainResult<Order> {
        (**self).save(order, expected)
    }

    fn list(&self) -> DomainResult<Vec<Order>> {
        (**self).list()
    }

    fn find_by_customer(&self, customer_id: PartyId) -> DomainResult<Vec<Order>> {
        (**self).find_by_customer(customer_id)
    }

    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Order>> {
        (**self).find_by_date_range(start, end)
    }

    fn find_by_status(&self, status: OrderStatus) -> DomainResult<Vec<Order>> {
        (**self).find_by_status(status)
    }

    fn find_by_total_amount(
        &self,
        min: Option<u64>,
        max: Option<u64>,
    ) -> DomainResult<Vec<Order>> {
        (**self).find_by_total_amount(min, max)
    }
}

fn order_not_found(id: OrderId) -> DomainError {
    DomainError::not_found(format!("Order {id} not found"))
}

pub(crate) fn total_amount_matches(total: u64, min: Option<u64>, max: Option<u64>) -> bool {
    match (min, max) {
        (Some(min), Some(max)) => total >= min && total <= max,
        (Some(min), None) => total > min,
        (None, Some(max)) => total < max,
        (None, None) => true,
    }
}

/// In-memory order store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(&self, predicate: impl Fn(&Order) -> bool) -> DomainResult<Vec<Order>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("order store lock poisoned"))?;
        let mut orders: Vec<_> = map.values().filter(|o| predicate(o)).cloned().collect();
        orders.sort_by_key(|o| o.id.0);
        Ok(orders)
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: Order) -> DomainResult<Order> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("order store lock poisoned"))?;
        if map.contains_key(&order.id) {
            return Err(DomainError::conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        map.insert(order.id, order.clone());
        Ok(order)
    }

    fn get(&self, id: OrderId) -> DomainResult<Order> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("order store lock poisoned"))?;
        map.get(&id).cloned().ok_or_else(|| order_not_found(id))
    }

    fn save(&self, order: Order, expected: ExpectedVersion) -> DomainResult<Order> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("order store lock poisoned"))?;
        let stored = map.get_mut(&order.id).ok_or_else(|| order_not_found(order.id))?;
        expected.check(stored.version)?;

        let mut next = order;
        next.version = stored.version + 1;
        next.updated_at = Utc::now();
        *stored = next.clone();
        Ok(next)
    }

    fn list(&self) -> DomainResult<Vec<Order>> {
        self.filtered(|_| true)
    }

    fn find_by_customer(&self, customer_id: PartyId) -> DomainResult<Vec<Order>> {
        self.filtered(|o| o.customer_id == customer_id)
    }

    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Order>> {
        self.filtered(|o| o.order_date >= start && o.order_date <= end)
    }

    fn find_by_status(&self, status: OrderStatus) -> DomainResult<Vec<Order>> {
        self.filtered(|o| o.status == status)
    }

    fn find_by_total_amount(
        &self,
        min: Option<u64>,
        max: Option<u64>,
    ) -> DomainResult<Vec<Order>> {
        self.filtered(|o| total_amount_matches(o.total_amount, min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stockbook_core::AggregateId;

    fn order_with_total(total: u64) -> Order {
        let mut order = Order::build(
            OrderId::new(AggregateId::new()),
            PartyId::new(AggregateId::new()),
            Utc::now(),
            None,
            vec![],
            Utc::now(),
        )
        .unwrap();
        order.total_amount = total;
        order
    }

    #[test]
    fn total_amount_three_way_branch() {
        // Both bounds: inclusive range.
        assert!(total_amount_matches(100, Some(100), Some(200)));
        assert!(total_amount_matches(200, Some(100), Some(200)));
        assert!(!total_amount_matches(99, Some(100), Some(200)));
        // Only min: strictly greater.
        assert!(total_amount_matches(101, Some(100), None));
        assert!(!total_amount_matches(100, Some(100), None));
        // Only max: strictly less.
        assert!(total_amount_matches(199, None, Some(200)));
        assert!(!total_amount_matches(200, None, Some(200)));
        // Neither: unconstrained.
        assert!(total_amount_matches(0, None, None));
    }

    #[test]
    fn find_by_total_amount_uses_branch() {
        let store = InMemoryOrderStore::new();
        store.insert(order_with_total(50)).unwrap();
        store.insert(order_with_total(100)).unwrap();
        store.insert(order_with_total(150)).unwrap();

        assert_eq!(
            store
                .find_by_total_amount(Some(50), Some(150))
                .unwrap()
                .len(),
            3
        );
        assert_eq!(store.find_by_total_amount(Some(100), None).unwrap().len(), 1);
        assert_eq!(store.find_by_total_amount(None, Some(100)).unwrap().len(), 1);
        assert_eq!(store.find_by_total_amount(None, None).unwrap().len(), 3);
    }

    #[test]
    fn save_bumps_version_with_check() {
        let store = InMemoryOrderStore::new();
        let order = store.insert(order_with_total(10)).unwrap();

        let saved = store
            .save(order.clone(), ExpectedVersion::Exact(0))
            .unwrap();
        assert_eq!(saved.version, 1);

        let err = store.save(order, ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: anything the inclusive range admits strictly inside its
        /// bounds, the strict one-sided filters admit too; no bounds admits
        /// everything.
        #[test]
        fn bounded_match_implies_one_sided_matches(
            total in 0u64..10_000,
            min in 0u64..10_000,
            max in 0u64..10_000,
        ) {
            if total_amount_matches(total, Some(min), Some(max)) && total != min && total != max {
                prop_assert!(total_amount_matches(total, Some(min), None));
                prop_assert!(total_amount_matches(total, None, Some(max)));
            }
            prop_assert!(total_amount_matches(total, None, None));
        }
    }

    #[test]
    fn get_missing_order_names_it() {
        let store = InMemoryOrderStore::new();
        let id = OrderId::new(AggregateId::new());
        let err = store.get(id).unwrap_err();
        assert_eq!(err, DomainError::NotFound(format!("Order {id} not found")));
    }
}
