use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use stockbook_core::{DomainError, DomainResult, ExpectedVersion};
use stockbook_parties::PartyId;
use stockbook_purchasing::{PurchaseOrder, PurchaseOrderId, PurchaseOrderStatus};

use crate::order_store::total_amount_matches;

/// Persistence seam for purchase order aggregates.
pub trait PurchaseOrderStore: Send + Sync {
    fn insert(&self, order: PurchaseOrder) -> DomainResult<PurchaseOrder>;

    fn get(&self, id: PurchaseOrderId) -> DomainResult<PurchaseOrder>;

    fn save(&self, order: PurchaseOrder, expected: ExpectedVersion)
        -> DomainResult<PurchaseOrder>;

    fn list(&self) -> DomainResult<Vec<PurchaseOrder>>;

    fn find_by_supplier(&self, supplier_id: PartyId) -> DomainResult<Vec<PurchaseOrder>>;

    /// Orders whose `order_date` falls within `[start, end]`, inclusive.
    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<PurchaseOrder>>;

    fn find_by_status(&self, status: PurchaseOrderStatus) -> DomainResult<Vec<PurchaseOrder>>;

    fn find_by_total_amount(
        &self,
        min: Option<u64>,
        max: Option<u64>,
    ) -> DomainResult<Vec<PurchaseOrder>>;
}

impl<S> PurchaseOrderStore for Arc<S>
where
    S: PurchaseOrderStore + ?Sized,
{
    fn insert(&self, order: PurchaseOrder) -> DomainResult<PurchaseOrder> {
        (**self).insert(order)
    }

    fn get(&self, id: PurchaseOrderId) -> DomainResult<PurchaseOrder> {
        (**self).get(id)
    }

    fn save(
        &self,
        order: PurchaseOrder,
        expected: ExpectedVersion,
    ) -> DomainResult<PurchaseOrder> {
        (**self).save(order, expected)
    }

    fn list(&self) -> DomainResult<Vec<PurchaseOrder>> {
        (**self).list()
    }

    fn find_by_supplier(&self, supplier_id: PartyId) -> DomainResult<Vec<PurchaseOrder>> {
        (**self).find_by_supplier(supplier_id)
    }

    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        (**self).find_by_date_range(start, end)
    }

    fn find_by_status(&self, status: PurchaseOrderStatus) -> DomainResult<Vec<PurchaseOrder>> {
        (**self).find_by_status(status)
    }

    fn find_by_total_amount(
        &self,
        min: Option<u64>,
        max: Option<u64>,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        (**self).find_by_total_amount(min, max)
    }
}

fn purchase_order_not_found(id: PurchaseOrderId) -> DomainError {
    DomainError::not_found(format!("Purchase order {id} not found"))
}

/// In-memory purchase order store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPurchaseOrderStore {
    inner: RwLock<HashMap<PurchaseOrderId, PurchaseOrder>>,
}

impl InMemoryPurchaseOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(
        &self,
        predicate: impl Fn(&PurchaseOrder) -> bool,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("purchase order store lock poisoned"))?;
        let mut orders: Vec<_> = map.values().filter(|o| predicate(o)).cloned().collect();
        orders.sort_by_key(|o| o.id.0);
        Ok(orders)
    }
}

impl PurchaseOrderStore for InMemoryPurchaseOrderStore {
    fn insert(&self, order: PurchaseOrder) -> DomainResult<PurchaseOrder> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("purchase order store lock poisoned"))?;
        if map.contains_key(&order.id) {
            return Err(DomainError::conflict(format!(
                "purchase order {} already exists",
                order.id
            )));
        }
        map.insert(order.id, order.clone());
        Ok(order)
    }

    fn get(&self, id: PurchaseOrderId) -> DomainResult<PurchaseOrder> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("purchase order store lock poisoned"))?;
        map.get(&id)
            .cloned()
            .ok_or_else(|| purchase_order_not_found(id))
    }

    fn save(
        &self,
        order: PurchaseOrder,
        expected: ExpectedVersion,
    ) -> DomainResult<PurchaseOrder> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("purchase order store lock poisoned"))?;
        let stored = map
            .get_mut(&order.id)
            .ok_or_else(|| purchase_order_not_found(order.id))?;
        expected.check(stored.version)?;

        let mut next = order;
        next.version = stored.version + 1;
        next.updated_at = Utc::now();
        *stored = next.clone();
        Ok(next)
    }

    fn list(&self) -> DomainResult<Vec<PurchaseOrder>> {
        self.filtered(|_| true)
    }

    fn find_by_supplier(&self, supplier_id: PartyId) -> DomainResult<Vec<PurchaseOrder>> {
        self.filtered(|o| o.supplier_id == supplier_id)
    }

    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        self.filtered(|o| o.order_date >= start && o.order_date <= end)
    }

    fn find_by_status(&self, status: PurchaseOrderStatus) -> DomainResult<Vec<PurchaseOrder>> {
        self.filtered(|o| o.status == status)
    }

    fn find_by_total_amount(
        &self,
        min: Option<u64>,
        max: Option<u64>,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        self.filtered(|o| total_amount_matches(o.total_amount, min, max))
    }
}
