use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use stockbook_catalog::{InventoryItem, InventoryItemId, StockDirection, StockFilter};
use stockbook_core::{DomainError, DomainResult, ExpectedVersion};
use stockbook_parties::PartyId;

/// Persistence seam for inventory items and their stock counter.
///
/// The counter is owned here: plain `save` never moves it. All stock
/// mutation goes through `adjust_stock` (one serialized compare-and-update
/// per item) or `replace_stock` (ledger reconciliation).
pub trait CatalogStore: Send + Sync {
    fn insert(&self, item: InventoryItem) -> DomainResult<InventoryItem>;

    fn get(&self, id: InventoryItemId) -> DomainResult<InventoryItem>;

    /// Persist catalog fields with an optimistic version check.
    ///
    /// The stored stock counter is preserved regardless of the counter on
    /// the passed item; direct field assignment cannot bypass the adjuster.
    fn save(&self, item: InventoryItem, expected: ExpectedVersion) -> DomainResult<InventoryItem>;

    fn list(&self, filter: StockFilter) -> DomainResult<Vec<InventoryItem>>;

    fn find_by_supplier(&self, supplier_id: PartyId) -> DomainResult<Vec<InventoryItem>>;

    /// Serialized read-modify-write on the stock counter.
    ///
    /// The precondition check and the update are one critical section; a
    /// subtract that would drive the counter negative fails with
    /// `InsufficientStock` and writes nothing.
    fn adjust_stock(
        &self,
        id: InventoryItemId,
        quantity: i64,
        direction: StockDirection,
    ) -> DomainResult<InventoryItem>;

    /// Overwrite the counter with a ledger-derived balance. Reconciliation
    /// only; not part of the normal adjustment path.
    fn replace_stock(&self, id: InventoryItemId, stock: i64) -> DomainResult<InventoryItem>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn insert(&self, item: InventoryItem) -> DomainResult<InventoryItem> {
        (**self).insert(item)
    }

    fn get(&self, id: InventoryItemId) -> DomainResult<InventoryItem> {
        (**self).get(id)
    }

    fn save(&self, item: InventoryItem, expected: ExpectedVersion) -> DomainResult<InventoryItem> {
        (**self).save(item, expected)
    }

    fn list(&self, filter: StockFilter) -> DomainResult<Vec<InventoryItem>> {
        (**self).list(filter)
    }

    fn find_by_supplier(&self, supplier_id: PartyId) -> DomainResult<Vec<InventoryItem>> {
        (**self).find_by_supplier(supplier_id)
    }

    fn adjust_stock(
        &self,
        id: InventoryItemId,
        quantity: i64,
        direction: StockDirection,
    ) -> DomainResult<InventoryItem> {
        (**self).adjust_stock(id, quantity, direction)
    }

    fn replace_stock(&self, id: InventoryItemId, stock: i64) -> DomainResult<InventoryItem> {
        (**self).replace_stock(id, stock)
    }
}

fn item_not_found(id: InventoryItemId) -> DomainError {
    DomainError::not_found(format!("Inventory item {id} not found"))
}

/// In-memory catalog store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<HashMap<InventoryItemId, InventoryItem>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn insert(&self, item: InventoryItem) -> DomainResult<InventoryItem> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("catalog store lock poisoned"))?;
        if map.contains_key(&item.id) {
            return Err(DomainError::conflict(format!(
                "inventory item {} already exists",
                item.id
            )));
        }
        map.insert(item.id, item.clone());
        Ok(item)
    }

    fn get(&self, id: InventoryItemId) -> DomainResult<InventoryItem> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("catalog store lock poisoned"))?;
        map.get(&id).cloned().ok_or_else(|| item_not_found(id))
    }

    fn save(&self, item: InventoryItem, expected: ExpectedVersion) -> DomainResult<InventoryItem> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("catalog store lock poisoned"))?;
        let stored = map.get_mut(&item.id).ok_or_else(|| item_not_found(item.id))?;
        expected.check(stored.version)?;

        let mut next = item;
        next.current_stock = stored.current_stock;
        next.version = stored.version + 1;
        next.updated_at = Utc::now();
        *stored = next.clone();
        Ok(next)
    }

    fn list(&self, filter: StockFilter) -> DomainResult<Vec<InventoryItem>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("catalog store lock poisoned"))?;
        let mut items: Vec<_> = map
            .values()
            .filter(|item| filter.matches(item.current_stock))
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id.0);
        Ok(items)
    }

    fn find_by_supplier(&self, supplier_id: PartyId) -> DomainResult<Vec<InventoryItem>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("catalog store lock poisoned"))?;
        let mut items: Vec<_> = map
            .values()
            .filter(|item| item.supplier_id == Some(supplier_id))
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id.0);
        Ok(items)
    }

    fn adjust_stock(
        &self,
        id: InventoryItemId,
        quantity: i64,
        direction: StockDirection,
    ) -> DomainResult<InventoryItem> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("catalog store lock poisoned"))?;
        let stored = map.get_mut(&id).ok_or_else(|| item_not_found(id))?;

        let new_stock = stored.apply_adjustment(direction, quantity)?;
        stored.current_stock = new_stock;
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn replace_stock(&self, id: InventoryItemId, stock: i64) -> DomainResult<InventoryItem> {
        if stock < 0 {
            return Err(DomainError::invariant(
                "stock counter cannot be set negative",
            ));
        }
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("catalog store lock poisoned"))?;
        let stored = map.get_mut(&id).ok_or_else(|| item_not_found(id))?;
        stored.current_stock = stock;
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}
