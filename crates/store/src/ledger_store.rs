use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use stockbook_catalog::InventoryItemId;
use stockbook_core::{DomainError, DomainResult};
use stockbook_ledger::{InventoryTransaction, TransactionKind};

/// Append-only store for stock-affecting events.
///
/// Entries are never mutated or deleted; corrections are compensating
/// entries appended on top.
pub trait LedgerStore: Send + Sync {
    fn append(&self, tx: InventoryTransaction) -> DomainResult<InventoryTransaction>;

    /// All entries for one item, time-ascending.
    fn list_for_item(&self, item_id: InventoryItemId) -> DomainResult<Vec<InventoryTransaction>>;

    /// Entries recorded within `[start, end]`, inclusive, time-ascending.
    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryTransaction>>;

    fn find_by_kind(&self, kind: TransactionKind) -> DomainResult<Vec<InventoryTransaction>>;

    /// One item's entries within `[start, end]`, newest-first.
    fn history(
        &self,
        item_id: InventoryItemId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryTransaction>>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn append(&self, tx: InventoryTransaction) -> DomainResult<InventoryTransaction> {
        (**self).append(tx)
    }

    fn list_for_item(&self, item_id: InventoryItemId) -> DomainResult<Vec<InventoryTransaction>> {
        (**self).list_for_item(item_id)
    }

    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryTransaction>> {
        (**self).find_by_date_range(start, end)
    }

    fn find_by_kind(&self, kind: TransactionKind) -> DomainResult<Vec<InventoryTransaction>> {
        (**self).find_by_kind(kind)
    }

    fn history(
        &self,
        item_id: InventoryItemId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryTransaction>> {
        (**self).history(item_id, start, end)
    }
}

/// In-memory append-only ledger for tests/dev.
///
/// Entries keep insertion order; reads sort stably by `recorded_at`, so
/// same-timestamp entries stay in append order.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    entries: RwLock<Vec<InventoryTransaction>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, tx: InventoryTransaction) -> DomainResult<InventoryTransaction> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| DomainError::conflict("ledger store lock poisoned"))?;
        entries.push(tx.clone());
        Ok(tx)
    }

    fn list_for_item(&self, item_id: InventoryItemId) -> DomainResult<Vec<InventoryTransaction>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DomainError::conflict("ledger store lock poisoned"))?;
        let mut txs: Vec<_> = entries
            .iter()
            .filter(|tx| tx.item_id == item_id)
            .cloned()
            .collect();
        txs.sort_by_key(|tx| tx.recorded_at);
        Ok(txs)
    }

    fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryTransaction>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DomainError::conflict("ledger store lock poisoned"))?;
        let mut txs: Vec<_> = entries
            .iter()
            .filter(|tx| tx.recorded_at >= start && tx.recorded_at <= end)
            .cloned()
            .collect();
        txs.sort_by_key(|tx| tx.recorded_at);
        Ok(txs)
    }

    fn find_by_kind(&self, kind: TransactionKind) -> DomainResult<Vec<InventoryTransaction>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DomainError::conflict("ledger store lock poisoned"))?;
        let mut txs: Vec<_> = entries
            .iter()
            .filter(|tx| tx.kind == kind)
            .cloned()
            .collect();
        txs.sort_by_key(|tx| tx.recorded_at);
        Ok(txs)
    }

    fn history(
        &self,
        item_id: InventoryItemId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryTransaction>> {
        let mut txs = self.list_for_item(item_id)?;
        txs.retain(|tx| tx.recorded_at >= start && tx.recorded_at <= end);
        txs.reverse();
        Ok(txs)
    }
}
