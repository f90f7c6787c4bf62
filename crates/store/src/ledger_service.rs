use chrono::{DateTime, Utc};

use stockbook_catalog::{InventoryItem, InventoryItemId};
use stockbook_core::{AggregateId, DomainError, DomainResult, UserId};
use stockbook_ledger::{running_balance, InventoryTransaction, TransactionId, TransactionKind};

use crate::catalog_store::CatalogStore;
use crate::ledger_store::LedgerStore;

/// Appends stock-affecting events and answers point-in-time queries over
/// the transaction history.
///
/// The running balance is a pure function of the ledger and never reads the
/// catalog counter; `rebuild_stock` is the one reconciliation path between
/// the two.
pub struct LedgerService<L, C> {
    ledger: L,
    catalog: C,
}

impl<L, C> LedgerService<L, C>
where
    L: LedgerStore,
    C: CatalogStore,
{
    pub fn new(ledger: L, catalog: C) -> Self {
        Self { ledger, catalog }
    }

    /// Append one entry. The referenced item must exist and the quantity
    /// must be positive; entries are immutable once written.
    pub fn record(
        &self,
        item_id: InventoryItemId,
        quantity: i64,
        kind: TransactionKind,
        note: Option<String>,
        user_id: Option<UserId>,
    ) -> DomainResult<InventoryTransaction> {
        self.catalog.get(item_id)?;
        let tx = InventoryTransaction::new(
            TransactionId::new(AggregateId::new()),
            item_id,
            quantity,
            kind,
            note,
            user_id,
            Utc::now(),
        )?;
        let tx = self.ledger.append(tx)?;
        tracing::debug!(item_id = %item_id, ?kind, quantity, "ledger entry appended");
        Ok(tx)
    }

    /// Net stock for an item: fold the full history, `IN` adds, `OUT`
    /// subtracts, unrecognized kinds contribute zero. 0 with no history.
    pub fn running_balance(&self, item_id: InventoryItemId) -> DomainResult<i64> {
        let txs = self.ledger.list_for_item(item_id)?;
        Ok(running_balance(&txs))
    }

    /// All entries for an item, time-ascending.
    pub fn list_for_item(
        &self,
        item_id: InventoryItemId,
    ) -> DomainResult<Vec<InventoryTransaction>> {
        self.ledger.list_for_item(item_id)
    }

    pub fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryTransaction>> {
        self.ledger.find_by_date_range(start, end)
    }

    pub fn find_by_kind(&self, kind: TransactionKind) -> DomainResult<Vec<InventoryTransaction>> {
        self.ledger.find_by_kind(kind)
    }

    /// One item's entries within a window, newest-first.
    pub fn transaction_history(
        &self,
        item_id: InventoryItemId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryTransaction>> {
        self.ledger.history(item_id, start, end)
    }

    /// Reconciliation: replay the item's ledger and overwrite the cached
    /// catalog counter with the running balance.
    pub fn rebuild_stock(&self, item_id: InventoryItemId) -> DomainResult<InventoryItem> {
        let balance = self.running_balance(item_id)?;
        if balance < 0 {
            return Err(DomainError::invariant(format!(
                "ledger balance for item {item_id} is negative ({balance})"
            )));
        }
        let item = self.catalog.replace_stock(item_id, balance)?;
        tracing::debug!(item_id = %item_id, balance, "stock counter rebuilt from ledger");
        Ok(item)
    }
}
