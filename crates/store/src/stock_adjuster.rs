use std::sync::Arc;

use stockbook_catalog::{InventoryItem, InventoryItemId, StockDirection};
use stockbook_core::{DomainError, DomainResult, UserId};
use stockbook_notify::ThresholdNotifier;

use crate::catalog_store::CatalogStore;

/// Validates and applies stock movements against the catalog.
///
/// Adjustment does not append a ledger entry; callers wanting an auditable
/// record invoke the ledger service alongside this. The two remain
/// independently callable operations.
pub struct StockAdjuster<C> {
    catalog: C,
    notifier: Option<Arc<dyn ThresholdNotifier>>,
}

impl<C> StockAdjuster<C>
where
    C: CatalogStore,
{
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            notifier: None,
        }
    }

    pub fn with_notifier(catalog: C, notifier: Arc<dyn ThresholdNotifier>) -> Self {
        Self {
            catalog,
            notifier: Some(notifier),
        }
    }

    /// Apply one stock movement.
    ///
    /// `quantity` must be positive; a subtract larger than the current
    /// counter fails with `InsufficientStock` and writes nothing. When
    /// `alert_user` is supplied and the post-adjustment counter sits below
    /// the item's reorder level, the low-stock hook fires; hook failures are
    /// logged and swallowed.
    pub fn adjust(
        &self,
        item_id: InventoryItemId,
        quantity: i64,
        direction: StockDirection,
        alert_user: Option<UserId>,
    ) -> DomainResult<InventoryItem> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let item = self.catalog.adjust_stock(item_id, quantity, direction)?;
        tracing::debug!(
            item_id = %item.id,
            ?direction,
            quantity,
            current_stock = item.current_stock,
            "stock adjusted"
        );

        if item.is_below_reorder_level() {
            if let (Some(notifier), Some(user)) = (&self.notifier, alert_user) {
                if let Err(e) = notifier.notify_low_stock(
                    user,
                    &item.name,
                    item.current_stock,
                    item.reorder_level,
                ) {
                    tracing::warn!(item_id = %item.id, error = %e, "low stock notification failed");
                }
            }
        }

        Ok(item)
    }
}
