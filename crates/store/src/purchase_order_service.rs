use std::sync::Arc;

use chrono::{DateTime, Utc};

use stockbook_catalog::InventoryItemId;
use stockbook_core::{AggregateId, DomainResult, ExpectedVersion, UserId};
use stockbook_notify::ThresholdNotifier;
use stockbook_parties::PartyId;
use stockbook_purchasing::{
    PurchaseOrder, PurchaseOrderId, PurchaseOrderItem, PurchaseOrderItemId, PurchaseOrderStatus,
    StatusEffect,
};

use crate::catalog_store::CatalogStore;
use crate::order_service::OrderLineRequest;
use crate::party_store::PartyStore;
use crate::purchase_order_store::PurchaseOrderStore;

/// Builds, queries, and reports on purchase order aggregates.
///
/// Mirrors the sales side, plus the procurement surfaces: pending and
/// overdue listings and per-item inbound quantity.
pub struct PurchaseOrderService<O, C, P> {
    orders: O,
    catalog: C,
    parties: P,
    notifier: Option<Arc<dyn ThresholdNotifier>>,
}

impl<O, C, P> PurchaseOrderService<O, C, P>
where
    O: PurchaseOrderStore,
    C: CatalogStore,
    P: PartyStore,
{
    pub fn new(orders: O, catalog: C, parties: P) -> Self {
        Self {
            orders,
            catalog,
            parties,
            notifier: None,
        }
    }

    pub fn with_notifier(
        orders: O,
        catalog: C,
        parties: P,
        notifier: Arc<dyn ThresholdNotifier>,
    ) -> Self {
        Self {
            orders,
            catalog,
            parties,
            notifier: Some(notifier),
        }
    }

    /// Create a purchase order with its line items as one unit. All lines
    /// snapshot current catalog prices; any missing supplier or item fails
    /// the whole call before anything is written.
    pub fn create_purchase_order(
        &self,
        supplier_id: PartyId,
        status: Option<PurchaseOrderStatus>,
        expected_delivery_date: Option<DateTime<Utc>>,
        lines: &[OrderLineRequest],
    ) -> DomainResult<PurchaseOrder> {
        let supplier = self.parties.get_supplier(supplier_id)?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = self.catalog.get(line.inventory_item_id)?;
            items.push(PurchaseOrderItem::snapshot(
                PurchaseOrderItemId::new(AggregateId::new()),
                &item,
                line.quantity,
            )?);
        }

        let now = Utc::now();
        let order = PurchaseOrder::build(
            PurchaseOrderId::new(AggregateId::new()),
            supplier.id,
            now,
            status,
            expected_delivery_date,
            items,
            now,
        )?;
        let order = self.orders.insert(order)?;
        tracing::debug!(
            order_id = %order.id,
            supplier_id = %supplier.id,
            total_amount = order.total_amount,
            lines = order.items.len(),
            "purchase order created"
        );
        Ok(order)
    }

    pub fn get(&self, id: PurchaseOrderId) -> DomainResult<PurchaseOrder> {
        self.orders.get(id)
    }

    pub fn list(&self) -> DomainResult<Vec<PurchaseOrder>> {
        self.orders.list()
    }

    pub fn find_by_supplier(&self, supplier_id: PartyId) -> DomainResult<Vec<PurchaseOrder>> {
        self.orders.find_by_supplier(supplier_id)
    }

    pub fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        self.orders.find_by_date_range(start, end)
    }

    pub fn find_by_status(
        &self,
        status: PurchaseOrderStatus,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        self.orders.find_by_status(status)
    }

    pub fn find_by_total_amount(
        &self,
        min: Option<u64>,
        max: Option<u64>,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        self.orders.find_by_total_amount(min, max)
    }

    /// Explicit status transition. Entering `Completed` stamps the received
    /// date with the transition time; the status hook fires only when a
    /// target user is supplied, and its failures are logged and swallowed.
    pub fn update_status(
        &self,
        id: PurchaseOrderId,
        status: PurchaseOrderStatus,
        notify_user: Option<UserId>,
    ) -> DomainResult<PurchaseOrder> {
        let mut order = self.orders.get(id)?;
        let expected = ExpectedVersion::Exact(order.version);
        let effects = order.transition_to(status, Utc::now());
        let order = self.orders.save(order, expected)?;

        for effect in effects {
            match effect {
                StatusEffect::SetReceivedDate => {}
                StatusEffect::NotifyStatusChange => {
                    if let (Some(notifier), Some(user)) = (&self.notifier, notify_user) {
                        if let Err(e) =
                            notifier.notify_order_status(user, order.id.0, status.label())
                        {
                            tracing::warn!(order_id = %order.id, error = %e, "status notification failed");
                        }
                    }
                }
            }
        }

        Ok(order)
    }

    /// Recompute the total from current lines (`quantity * unit_price`).
    pub fn calculate_total(&self, id: PurchaseOrderId) -> DomainResult<u64> {
        Ok(self.orders.get(id)?.recomputed_total())
    }

    /// All pending orders, oldest order date first.
    pub fn find_pending_orders(&self) -> DomainResult<Vec<PurchaseOrder>> {
        let mut orders = self.orders.find_by_status(PurchaseOrderStatus::Pending)?;
        orders.sort_by_key(|o| o.order_date);
        Ok(orders)
    }

    /// Pending orders whose expected delivery date is strictly before `now`,
    /// most overdue first. Orders without an expected date never qualify.
    pub fn find_overdue_orders(&self, now: DateTime<Utc>) -> DomainResult<Vec<PurchaseOrder>> {
        let mut orders = self.orders.find_by_status(PurchaseOrderStatus::Pending)?;
        orders.retain(|o| o.is_overdue(now));
        orders.sort_by_key(|o| o.expected_delivery_date);
        Ok(orders)
    }

    /// Pending lines referencing one inventory item, paired with their
    /// owning order.
    pub fn find_pending_items_by_inventory_item(
        &self,
        item_id: InventoryItemId,
    ) -> DomainResult<Vec<(PurchaseOrderId, PurchaseOrderItem)>> {
        let orders = self.orders.find_by_status(PurchaseOrderStatus::Pending)?;
        let mut lines = Vec::new();
        for order in orders {
            for line in &order.items {
                if line.inventory_item_id == item_id {
                    lines.push((order.id, line.clone()));
                }
            }
        }
        Ok(lines)
    }

    /// Total quantity of one item still inbound across all pending orders.
    /// 0 when nothing is on order.
    pub fn get_total_pending_quantity(&self, item_id: InventoryItemId) -> DomainResult<i64> {
        let lines = self.find_pending_items_by_inventory_item(item_id)?;
        Ok(lines.iter().map(|(_, line)| line.quantity).sum())
    }
}
