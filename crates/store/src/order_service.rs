use std::sync::Arc;

use chrono::{DateTime, Utc};

use stockbook_catalog::InventoryItemId;
use stockbook_core::{AggregateId, DomainError, DomainResult, ExpectedVersion, UserId};
use stockbook_notify::ThresholdNotifier;
use stockbook_parties::PartyId;
use stockbook_sales::{Order, OrderId, OrderItem, OrderItemId, OrderStatus, StatusEffect};

use crate::catalog_store::CatalogStore;
use crate::order_store::OrderStore;
use crate::party_store::PartyStore;

/// One requested order line: which item, how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLineRequest {
    pub inventory_item_id: InventoryItemId,
    pub quantity: i64,
}

/// Builds and queries sales order aggregates.
///
/// `create_order` resolves and validates everything before the single store
/// write, so a failure on any line leaves no order or line behind.
pub struct OrderService<O, C, P> {
    orders: O,
    catalog: C,
    parties: P,
    notifier: Option<Arc<dyn ThresholdNotifier>>,
}

impl<O, C, P> OrderService<O, C, P>
where
    O: OrderStore,
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

    /// Create an order with its line items as one unit.
    ///
    /// Every line snapshots the item's current prices and computes
    /// `total_price = quantity * unit_price`; the order total is the sum of
    /// line totals. Missing customer or item fails the whole call with
    /// `NotFound` before anything is written.
    pub fn create_order(
        &self,
        customer_id: PartyId,
        status: Option<OrderStatus>,
        lines: &[OrderLineRequest],
    ) -> DomainResult<Order> {
        let customer = self.parties.get_customer(customer_id)?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = self.catalog.get(line.inventory_item_id)?;
            items.push(OrderItem::snapshot(
                OrderItemId::new(AggregateId::new()),
                &item,
                line.quantity,
            )?);
        }

        let now = Utc::now();
        let order = Order::build(
            OrderId::new(AggregateId::new()),
            customer.id,
            now,
            status,
            items,
            now,
        )?;
        let order = self.orders.insert(order)?;
        tracing::debug!(
            order_id = %order.id,
            customer_id = %customer.id,
            total_amount = order.total_amount,
            lines = order.items.len(),
            "order created"
        );
        Ok(order)
    }

    pub fn get(&self, id: OrderId) -> DomainResult<Order> {
        self.orders.get(id)
    }

    pub fn list(&self) -> DomainResult<Vec<Order>> {
        self.orders.list()
    }

    pub fn find_by_customer(&self, customer_id: PartyId) -> DomainResult<Vec<Order>> {
        self.orders.find_by_customer(customer_id)
    }

    pub fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Order>> {
        self.orders.find_by_date_range(start, end)
    }

    pub fn find_by_status(&self, status: OrderStatus) -> DomainResult<Vec<Order>> {
        self.orders.find_by_status(status)
    }

    pub fn find_by_total_amount(
        &self,
        min: Option<u64>,
        max: Option<u64>,
    ) -> DomainResult<Vec<Order>> {
        self.orders.find_by_total_amount(min, max)
    }

    /// Explicit status transition, driven by the status entry-effect table.
    /// The status hook fires only when a target user is supplied; its
    /// failures are logged and swallowed.
    pub fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        notify_user: Option<UserId>,
    ) -> DomainResult<Order> {
        let mut order = self.orders.get(id)?;
        let expected = ExpectedVersion::Exact(order.version);
        let effects = order.transition_to(status);
        let order = self.orders.save(order, expected)?;

        for effect in effects {
            match effect {
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

    /// Recompute the total from current lines (`quantity * unit_price`),
    /// not from the stored `total_amount`.
    pub fn calculate_order_total(&self, id: OrderId) -> DomainResult<u64> {
        Ok(self.orders.get(id)?.recomputed_total())
    }

    /// Explicit line quantity correction. Recomputes that line's total; the
    /// order's `total_amount` is left for the caller to re-derive.
    pub fn update_item_quantity(
        &self,
        order_id: OrderId,
        item_id: OrderItemId,
        quantity: i64,
    ) -> DomainResult<Order> {
        let mut order = self.orders.get(order_id)?;
        let expected = ExpectedVersion::Exact(order.version);
        let line = order
            .item_mut(item_id)
            .ok_or_else(|| DomainError::not_found(format!("Order item {item_id} not found")))?;
        line.set_quantity(quantity)?;
        self.orders.save(order, expected)
    }

    pub fn item_subtotal(&self, order_id: OrderId, item_id: OrderItemId) -> DomainResult<u64> {
        let order = self.orders.get(order_id)?;
        order
            .item(item_id)
            .map(OrderItem::subtotal)
            .ok_or_else(|| DomainError::not_found(format!("Order item {item_id} not found")))
    }
}
