use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_catalog::{InventoryItem, InventoryItemId};
use stockbook_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Entity};
use stockbook_parties::PartyId;

/// Sales order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order line identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderItemId(pub AggregateId);

impl OrderItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl OrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Side effects declared per entered status.
    ///
    /// Transitions are driven off this table rather than inline conditionals
    /// so new statuses can declare their own effects in one place.
    pub fn entry_effects(self) -> &'static [StatusEffect] {
        match self {
            OrderStatus::Pending => &[StatusEffect::NotifyStatusChange],
            OrderStatus::Completed => &[StatusEffect::NotifyStatusChange],
            OrderStatus::Cancelled => &[StatusEffect::NotifyStatusChange],
        }
    }
}

/// Declarative side effect of entering a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEffect {
    /// Fire the threshold-notifier status hook (caller supplies the target).
    NotifyStatusChange,
}

/// Order line: inventory item reference, quantity, snapshotted prices.
///
/// `unit_price` and `list_price` are captured at creation time and must not
/// change when the catalog item's prices change later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub inventory_item_id: InventoryItemId,
    pub quantity: i64,
    /// Costing price snapshot, smallest currency unit.
    pub unit_price: u64,
    /// Catalog/list price snapshot, smallest currency unit.
    pub list_price: u64,
    /// quantity * unit_price at the time the line was written.
    pub total_price: u64,
}

impl OrderItem {
    /// Build a line by snapshotting the item's current prices.
    pub fn snapshot(
        id: OrderItemId,
        item: &InventoryItem,
        quantity: i64,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        Ok(Self {
            id,
            inventory_item_id: item.id,
            quantity,
            unit_price: item.unit_price,
            list_price: item.list_price,
            total_price: quantity as u64 * item.unit_price,
        })
    }

    /// Explicit quantity correction; recomputes this line's total only.
    /// The owning order's `total_amount` is NOT re-derived here — callers
    /// mutating lines independently must recompute it themselves.
    pub fn set_quantity(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        self.quantity = quantity;
        self.total_price = quantity as u64 * self.unit_price;
        Ok(())
    }

    pub fn subtotal(&self) -> u64 {
        self.quantity as u64 * self.unit_price
    }

    fn check_invariants(&self) -> DomainResult<()> {
        if self.total_price != self.quantity as u64 * self.unit_price {
            return Err(DomainError::invariant(
                "line total_price must equal quantity * unit_price",
            ));
        }
        Ok(())
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: Order plus its owned line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: PartyId,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    /// Sum of line totals at build time; later independent line edits do not
    /// re-derive this automatically.
    pub total_amount: u64,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl Order {
    /// Assemble the aggregate: lines are attached and the total is computed
    /// in one step, before anything is persisted.
    pub fn build(
        id: OrderId,
        customer_id: PartyId,
        order_date: DateTime<Utc>,
        status: Option<OrderStatus>,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        for item in &items {
            item.check_invariants()?;
        }
        let total_amount = items.iter().map(|i| i.total_price).sum();
        Ok(Self {
            id,
            customer_id,
            order_date,
            status: status.unwrap_or_default(),
            total_amount,
            items,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Enter a new status and surface the declared entry effects.
    pub fn transition_to(&mut self, status: OrderStatus) -> &'static [StatusEffect] {
        self.status = status;
        status.entry_effects()
    }

    /// Recompute the total from the lines' current quantity * unit_price.
    ///
    /// Deliberately ignores both the stored `total_amount` and the stored
    /// per-line `total_price`; if a line's snapshot has diverged this result
    /// diverges with it.
    pub fn recomputed_total(&self) -> u64 {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    pub fn item(&self, item_id: OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: OrderItemId) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
