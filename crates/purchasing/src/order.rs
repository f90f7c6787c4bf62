use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_catalog::{InventoryItem, InventoryItemId};
use stockbook_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Entity};
use stockbook_parties::PartyId;

/// Purchase order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderId(pub AggregateId);

impl PurchaseOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PurchaseOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Purchase order line identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderItemId(pub AggregateId);

impl PurchaseOrderItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PurchaseOrderItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseOrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl Default for PurchaseOrderStatus {
    fn default() -> Self {
        PurchaseOrderStatus::Pending
    }
}

impl PurchaseOrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "Pending",
            PurchaseOrderStatus::Completed => "Completed",
            PurchaseOrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Side effects declared per entered status.
    ///
    /// `Completed` is the one transition with a second effect: it stamps the
    /// received date. New statuses declare their effects here, not in
    /// scattered conditionals.
    pub fn entry_effects(self) -> &'static [StatusEffect] {
        match self {
            PurchaseOrderStatus::Pending => &[StatusEffect::NotifyStatusChange],
            PurchaseOrderStatus::Completed => &[
                StatusEffect::SetReceivedDate,
                StatusEffect::NotifyStatusChange,
            ],
            PurchaseOrderStatus::Cancelled => &[StatusEffect::NotifyStatusChange],
        }
    }
}

/// Declarative side effect of entering a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEffect {
    /// Stamp `received_date` with the transition time.
    SetReceivedDate,
    /// Fire the threshold-notifier status hook (caller supplies the target).
    NotifyStatusChange,
}

/// Purchase order line with prices snapshotted at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    pub id: PurchaseOrderItemId,
    pub inventory_item_id: InventoryItemId,
    pub quantity: i64,
    /// Costing price snapshot, smallest currency unit.
    pub unit_price: u64,
    /// Catalog/list price snapshot, smallest currency unit.
    pub list_price: u64,
    /// quantity * unit_price at the time the line was written.
    pub total_price: u64,
}

impl PurchaseOrderItem {
    /// Build a line by snapshotting the item's current prices.
    pub fn snapshot(
        id: PurchaseOrderItemId,
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

impl Entity for PurchaseOrderItem {
    type Id = PurchaseOrderItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: PurchaseOrder plus its owned line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub supplier_id: PartyId,
    pub order_date: DateTime<Utc>,
    pub status: PurchaseOrderStatus,
    /// Sum of line totals at build time.
    pub total_amount: u64,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    /// Set only when the order transitions to `Completed`.
    pub received_date: Option<DateTime<Utc>>,
    pub items: Vec<PurchaseOrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl PurchaseOrder {
    /// Assemble the aggregate: lines attached, total computed, nothing
    /// persisted yet.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        id: PurchaseOrderId,
        supplier_id: PartyId,
        order_date: DateTime<Utc>,
        status: Option<PurchaseOrderStatus>,
        expected_delivery_date: Option<DateTime<Utc>>,
        items: Vec<PurchaseOrderItem>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        for item in &items {
            item.check_invariants()?;
        }
        let total_amount = items.iter().map(|i| i.total_price).sum();
        Ok(Self {
            id,
            supplier_id,
            order_date,
            status: status.unwrap_or_default(),
            total_amount,
            expected_delivery_date,
            received_date: None,
            items,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Enter a new status, applying internal effects (received date), and
    /// surface the declared entry effects for the caller.
    pub fn transition_to(
        &mut self,
        status: PurchaseOrderStatus,
        now: DateTime<Utc>,
    ) -> &'static [StatusEffect] {
        self.status = status;
        let effects = status.entry_effects();
        for effect in effects {
            if let StatusEffect::SetReceivedDate = effect {
                self.received_date = Some(now);
            }
        }
        effects
    }

    /// Pending and past its expected delivery date (strictly before `now`).
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == PurchaseOrderStatus::Pending
            && self
                .expected_delivery_date
                .is_some_and(|expected| expected < now)
    }

    /// Recompute the total from the lines' current quantity * unit_price.
    pub fn recomputed_total(&self) -> u64 {
        self.items.iter().map(PurchaseOrderItem::subtotal).sum()
    }

    pub fn item(&self, item_id: PurchaseOrderItemId) -> Option<&PurchaseOrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: PurchaseOrderItemId) -> Option<&mut PurchaseOrderItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

impl AggregateRoot for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
