use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{AggregateId, AggregateRoot, DomainError, DomainResult};
use stockbook_parties::PartyId;

/// Inventory item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(pub AggregateId);

impl InventoryItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InventoryItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Direction of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    Add,
    Subtract,
}

/// Read-only projections over the stock counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockFilter {
    All,
    /// Strictly below the threshold ("low stock").
    Below(i64),
    /// Strictly above the threshold ("overstock").
    Above(i64),
    /// Exactly zero.
    OutOfStock,
    /// Inclusive range.
    Range { min: i64, max: i64 },
}

impl StockFilter {
    pub fn matches(&self, stock: i64) -> bool {
        match *self {
            StockFilter::All => true,
            StockFilter::Below(threshold) => stock < threshold,
            StockFilter::Above(threshold) => stock > threshold,
            StockFilter::OutOfStock => stock == 0,
            StockFilter::Range { min, max } => stock >= min && stock <= max,
        }
    }
}

/// Aggregate root: InventoryItem.
///
/// `current_stock` is the single operational counter. The ledger keeps the
/// auditable history; `stockbook-store` exposes a reconciliation path that
/// rebuilds this counter from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub name: String,
    pub description: Option<String>,
    pub current_stock: i64,
    pub reorder_level: i64,
    pub reorder_quantity: i64,
    pub auto_reorder: bool,
    /// Catalog/list price in smallest currency unit (e.g., cents).
    pub list_price: u64,
    /// Price used for costing order lines, in smallest currency unit.
    pub unit_price: u64,
    /// Weak reference: lookup only, never cascaded.
    pub supplier_id: Option<PartyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl InventoryItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: InventoryItemId,
        name: impl Into<String>,
        description: Option<String>,
        current_stock: i64,
        reorder_level: i64,
        reorder_quantity: i64,
        auto_reorder: bool,
        list_price: u64,
        unit_price: u64,
        supplier_id: Option<PartyId>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if current_stock < 0 {
            return Err(DomainError::validation("current_stock cannot be negative"));
        }
        if reorder_level < 0 || reorder_quantity < 0 {
            return Err(DomainError::validation(
                "reorder_level and reorder_quantity cannot be negative",
            ));
        }
        Ok(Self {
            id,
            name,
            description,
            current_stock,
            reorder_level,
            reorder_quantity,
            auto_reorder,
            list_price,
            unit_price,
            supplier_id,
            created_at,
            updated_at: created_at,
            version: 0,
        })
    }

    /// Compute the post-adjustment counter without mutating.
    ///
    /// Subtracting more than `current_stock` fails; the counter can never go
    /// negative. Adds have no upper bound.
    pub fn apply_adjustment(&self, direction: StockDirection, quantity: i64) -> DomainResult<i64> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        match direction {
            StockDirection::Add => Ok(self.current_stock + quantity),
            StockDirection::Subtract => {
                if self.current_stock < quantity {
                    Err(DomainError::insufficient_stock(quantity, self.current_stock))
                } else {
                    Ok(self.current_stock - quantity)
                }
            }
        }
    }

    /// Strictly below the reorder threshold.
    pub fn is_below_reorder_level(&self) -> bool {
        self.current_stock < self.reorder_level
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.current_stock == 0
    }
}

impl AggregateRoot for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_item(stock: i64) -> InventoryItem {
        InventoryItem::new(
            InventoryItemId::new(AggregateId::new()),
            "Widget",
            None,
            stock,
            10,
            25,
            false,
            2500,
            2050,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn add_increases_stock() {
        let item = test_item(75);
        assert_eq!(item.apply_adjustment(StockDirection::Add, 25).unwrap(), 100);
    }

    #[test]
    fn subtract_beyond_stock_is_insufficient() {
        let item = test_item(100);
        let err = item
            .apply_adjustment(StockDirection::Subtract, 150)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 150,
                available: 100
            }
        );
    }

    #[test]
    fn subtract_exact_stock_reaches_zero() {
        let item = test_item(40);
        assert_eq!(
            item.apply_adjustment(StockDirection::Subtract, 40).unwrap(),
            0
        );
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let item = test_item(10);
        assert!(matches!(
            item.apply_adjustment(StockDirection::Add, 0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            item.apply_adjustment(StockDirection::Subtract, -3),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn reorder_threshold_is_strict() {
        let mut item = test_item(10);
        assert!(!item.is_below_reorder_level());
        item.current_stock = 9;
        assert!(item.is_below_reorder_level());
    }

    #[test]
    fn stock_filters() {
        assert!(StockFilter::Below(10).matches(9));
        assert!(!StockFilter::Below(10).matches(10));
        assert!(StockFilter::Above(10).matches(11));
        assert!(!StockFilter::Above(10).matches(10));
        assert!(StockFilter::OutOfStock.matches(0));
        assert!(!StockFilter::OutOfStock.matches(1));
        assert!(StockFilter::Range { min: 5, max: 10 }.matches(5));
        assert!(StockFilter::Range { min: 5, max: 10 }.matches(10));
        assert!(!StockFilter::Range { min: 5, max: 10 }.matches(11));
        assert!(StockFilter::All.matches(-1));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: subtract fails iff quantity exceeds stock; otherwise the
        /// counter changes by exactly the quantity and stays non-negative.
        #[test]
        fn subtract_is_exact_or_rejected(
            stock in 0i64..10_000,
            quantity in 1i64..10_000,
        ) {
            let item = test_item(stock);
            match item.apply_adjustment(StockDirection::Subtract, quantity) {
                Ok(new_stock) => {
                    prop_assert!(quantity <= stock);
                    prop_assert_eq!(new_stock, stock - quantity);
                    prop_assert!(new_stock >= 0);
                }
                Err(DomainError::InsufficientStock { requested, available }) => {
                    prop_assert!(quantity > stock);
                    prop_assert_eq!(requested, quantity);
                    prop_assert_eq!(available, stock);
                }
                Err(e) => prop_assert!(false, "unexpected error: {e:?}"),
            }
        }

        /// Property: add always succeeds and changes the counter by exactly
        /// the quantity.
        #[test]
        fn add_is_exact(
            stock in 0i64..10_000,
            quantity in 1i64..10_000,
        ) {
            let item = test_item(stock);
            prop_assert_eq!(
                item.apply_adjustment(StockDirection::Add, quantity).unwrap(),
                stock + quantity
            );
        }
    }
}
