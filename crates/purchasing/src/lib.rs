//! `stockbook-purchasing` — supplier-side procurement orders.
//!
//! Mirrors the sales aggregate with delivery tracking: a purchase order
//! carries an expected delivery date, and entering `Completed` records the
//! received date through the status entry-effect table.

pub mod order;

pub use order::{
    PurchaseOrder, PurchaseOrderId, PurchaseOrderItem, PurchaseOrderItemId, PurchaseOrderStatus,
    StatusEffect,
};
