//! `stockbook-sales` — customer orders and their line items.
//!
//! An order is an aggregate: the order row plus its owned line items,
//! created and totaled as one unit. Line prices are snapshots taken at
//! creation time and do not follow later catalog changes.

pub mod order;

pub use order::{Order, OrderId, OrderItem, OrderItemId, OrderStatus, StatusEffect};
