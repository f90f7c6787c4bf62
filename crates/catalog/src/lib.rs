//! `stockbook-catalog` — inventory items and their stock counter.
//!
//! The catalog owns the `current_stock` counter. All mutation goes through
//! the stock adjuster's serialized path; other components read projections
//! of the same counter via [`StockFilter`].

pub mod item;

pub use item::{InventoryItem, InventoryItemId, StockDirection, StockFilter};
