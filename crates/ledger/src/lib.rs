//! `stockbook-ledger` — append-only record of stock-affecting events.
//!
//! Entries are immutable once written; the running balance is a pure
//! function of an item's history and never consults the catalog counter.

pub mod transaction;

pub use transaction::{running_balance, InventoryTransaction, TransactionId, TransactionKind};
