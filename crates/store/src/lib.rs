//! `stockbook-store` — persistence seams and orchestrating services.
//!
//! Store traits keep the persistence technology swappable; the in-memory
//! implementations (`RwLock<HashMap>`) back tests and embedding callers.
//! Services compose stores into the core operations: stock adjustment,
//! ledger recording, and atomic order/purchase-order aggregate builds.

pub mod catalog_store;
pub mod ledger_store;
pub mod order_store;
pub mod party_store;
pub mod purchase_order_store;

pub mod ledger_service;
pub mod order_service;
pub mod purchase_order_service;
pub mod stock_adjuster;

mod integration_tests;

pub use catalog_store::{CatalogStore, InMemoryCatalogStore};
pub use ledger_service::LedgerService;
pub use ledger_store::{InMemoryLedgerStore, LedgerStore};
pub use order_service::{OrderLineRequest, OrderService};
pub use order_store::{InMemoryOrderStore, OrderStore};
pub use party_store::{InMemoryPartyStore, PartyStore};
pub use purchase_order_service::PurchaseOrderService;
pub use purchase_order_store::{InMemoryPurchaseOrderStore, PurchaseOrderStore};
pub use stock_adjuster::StockAdjuster;
