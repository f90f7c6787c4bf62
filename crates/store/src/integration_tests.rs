//! Integration tests for the full stock-consistency pipeline.
//!
//! Tests: Service → Store → Aggregate, across catalog, ledger, sales, and
//! purchasing.
//!
//! Verifies:
//! - Stock never goes negative, including under concurrent subtracts
//! - The ledger balance fold and the catalog counter reconcile
//! - Order totals are immune to later catalog price changes
//! - Aggregate creation is all-or-nothing

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::{Duration, Utc};

    use stockbook_catalog::{InventoryItem, InventoryItemId, StockDirection};
    use stockbook_core::{AggregateId, DomainError, ExpectedVersion, UserId};
    use stockbook_ledger::TransactionKind;
    use stockbook_parties::{ContactInfo, Party, PartyId, PartyKind};
    use stockbook_purchasing::PurchaseOrderStatus;

    use crate::catalog_store::{CatalogStore, InMemoryCatalogStore};
    use crate::ledger_service::LedgerService;
    use crate::ledger_store::InMemoryLedgerStore;
    use crate::order_service::{OrderLineRequest, OrderService};
    use crate::order_store::{InMemoryOrderStore, OrderStore};
    use crate::party_store::{InMemoryPartyStore, PartyStore};
    use crate::purchase_order_service::PurchaseOrderService;
    use crate::purchase_order_store::InMemoryPurchaseOrderStore;
    use crate::stock_adjuster::StockAdjuster;

    struct World {
        catalog: Arc<InMemoryCatalogStore>,
        parties: Arc<InMemoryPartyStore>,
        adjuster: StockAdjuster<Arc<InMemoryCatalogStore>>,
        ledger: LedgerService<Arc<InMemoryLedgerStore>, Arc<InMemoryCatalogStore>>,
        orders: OrderService<
            Arc<InMemoryOrderStore>,
            Arc<InMemoryCatalogStore>,
            Arc<InMemoryPartyStore>,
        >,
        order_store: Arc<InMemoryOrderStore>,
        purchasing: PurchaseOrderService<
            Arc<InMemoryPurchaseOrderStore>,
            Arc<InMemoryCatalogStore>,
            Arc<InMemoryPartyStore>,
        >,
    }

    fn world() -> World {
        stockbook_observability::init();

        let catalog = Arc::new(InMemoryCatalogStore::new());
        let parties = Arc::new(InMemoryPartyStore::new());
        let order_store = Arc::new(InMemoryOrderStore::new());
        let po_store = Arc::new(InMemoryPurchaseOrderStore::new());
        let ledger_store = Arc::new(InMemoryLedgerStore::new());

        World {
            adjuster: StockAdjuster::new(catalog.clone()),
            ledger: LedgerService::new(ledger_store, catalog.clone()),
            orders: OrderService::new(order_store.clone(), catalog.clone(), parties.clone()),
            order_store,
            purchasing: PurchaseOrderService::new(po_store, catalog.clone(), parties.clone()),
            catalog,
            parties,
        }
    }

    fn seed_item(world: &World, stock: i64, unit_price: u64) -> InventoryItemId {
        let item = InventoryItem::new(
            InventoryItemId::new(AggregateId::new()),
            "Widget",
            None,
            stock,
            10,
            25,
            false,
            unit_price + 450,
            unit_price,
            None,
            Utc::now(),
        )
        .unwrap();
        world.catalog.insert(item).unwrap().id
    }

    fn seed_party(world: &World, kind: PartyKind) -> PartyId {
        world
            .parties
            .insert(
                Party::new(
                    PartyId::new(AggregateId::new()),
                    kind,
                    "Test Party",
                    ContactInfo::default(),
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap()
            .id
    }

    #[test]
    fn oversubtract_is_rejected_and_counter_holds() {
        let w = world();
        let item = seed_item(&w, 75, 2050);

        let after = w
            .adjuster
            .adjust(item, 25, StockDirection::Add, None)
            .unwrap();
        assert_eq!(after.current_stock, 100);

        let err = w
            .adjuster
            .adjust(item, 150, StockDirection::Subtract, None)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 150,
                available: 100
            }
        );
        assert_eq!(w.catalog.get(item).unwrap().current_stock, 100);
    }

    #[test]
    fn ledger_balance_folds_and_reconciles_counter() {
        let w = world();
        let item = seed_item(&w, 0, 2050);

        w.ledger
            .record(item, 10, TransactionKind::In, None, None)
            .unwrap();
        w.ledger
            .record(item, 3, TransactionKind::Out, None, None)
            .unwrap();
        w.ledger
            .record(item, 5, TransactionKind::In, None, None)
            .unwrap();

        assert_eq!(w.ledger.running_balance(item).unwrap(), 12);

        // Counter drifted: the ledger was written without the adjuster.
        assert_eq!(w.catalog.get(item).unwrap().current_stock, 0);
        let rebuilt = w.ledger.rebuild_stock(item).unwrap();
        assert_eq!(rebuilt.current_stock, 12);
    }

    #[test]
    fn order_totals_survive_catalog_repricing() {
        let w = world();
        let item = seed_item(&w, 100, 2050);
        let customer = seed_party(&w, PartyKind::Customer);

        let order = w
            .orders
            .create_order(
                customer,
                None,
                &[OrderLineRequest {
                    inventory_item_id: item,
                    quantity: 2,
                }],
            )
            .unwrap();
        assert_eq!(order.total_amount, 4100);

        let mut repriced = w.catalog.get(item).unwrap();
        repriced.unit_price = 3000;
        let version = repriced.version;
        w.catalog
            .save(repriced, ExpectedVersion::Exact(version))
            .unwrap();

        let reread = w.orders.get(order.id).unwrap();
        assert_eq!(reread.items[0].unit_price, 2050);
        assert_eq!(reread.total_amount, 4100);
        assert_eq!(w.orders.calculate_order_total(order.id).unwrap(), 4100);
    }

    #[test]
    fn order_creation_is_all_or_nothing() {
        let w = world();
        let item = seed_item(&w, 100, 500);
        let customer = seed_party(&w, PartyKind::Customer);
        let missing = InventoryItemId::new(AggregateId::new());

        let err = w
            .orders
            .create_order(
                customer,
                None,
                &[
                    OrderLineRequest {
                        inventory_item_id: item,
                        quantity: 1,
                    },
                    OrderLineRequest {
                        inventory_item_id: missing,
                        quantity: 2,
                    },
                ],
            )
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::NotFound(format!("Inventory item {missing} not found"))
        );
        assert!(w.order_store.list().unwrap().is_empty());
    }

    #[test]
    fn pending_inbound_quantity_tracks_purchase_lifecycle() {
        let w = world();
        let item = seed_item(&w, 0, 750);
        let supplier = seed_party(&w, PartyKind::Supplier);

        let first = w
            .purchasing
            .create_purchase_order(
                supplier,
                None,
                Some(Utc::now() + Duration::days(7)),
                &[OrderLineRequest {
                    inventory_item_id: item,
                    quantity: 10,
                }],
            )
            .unwrap();
        w.purchasing
            .create_purchase_order(
                supplier,
                None,
                None,
                &[OrderLineRequest {
                    inventory_item_id: item,
                    quantity: 5,
                }],
            )
            .unwrap();

        assert_eq!(w.purchasing.get_total_pending_quantity(item).unwrap(), 15);

        let received = w
            .purchasing
            .update_status(first.id, PurchaseOrderStatus::Completed, None)
            .unwrap();
        assert!(received.received_date.is_some());
        assert_eq!(w.purchasing.get_total_pending_quantity(item).unwrap(), 5);
    }

    #[test]
    fn concurrent_subtracts_never_go_negative() {
        let w = world();
        let item = seed_item(&w, 10, 100);
        let catalog = w.catalog.clone();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let catalog = catalog.clone();
                thread::spawn(move || {
                    let adjuster = StockAdjuster::new(catalog);
                    adjuster.adjust(item, 1, StockDirection::Subtract, None)
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 10);
        assert_eq!(w.catalog.get(item).unwrap().current_stock, 0);
    }

    #[test]
    fn status_notification_reaches_the_supplied_user() {
        use stockbook_notify::{NotifierCall, RecordingNotifier};
        use stockbook_sales::OrderStatus;

        let w = world();
        let customer = seed_party(&w, PartyKind::Customer);
        let notifier = Arc::new(RecordingNotifier::new());
        let orders = OrderService::with_notifier(
            Arc::new(InMemoryOrderStore::new()),
            w.catalog.clone(),
            w.parties.clone(),
            notifier.clone(),
        );

        let order = orders.create_order(customer, None, &[]).unwrap();
        let user = UserId::new();
        orders
            .update_status(order.id, OrderStatus::Completed, Some(user))
            .unwrap();

        assert_eq!(
            notifier.calls(),
            vec![NotifierCall::OrderStatus {
                user_id: user,
                order_id: order.id.0,
                status: "Completed".to_string(),
            }]
        );
    }
}
