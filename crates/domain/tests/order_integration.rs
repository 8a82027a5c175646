//! Integration tests for orders.
//!
//! These tests drive `OrderService` against the in-memory store and verify
//! numbering, the status lifecycle, replay and stock hand-back.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{CustomerId, Money, ProductId};
use domain::catalog::reservation_key;
use domain::{
    Address, Aggregate, CancelOrder, Caller, CatalogService, DomainEvent, ErrorKind,
    InventoryAdjuster, NewProduct, OrderEvent, OrderLine, OrderService, OrderStatus, PlaceOrder,
    ProductLookup, RequestRefund, ReviewRefund, StockReservation, UpdateOrderStatus, Variant,
    VariantSelector,
};
use event_store::{EventStore, InMemoryEventStore, Position};

struct Shop {
    store: InMemoryEventStore,
    catalog: Arc<CatalogService<InMemoryEventStore>>,
    orders: Arc<OrderService<InMemoryEventStore>>,
}

fn shop() -> Shop {
    let store = InMemoryEventStore::new();
    let catalog = Arc::new(CatalogService::new(store.clone()));
    let orders = Arc::new(OrderService::new(
        store.clone(),
        catalog.clone(),
        catalog.clone(),
    ));
    Shop {
        store,
        catalog,
        orders,
    }
}

fn address() -> Address {
    Address {
        full_name: "Grace Hopper".to_string(),
        line1: "1 Harbor Way".to_string(),
        line2: Some("Suite 9".to_string()),
        city: "Arlington".to_string(),
        state: Some("VA".to_string()),
        postal_code: "22201".to_string(),
        country: "US".to_string(),
        phone: None,
    }
}

async fn list(shop: &Shop, cents: i64, stock: u32, variants: Vec<Variant>) -> ProductId {
    shop.catalog
        .list_product(NewProduct {
            name: "Field Jacket".to_string(),
            price: Money::from_cents(cents),
            images: vec!["https://img.example/jacket.jpg".to_string()],
            stock,
            variants,
            active: true,
        })
        .await
        .unwrap()
        .product_id()
        .unwrap()
}

fn order_for(customer: CustomerId, lines: Vec<OrderLine>) -> PlaceOrder {
    PlaceOrder::new(Some(customer), "grace@example.com", lines, address())
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn full_lifecycle_to_refund() {
        let shop = shop();
        let product = list(&shop, 4000, 10, vec![]).await;
        let customer = CustomerId::new();
        let admin = Caller::admin(None);

        let order = shop
            .orders
            .place_order(order_for(customer, vec![OrderLine::new(product, 1)]))
            .await
            .unwrap();
        let order_id = order.id().unwrap();
        // 40.00 + 3.40 tax + 5.99 shipping
        assert_eq!(order.totals().total, Money::from_cents(4939));

        for status in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let order = shop
                .orders
                .update_status(&admin, UpdateOrderStatus::new(order_id, status))
                .await
                .unwrap();
            assert_eq!(order.status(), status);
        }

        shop.orders
            .request_refund(
                &Caller::customer(customer),
                RequestRefund::new(order_id, "wrong size", Some(Money::from_cents(1000))),
            )
            .await
            .unwrap();
        let order = shop
            .orders
            .approve_refund(&admin, ReviewRefund::new(order_id, Some("ok".to_string())))
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Refunded);
        let statuses: Vec<_> = order.history().iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Processing,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
                OrderStatus::Refunded,
            ]
        );
    }

    #[tokio::test]
    async fn status_never_moves_backwards() {
        let shop = shop();
        let product = list(&shop, 1500, 10, vec![]).await;
        let admin = Caller::admin(None);
        let order_id = shop
            .orders
            .place_order(order_for(CustomerId::new(), vec![OrderLine::new(product, 1)]))
            .await
            .unwrap()
            .id()
            .unwrap();

        shop.orders
            .update_status(
                &admin,
                UpdateOrderStatus::new(order_id, OrderStatus::Shipped),
            )
            .await
            .unwrap();
        let err = shop
            .orders
            .update_status(
                &admin,
                UpdateOrderStatus::new(order_id, OrderStatus::Processing),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.is_state_conflict());
    }

    #[tokio::test]
    async fn shipped_orders_cannot_be_cancelled() {
        let shop = shop();
        let product = list(&shop, 1500, 10, vec![]).await;
        let customer = CustomerId::new();
        let order_id = shop
            .orders
            .place_order(order_for(customer, vec![OrderLine::new(product, 1)]))
            .await
            .unwrap()
            .id()
            .unwrap();
        shop.orders
            .update_status(
                &Caller::admin(None),
                UpdateOrderStatus::new(order_id, OrderStatus::Shipped),
            )
            .await
            .unwrap();

        let err = shop
            .orders
            .cancel(
                &Caller::customer(customer),
                CancelOrder::new(order_id, None),
            )
            .await
            .unwrap_err();
        assert!(err.is_state_conflict());
    }

    #[tokio::test]
    async fn admin_cancel_through_status_update_releases_variant_stock() {
        let shop = shop();
        let product = list(
            &shop,
            2500,
            0,
            vec![Variant {
                color: "olive".to_string(),
                size: "M".to_string(),
                stock: 4,
            }],
        )
        .await;
        let olive_m = VariantSelector::new("olive", "M");
        let order_id = shop
            .orders
            .place_order(order_for(
                CustomerId::new(),
                vec![OrderLine::new(product, 2).with_variant(olive_m.clone())],
            ))
            .await
            .unwrap()
            .id()
            .unwrap();
        shop.catalog
            .reserve(&StockReservation {
                key: reservation_key(order_id, 0),
                product_id: product,
                variant: Some(olive_m.clone()),
                quantity: 2,
            })
            .await
            .unwrap();

        let order = shop
            .orders
            .update_status(
                &Caller::admin(None),
                UpdateOrderStatus::new(order_id, OrderStatus::Cancelled)
                    .with_note(Some("fraud check".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        let snapshot = shop.catalog.find_product(product).await.unwrap().unwrap();
        assert_eq!(snapshot.available(Some(&olive_m)).unwrap(), 4);
    }
}

mod placement {
    use super::*;

    #[tokio::test]
    async fn variant_is_required_for_products_with_variants() {
        let shop = shop();
        let product = list(
            &shop,
            2500,
            0,
            vec![Variant {
                color: "black".to_string(),
                size: "S".to_string(),
                stock: 2,
            }],
        )
        .await;

        let err = shop
            .orders
            .place_order(order_for(CustomerId::new(), vec![OrderLine::new(product, 1)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);

        let err = shop
            .orders
            .place_order(order_for(
                CustomerId::new(),
                vec![OrderLine::new(product, 1).with_variant(VariantSelector::new("red", "S"))],
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[tokio::test]
    async fn guests_can_order_but_only_admins_read_it_back() {
        let shop = shop();
        let product = list(&shop, 900, 3, vec![]).await;
        let order = shop
            .orders
            .place_order(PlaceOrder::new(
                None,
                "guest@example.com",
                vec![OrderLine::new(product, 1)],
                address(),
            ))
            .await
            .unwrap();
        let order_id = order.id().unwrap();

        let err = shop
            .orders
            .get_order(&Caller::guest(), order_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(
            shop.orders
                .get_order(&Caller::admin(None), order_id)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn concurrent_placements_get_distinct_numbers() {
        let shop = shop();
        let product = list(&shop, 1000, 100, vec![]).await;
        let day = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();

        let mut handles = Vec::new();
        for _ in 0..5 {
            let orders = shop.orders.clone();
            handles.push(tokio::spawn(async move {
                orders
                    .place_order(
                        order_for(CustomerId::new(), vec![OrderLine::new(product, 1)])
                            .placed_at(day),
                    )
                    .await
                    .unwrap()
                    .order_number()
                    .to_string()
            }));
        }

        let mut numbers = HashSet::new();
        for handle in handles {
            numbers.insert(handle.await.unwrap());
        }
        assert_eq!(numbers.len(), 5);
        assert!(numbers.contains("241231001"));
        assert!(numbers.contains("241231005"));
    }
}

mod replay {
    use super::*;

    #[tokio::test]
    async fn reloaded_order_matches_what_was_written() {
        let shop = shop();
        let product = list(&shop, 2000, 5, vec![]).await;
        let customer = CustomerId::new();

        let placed = shop
            .orders
            .place_order(
                order_for(customer, vec![OrderLine::new(product, 3)])
                    .with_billing_address(Some(address())),
            )
            .await
            .unwrap();
        let order_id = placed.id().unwrap();

        let loaded = shop
            .orders
            .get_order(&Caller::customer(customer), order_id)
            .await
            .unwrap();

        assert_eq!(loaded.order_number(), placed.order_number());
        assert_eq!(loaded.totals(), placed.totals());
        assert_eq!(loaded.total_item_count(), 3);
        assert_eq!(loaded.billing_address(), Some(&address()));
        assert_eq!(loaded.version(), placed.version());
    }

    #[tokio::test]
    async fn every_order_event_lands_in_the_global_log() {
        let shop = shop();
        let product = list(&shop, 2000, 5, vec![]).await;
        let customer = CustomerId::new();
        let order_id = shop
            .orders
            .place_order(order_for(customer, vec![OrderLine::new(product, 1)]))
            .await
            .unwrap()
            .id()
            .unwrap();
        shop.orders
            .cancel(&Caller::customer(customer), CancelOrder::new(order_id, None))
            .await
            .unwrap();

        let all = shop.store.read_all(Position::start(), 100).await.unwrap();
        let order_events: Vec<_> = all
            .iter()
            .filter(|e| e.aggregate_id == order_id)
            .map(|e| e.decode::<OrderEvent>().unwrap().event_type())
            .collect();
        assert_eq!(order_events, vec!["OrderPlaced", "OrderCancelled"]);
        assert!(all.windows(2).all(|w| w[0].position < w[1].position));
    }
}
