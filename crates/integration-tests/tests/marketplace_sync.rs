//! Marketplace sync tests.
//!
//! Order sync from wire payloads through status mapping, the no-regress
//! upsert, inventory reconciliation of newly-seen pending orders, proactive
//! token refresh at the five-minute boundary, and idempotent product sync.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};
use serde_json::json;

use tiktokflow_core::{OrderId, OrderStatus, ProductId, SkuId};
use tiktokflow_integration_tests::{credential, product, TestContext};

fn wire_order(id: &str, status: &str, product_id: Option<&str>, quantity: i32) -> serde_json::Value {
    let mut item = json!({
        "product_name": "Wireless Earbuds",
        "quantity": quantity,
    });
    if let Some(pid) = product_id {
        item["product_id"] = json!(pid);
    }
    json!({
        "order_id": id,
        "order_status": status,
        "create_time": 1_705_300_000,
        "recipient": {
            "name": "Sarah Johnson",
            "email": "sarah@example.com",
            "address": {"street1": "123 Main St", "city": "New York",
                        "state": "NY", "zip": "10001", "country": "US"}
        },
        "items": [item],
    })
}

#[tokio::test]
async fn sync_imports_orders_and_decrements_stock_by_id() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 10));
    ctx.marketplace
        .set_orders(json!([wire_order("ORD001", "AWAITING_SHIPMENT", Some("P1"), 2)]));

    let summary = ctx.orders.sync_orders(ctx.session).await.unwrap();
    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.new_pending, 1);

    let order = ctx.store.order(&OrderId::new("ORD001")).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.product_id, Some(ProductId::new("P1")));

    // 10 on hand minus 2 ordered, persisted locally and pushed to the shop.
    let stored = ctx.store.product(&ProductId::new("P1")).unwrap();
    assert_eq!(stored.stock_level, 8);
    let pushes = ctx.marketplace.inventory_pushes.lock().unwrap();
    assert_eq!(
        pushes.as_slice(),
        &[(ProductId::new("P1"), SkuId::new("sku-P1"), 8)]
    );
}

#[tokio::test]
async fn sync_matches_product_by_name_when_id_missing() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 5));
    ctx.marketplace
        .set_orders(json!([wire_order("ORD001", "AWAITING_SHIPMENT", None, 3)]));

    ctx.orders.sync_orders(ctx.session).await.unwrap();

    let stored = ctx.store.product(&ProductId::new("P1")).unwrap();
    assert_eq!(stored.stock_level, 2);
}

#[tokio::test]
async fn stock_clamps_at_zero() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 3));
    ctx.marketplace
        .set_orders(json!([wire_order("ORD001", "AWAITING_SHIPMENT", Some("P1"), 5)]));

    ctx.orders.sync_orders(ctx.session).await.unwrap();

    let stored = ctx.store.product(&ProductId::new("P1")).unwrap();
    assert_eq!(stored.stock_level, 0);
}

#[tokio::test]
async fn unknown_product_triggers_resync_without_decrement() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Something Else", 7));
    ctx.marketplace
        .set_orders(json!([wire_order("ORD001", "AWAITING_SHIPMENT", Some("NOPE"), 2)]));

    ctx.orders.sync_orders(ctx.session).await.unwrap();

    // The catalog was re-fetched, and nothing local was decremented.
    assert!(ctx.marketplace.product_fetches.load(Ordering::SeqCst) >= 1);
    assert_eq!(
        ctx.store.product(&ProductId::new("P1")).unwrap().stock_level,
        7
    );
    assert!(ctx.marketplace.inventory_pushes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn sync_never_regresses_a_shipped_order() {
    let ctx = TestContext::configured();
    let mut shipped = tiktokflow_integration_tests::pending_order(ctx.seller, "ORD001");
    shipped.status = OrderStatus::Shipped;
    shipped.shipping_label_url = Some("https://labels.test/r2.pdf".to_string());
    shipped.tracking_number = Some("TRK-r2".to_string());
    ctx.store.insert_order(shipped);

    // The marketplace still reports the order as awaiting shipment.
    ctx.marketplace
        .set_orders(json!([wire_order("ORD001", "AWAITING_SHIPMENT", None, 2)]));

    let summary = ctx.orders.sync_orders(ctx.session).await.unwrap();
    assert_eq!(summary.new_pending, 0);

    let order = ctx.store.order(&OrderId::new("ORD001")).unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert!(order.has_label());
}

#[tokio::test]
async fn external_tracking_without_label_is_not_stored() {
    // Some marketplaces report a tracking number for orders shipped outside
    // this system. Stored rows keep label and tracking both-or-neither, so
    // the lone tracking number is dropped and the sync still succeeds.
    let ctx = TestContext::configured();
    let mut shipped = wire_order("ORD001", "SHIPPED", None, 1);
    shipped["tracking_number"] = json!("TRK-EXTERNAL");
    ctx.marketplace.set_orders(json!([shipped]));

    let summary = ctx.orders.sync_orders(ctx.session).await.unwrap();
    assert_eq!(summary.upserted, 1);

    let order = ctx.store.order(&OrderId::new("ORD001")).unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.tracking_number, None);
    assert!(!order.has_label());
}

#[tokio::test]
async fn label_and_tracking_pair_from_wire_is_stored() {
    let ctx = TestContext::configured();
    let mut shipped = wire_order("ORD001", "SHIPPED", None, 1);
    shipped["shipping_label_url"] = json!("https://labels.example/ext.pdf");
    shipped["tracking_number"] = json!("TRK-EXTERNAL");
    ctx.marketplace.set_orders(json!([shipped]));

    ctx.orders.sync_orders(ctx.session).await.unwrap();

    let order = ctx.store.order(&OrderId::new("ORD001")).unwrap();
    assert!(order.has_label());
    assert_eq!(order.tracking_number.as_deref(), Some("TRK-EXTERNAL"));
}

#[tokio::test]
async fn second_sync_does_not_decrement_again() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 10));
    ctx.marketplace
        .set_orders(json!([wire_order("ORD001", "AWAITING_SHIPMENT", Some("P1"), 2)]));

    let first = ctx.orders.sync_orders(ctx.session).await.unwrap();
    let second = ctx.orders.sync_orders(ctx.session).await.unwrap();

    assert_eq!(first.new_pending, 1);
    assert_eq!(second.new_pending, 0);
    assert_eq!(
        ctx.store.product(&ProductId::new("P1")).unwrap().stock_level,
        8
    );
}

#[tokio::test]
async fn token_refreshed_only_inside_skew_window() {
    // Six minutes of validity left: no refresh.
    let ctx = TestContext::configured();
    ctx.store
        .insert_credential(credential(ctx.seller, Utc::now() + Duration::minutes(6)));
    ctx.orders.sync_orders(ctx.session).await.unwrap();
    assert_eq!(ctx.marketplace.refresh_calls.load(Ordering::SeqCst), 0);

    // Four minutes left: refreshed, and the rotated tokens are persisted.
    let ctx = TestContext::configured();
    ctx.store
        .insert_credential(credential(ctx.seller, Utc::now() + Duration::minutes(4)));
    ctx.orders.sync_orders(ctx.session).await.unwrap();
    assert_eq!(ctx.marketplace.refresh_calls.load(Ordering::SeqCst), 1);

    let stored = ctx.store.credential().unwrap();
    assert_eq!(stored.access_token, "at-1-rotated");
    assert_eq!(stored.refresh_token, "rt-1-rotated");
    assert!(stored.expires_at > Utc::now() + Duration::minutes(30));
}

#[tokio::test]
async fn product_sync_is_idempotent_and_overwrites_local_stock() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 3));
    ctx.marketplace.set_products(json!([
        {
            "id": "P1",
            "name": "Wireless Earbuds",
            "skus": [{"id": "S1", "seller_sku": "WE001",
                      "stock_infos": [{"available_stock": 45}]}]
        },
        {
            "id": "P2",
            "name": "Phone Case",
            "skus": [{"id": "S2", "seller_sku": "PC001",
                      "stock_infos": [{"available_stock": 23}]}]
        },
        // No SKUs: skipped, not imported.
        {"id": "P3", "name": "Mystery Item", "skus": []}
    ]));

    let first = ctx.inventory.sync_products(ctx.session).await.unwrap();
    let second = ctx.inventory.sync_products(ctx.session).await.unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 2);
    // One page covers the whole catalog; the skipped SKU-less product must
    // not push the cursor onto a phantom second page.
    assert_eq!(ctx.marketplace.product_fetches.load(Ordering::SeqCst), 2);
    // Marketplace stock is authoritative.
    assert_eq!(
        ctx.store.product(&ProductId::new("P1")).unwrap().stock_level,
        45
    );
    assert_eq!(
        ctx.store.product(&ProductId::new("P2")).unwrap().stock_level,
        23
    );
    assert!(ctx.store.product(&ProductId::new("P3")).is_none());
}

#[tokio::test]
async fn synced_order_flows_through_to_shipped() {
    // End to end: sync pulls the order in, label generation ships it.
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 10));
    ctx.marketplace
        .set_orders(json!([wire_order("ORD001", "AWAITING_SHIPMENT", Some("P1"), 2)]));

    ctx.orders.sync_orders(ctx.session).await.unwrap();
    let order = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Shipped);
    assert!(order.has_label());
    assert_eq!(
        ctx.store.product(&ProductId::new("P1")).unwrap().stock_level,
        8
    );
    assert_eq!(ctx.marketplace.status_pushes.lock().unwrap().len(), 1);
}
