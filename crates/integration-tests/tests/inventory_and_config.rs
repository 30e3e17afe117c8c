//! Inventory management, shipping configuration, and dashboard roll-ups.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use serde_json::json;

use tiktokflow_core::{PostalAddress, ProductId, SkuId};
use tiktokflow_integration_tests::{pending_order, product, TestContext};
use tiktokflow_server::error::AppError;
use tiktokflow_server::services::ProfileInput;

#[tokio::test]
async fn manual_stock_update_persists_and_pushes() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 5));

    let updated = ctx
        .inventory
        .update_stock(ctx.session, &ProductId::new("P1"), 40)
        .await
        .unwrap();

    assert_eq!(updated.stock_level, 40);
    assert_eq!(
        ctx.store.product(&ProductId::new("P1")).unwrap().stock_level,
        40
    );
    let pushes = ctx.marketplace.inventory_pushes.lock().unwrap();
    assert_eq!(
        pushes.as_slice(),
        &[(ProductId::new("P1"), SkuId::new("sku-P1"), 40)]
    );
}

#[tokio::test]
async fn negative_stock_is_rejected() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 5));

    let err = ctx
        .inventory
        .update_stock(ctx.session, &ProductId::new("P1"), -1)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(
        ctx.store.product(&ProductId::new("P1")).unwrap().stock_level,
        5
    );
}

#[tokio::test]
async fn stock_update_for_unknown_product_is_not_found() {
    let ctx = TestContext::configured();

    let err = ctx
        .inventory
        .update_stock(ctx.session, &ProductId::new("NOPE"), 10)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn inventory_statistics_count_thresholds() {
    let ctx = TestContext::configured();
    ctx.store
        .insert_product(product(ctx.seller, "P1", "Wireless Earbuds", 45));
    ctx.store
        .insert_product(product(ctx.seller, "P2", "Phone Case", 8));
    ctx.store
        .insert_product(product(ctx.seller, "P3", "Screen Protector", 0));

    let mut earbuds = pending_order(ctx.seller, "ORD001");
    earbuds.quantity = 3;
    ctx.store.insert_order(earbuds);
    let mut case = pending_order(ctx.seller, "ORD002");
    case.product_name = "Phone Case".to_string();
    case.quantity = 1;
    ctx.store.insert_order(case);

    let stats = ctx.inventory.inventory_statistics(ctx.session).await.unwrap();

    assert_eq!(stats.total_products, 3);
    // Below ten units, out-of-stock included.
    assert_eq!(stats.low_stock, 2);
    assert_eq!(stats.out_of_stock, 1);
    assert_eq!(stats.top_sellers.len(), 2);
    assert_eq!(stats.top_sellers[0].product_name, "Wireless Earbuds");
    assert_eq!(stats.top_sellers[0].quantity, 3);
}

#[tokio::test]
async fn order_statistics_cover_last_thirty_days() {
    let ctx = TestContext::configured();
    let mut old = pending_order(ctx.seller, "ORD001");
    old.order_date = Utc::now() - Duration::days(45);
    ctx.store.insert_order(old);
    ctx.store.insert_order(pending_order(ctx.seller, "ORD002"));
    let mut shipped = pending_order(ctx.seller, "ORD003");
    shipped.status = tiktokflow_core::OrderStatus::Shipped;
    ctx.store.insert_order(shipped);

    let stats = ctx.orders.order_statistics(ctx.session).await.unwrap();

    assert_eq!(stats.total_orders, 3);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.shipped, 1);
    // Zero-filled daily buckets, the 45-day-old order excluded.
    assert_eq!(stats.trend.len(), 31);
    let counted: u64 = stats.trend.iter().map(|day| day.count).sum();
    assert_eq!(counted, 2);
}

fn profile_input() -> ProfileInput {
    serde_json::from_value(json!({
        "name": "Warehouse",
        "company": "TikTokFlow Test Co",
        "street1": "1 Depot Way",
        "city": "Austin",
        "state": "TX",
        "zip": "78701",
        "country": "US",
        "is_default": true,
    }))
    .unwrap()
}

#[tokio::test]
async fn profile_registered_at_carrier_when_key_exists() {
    let ctx = TestContext::configured();

    let profile = ctx
        .shipping
        .save_profile(ctx.session, profile_input())
        .await
        .unwrap();

    assert!(profile.carrier_address_id.is_some());
    let stored = ctx
        .shipping
        .default_profile(ctx.session)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Warehouse");
}

#[tokio::test]
async fn profile_saved_unregistered_without_key() {
    let ctx = TestContext::bare();

    let profile = ctx
        .shipping
        .save_profile(ctx.session, profile_input())
        .await
        .unwrap();

    assert!(profile.carrier_address_id.is_none());
}

#[tokio::test]
async fn incomplete_address_is_rejected() {
    let ctx = TestContext::configured();
    let mut input = profile_input();
    input.address = PostalAddress {
        street1: String::new(),
        ..input.address
    };

    let err = ctx
        .shipping
        .save_profile(ctx.session, input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MalformedData(_)));
}

#[tokio::test]
async fn api_key_validation_uses_stored_key_by_default() {
    let ctx = TestContext::configured();

    // Stored key is accepted by the stub; an explicit bad key is not.
    assert!(ctx.shipping.validate_api_key(ctx.session, None).await.unwrap());
    assert!(!ctx
        .shipping
        .validate_api_key(ctx.session, Some("bad-key"))
        .await
        .unwrap());

    // Without any key at all, validation cannot run.
    let bare = TestContext::bare();
    let err = bare
        .shipping
        .validate_api_key(bare.session, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConfigurationMissing(_)));
}

#[tokio::test]
async fn empty_api_key_is_rejected() {
    let ctx = TestContext::bare();
    let err = ctx
        .shipping
        .save_api_key(ctx.session, "   ".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    ctx.shipping
        .save_api_key(ctx.session, "shippo_new_key".to_string())
        .await
        .unwrap();
    assert!(ctx.shipping.validate_api_key(ctx.session, None).await.unwrap());
}

#[tokio::test]
async fn tracking_requires_stored_key() {
    let ctx = TestContext::configured();
    let status = ctx
        .shipping
        .track(ctx.session, "usps", "TRK-r2")
        .await
        .unwrap();
    assert_eq!(status.status, "TRANSIT");

    let bare = TestContext::bare();
    let err = bare
        .shipping
        .track(bare.session, "usps", "TRK-r2")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConfigurationMissing(_)));
}
