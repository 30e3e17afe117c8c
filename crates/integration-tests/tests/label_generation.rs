//! Label generation workflow tests.
//!
//! Exercise the real `OrderLifecycleService` against the in-memory store and
//! scripted gateways: the `Pending -> Generating -> Shipped` happy path, rate
//! selection, every failure path that must leave the order `Pending` and
//! untouched, and the refund compensation after a persistence failure.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use tiktokflow_core::{MarketplaceOrderStatus, OrderId, OrderStatus, RateId};
use tiktokflow_integration_tests::{pending_order, rate, TestContext};
use tiktokflow_server::error::AppError;

#[tokio::test]
async fn label_generation_ships_pending_order() {
    let ctx = TestContext::configured();
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    let order = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Shipped);
    assert!(order.has_label());
    // Default stub rates are r1 at 12.00 and r2 at 9.50; the cheaper wins.
    assert_eq!(order.tracking_number.as_deref(), Some("TRK-r2"));
    assert_eq!(
        order.shipping_label_url.as_deref(),
        Some("https://labels.test/r2.pdf")
    );

    let stored = ctx.store.order(&OrderId::new("ORD001")).unwrap();
    assert_eq!(stored.status, OrderStatus::Shipped);

    // The shipped status and tracking number reached the marketplace.
    let pushes = ctx.marketplace.status_pushes.lock().unwrap();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].0, OrderId::new("ORD001"));
    assert_eq!(pushes[0].1, MarketplaceOrderStatus::Shipped);
    assert_eq!(pushes[0].2.as_deref(), Some("TRK-r2"));
}

#[tokio::test]
async fn cheapest_rate_is_purchased() {
    let ctx = TestContext::configured();
    ctx.carrier.set_rates(vec![
        rate("r1", "12.00"),
        rate("r2", "9.50"),
        rate("r3", "15.25"),
    ]);
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    ctx.orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap();

    let purchased = ctx.carrier.purchased.lock().unwrap();
    assert_eq!(purchased.as_slice(), &[RateId::new("r2")]);
}

#[tokio::test]
async fn rate_tie_keeps_first_offered() {
    let ctx = TestContext::configured();
    ctx.carrier
        .set_rates(vec![rate("a", "9.50"), rate("b", "9.50")]);
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    ctx.orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap();

    let purchased = ctx.carrier.purchased.lock().unwrap();
    assert_eq!(purchased.as_slice(), &[RateId::new("a")]);
}

#[tokio::test]
async fn missing_profile_fails_before_any_carrier_call() {
    // A connected shop and a carrier key, but no ship-from profile.
    let ctx = TestContext::bare();
    ctx.store.insert_carrier_settings(tiktokflow_core::CarrierSettings {
        seller_id: ctx.seller,
        api_key: "shippo_test_key".to_string(),
    });
    ctx.store.insert_credential(tiktokflow_integration_tests::credential(
        ctx.seller,
        chrono::Utc::now() + chrono::Duration::hours(1),
    ));
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ConfigurationMissing(_)));
    assert_eq!(ctx.carrier.total_calls(), 0);
    // The claim was released; the order is available again.
    let order = ctx.store.order(&OrderId::new("ORD001")).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(!order.has_label());
}

#[tokio::test]
async fn missing_api_key_fails_before_any_carrier_call() {
    let ctx = TestContext::bare();
    ctx.store
        .insert_profile(tiktokflow_integration_tests::default_profile(ctx.seller));
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ConfigurationMissing(_)));
    assert_eq!(ctx.carrier.total_calls(), 0);
    assert_eq!(
        ctx.store.order(&OrderId::new("ORD001")).unwrap().status,
        OrderStatus::Pending
    );
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let ctx = TestContext::configured();

    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("NOPE"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(ctx.carrier.total_calls(), 0);
}

#[tokio::test]
async fn shipped_order_cannot_be_labelled_again() {
    let ctx = TestContext::configured();
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    ctx.orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap();
    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
    // Only the first attempt reached the carrier.
    assert_eq!(ctx.carrier.shipment_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.carrier.purchase_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unparsable_address_leaves_order_pending() {
    let ctx = TestContext::configured();
    let mut order = pending_order(ctx.seller, "ORD001");
    order.customer_address = "not json at all".to_string();
    ctx.store.insert_order(order);

    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MalformedData(_)));
    assert_eq!(ctx.carrier.total_calls(), 0);
    assert_eq!(
        ctx.store.order(&OrderId::new("ORD001")).unwrap().status,
        OrderStatus::Pending
    );
}

#[tokio::test]
async fn no_rates_leaves_order_pending() {
    let ctx = TestContext::configured();
    ctx.carrier.set_rates(Vec::new());
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoRatesAvailable));
    assert_eq!(ctx.carrier.purchase_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        ctx.store.order(&OrderId::new("ORD001")).unwrap().status,
        OrderStatus::Pending
    );
}

#[tokio::test]
async fn quote_failure_releases_claim() {
    let ctx = TestContext::configured();
    ctx.carrier.fail_shipment.store(true, Ordering::SeqCst);
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Carrier(_)));

    let order = ctx.store.order(&OrderId::new("ORD001")).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(!order.has_label());

    // A retry after the carrier recovers succeeds.
    ctx.carrier.fail_shipment.store(false, Ordering::SeqCst);
    let order = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn purchase_failure_releases_claim() {
    let ctx = TestContext::configured();
    ctx.carrier.fail_purchase.store(true, Ordering::SeqCst);
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Carrier(_)));

    assert_eq!(
        ctx.store.order(&OrderId::new("ORD001")).unwrap().status,
        OrderStatus::Pending
    );
    assert_eq!(ctx.carrier.refund_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn persistence_failure_refunds_the_purchase() {
    let ctx = TestContext::configured();
    ctx.store.fail_mark_shipped.store(true, Ordering::SeqCst);
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));

    let err = ctx
        .orders
        .generate_label(ctx.session, &OrderId::new("ORD001"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    // The label was bought, then compensated, and the order is pending again.
    assert_eq!(ctx.carrier.purchase_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.carrier.refund_calls.load(Ordering::SeqCst), 1);
    let order = ctx.store.order(&OrderId::new("ORD001")).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(!order.has_label());
    assert!(ctx.marketplace.status_pushes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn batch_isolates_failures_per_order() {
    let ctx = TestContext::configured();
    ctx.store.insert_order(pending_order(ctx.seller, "ORD001"));
    let mut broken = pending_order(ctx.seller, "ORD002");
    broken.customer_address = "{broken".to_string();
    ctx.store.insert_order(broken);
    ctx.store.insert_order(pending_order(ctx.seller, "ORD003"));

    let outcomes = ctx
        .orders
        .generate_labels(
            ctx.session,
            &[
                OrderId::new("ORD001"),
                OrderId::new("ORD002"),
                OrderId::new("ORD003"),
            ],
        )
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
    assert!(outcomes[1].error.is_some());
    assert!(outcomes[2].success);

    assert_eq!(
        ctx.store.order(&OrderId::new("ORD001")).unwrap().status,
        OrderStatus::Shipped
    );
    assert_eq!(
        ctx.store.order(&OrderId::new("ORD002")).unwrap().status,
        OrderStatus::Pending
    );
    assert_eq!(
        ctx.store.order(&OrderId::new("ORD003")).unwrap().status,
        OrderStatus::Shipped
    );
}
