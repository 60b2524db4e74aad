use chrono::Duration;
use orderflow::application::checkout::CheckoutEngine;
use orderflow::domain::order::LineItem;
use orderflow::domain::ports::{CatalogStoreBox, ChallengeStoreBox, OrderStoreBox};
use orderflow::domain::product::Product;
use orderflow::error::CheckoutError;
use orderflow::infrastructure::audit::TracingAuditSink;
use orderflow::infrastructure::clock::ManualClock;
use orderflow::infrastructure::in_memory::{
    InMemoryCatalog, InMemoryChallengeStore, InMemoryOrderStore,
};
use std::sync::Arc;

async fn engine_with_clock(clock: ManualClock) -> CheckoutEngine {
    let catalog = InMemoryCatalog::new();
    catalog.insert(Product::new("p1", "Widget", 500, 10)).await;

    let catalog: CatalogStoreBox = Box::new(catalog);
    let orders: OrderStoreBox = Box::new(InMemoryOrderStore::new());
    let challenges: ChallengeStoreBox = Box::new(InMemoryChallengeStore::new());

    CheckoutEngine::new(
        catalog,
        orders,
        challenges,
        Box::new(TracingAuditSink::new()),
        Box::new(clock),
    )
}

#[tokio::test]
async fn test_concurrent_confirmations_from_spawned_tasks() {
    let engine = Arc::new(engine_with_clock(ManualClock::default()).await);

    let order = engine
        .create_order("user1", vec![LineItem::new("p1", 2).unwrap()])
        .await
        .unwrap();
    let issued = engine.issue_challenge(&order.id, "user1").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        let order_id = order.id.clone();
        let code = issued.raw_code.clone();
        handles.push(tokio::spawn(async move {
            engine.confirm_payment(&order_id, "user1", &code).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(CheckoutError::AlreadyPaidError) => {}
            Err(other) => panic!("unexpected outcome: {other}"),
        }
    }
    assert_eq!(successes, 1);

    let listed = engine.list_orders("user1").await.unwrap();
    assert!(listed[0].paid);
}

#[tokio::test]
async fn test_challenge_lifecycle_over_time() {
    let clock = ManualClock::default();
    let engine = engine_with_clock(clock.clone()).await;

    let order = engine
        .create_order("user1", vec![LineItem::new("p1", 1).unwrap()])
        .await
        .unwrap();
    let issued = engine.issue_challenge(&order.id, "user1").await.unwrap();

    clock.advance(Duration::minutes(5) + Duration::milliseconds(1));
    let expired = engine
        .confirm_payment(&order.id, "user1", &issued.raw_code)
        .await;
    assert!(matches!(expired, Err(CheckoutError::ExpiredChallengeError)));

    // A fresh challenge works where the expired one cannot.
    let reissued = engine.issue_challenge(&order.id, "user1").await.unwrap();
    engine
        .confirm_payment(&order.id, "user1", &reissued.raw_code)
        .await
        .unwrap();

    assert!(engine.list_orders("user1").await.unwrap()[0].paid);
}

#[tokio::test]
async fn test_order_amount_survives_catalog_changes() {
    let catalog = InMemoryCatalog::new();
    catalog.insert(Product::new("p1", "Widget", 500, 10)).await;
    let seeder = catalog.clone();

    let engine = CheckoutEngine::new(
        Box::new(catalog),
        Box::new(InMemoryOrderStore::new()),
        Box::new(InMemoryChallengeStore::new()),
        Box::new(TracingAuditSink::new()),
        Box::new(ManualClock::default()),
    );

    let order = engine
        .create_order("user1", vec![LineItem::new("p1", 2).unwrap()])
        .await
        .unwrap();
    assert_eq!(order.amount_cents.value(), 1000);

    // Re-price the product after the order exists; the snapshot must not move.
    seeder.insert(Product::new("p1", "Widget", 900, 10)).await;

    let listed = engine.list_orders("user1").await.unwrap();
    assert_eq!(listed[0].amount_cents.value(), 1000);
}
