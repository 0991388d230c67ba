use chrono::Utc;
use outreach_allocator::clients::InventoryClient;
use outreach_allocator::collaborators::InventoryReservations;
use outreach_allocator::framework::{mock::MockClient, ActorClient, FrameworkError};
use outreach_allocator::inventory_actor::{InventoryActionResult, InventoryError};
use outreach_allocator::model::{
    InventoryItem, ItemId, OrderCreate, OrderLine, OrderStatus, Requester, UserId,
};
use outreach_allocator::AllocationError;
use std::sync::Arc;

fn two_line_order() -> OrderCreate {
    OrderCreate {
        requester: Requester::User(UserId(1)),
        lines: vec![
            OrderLine {
                item_id: ItemId(1),
                quantity: 2,
            },
            OrderLine {
                item_id: ItemId(2),
                quantity: 1,
            },
        ],
        created_at: Utc::now(),
    }
}

/// Real Order actor with a mocked inventory.
///
/// Creating the order reserves each line (one Action per line) and withdrawing it releases
/// each line again.
#[tokio::test]
async fn test_order_actor_reserves_and_releases_through_inventory() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    inventory_mock
        .expect_action(ItemId(1))
        .return_ok(InventoryActionResult::Reserved(8));
    inventory_mock
        .expect_action(ItemId(2))
        .return_ok(InventoryActionResult::Reserved(4));
    inventory_mock
        .expect_action(ItemId(1))
        .return_ok(InventoryActionResult::Released(10));
    inventory_mock
        .expect_action(ItemId(2))
        .return_ok(InventoryActionResult::Released(5));

    let reservations: Arc<dyn InventoryReservations> =
        Arc::new(InventoryClient::new(inventory_mock.client()));
    let (order_actor, order_client) = outreach_allocator::order_actor::new(10);
    let actor_handle = tokio::spawn(order_actor.run(reservations));

    let order_id = order_client
        .create_order(two_line_order())
        .await
        .expect("Order creation failed");
    let order = order_client.get(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.stock_reserved);
    assert_eq!(order.round_id, None);

    let cancelled = order_client
        .cancel(order_id, Some(Requester::User(UserId(1))))
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(!cancelled.stock_reserved);

    inventory_mock.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

/// A failed reservation rolls back the lines reserved before it and stores nothing.
#[tokio::test]
async fn test_order_actor_rolls_back_partial_reservation() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    inventory_mock
        .expect_action(ItemId(1))
        .return_ok(InventoryActionResult::Reserved(8));
    inventory_mock
        .expect_action(ItemId(2))
        .return_err(FrameworkError::EntityError(Box::new(
            InventoryError::InsufficientStock {
                requested: 1,
                available: 0,
            },
        )));
    inventory_mock
        .expect_action(ItemId(1))
        .return_ok(InventoryActionResult::Released(10));

    let reservations: Arc<dyn InventoryReservations> =
        Arc::new(InventoryClient::new(inventory_mock.client()));
    let (order_actor, order_client) = outreach_allocator::order_actor::new(10);
    let actor_handle = tokio::spawn(order_actor.run(reservations));

    let err = order_client.create_order(two_line_order()).await.unwrap_err();
    assert_eq!(
        err,
        AllocationError::Inventory(InventoryError::InsufficientStock {
            requested: 1,
            available: 0,
        })
    );

    let stored = order_client.unbound_pending().await.unwrap();
    assert!(stored.is_empty());
    inventory_mock.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_order_actor_rejects_empty_orders_without_touching_inventory() {
    let inventory_mock = MockClient::<InventoryItem>::new();
    let reservations: Arc<dyn InventoryReservations> =
        Arc::new(InventoryClient::new(inventory_mock.client()));
    let (order_actor, order_client) = outreach_allocator::order_actor::new(10);
    let actor_handle = tokio::spawn(order_actor.run(reservations));

    let mut params = two_line_order();
    params.lines.clear();
    let err = order_client.create_order(params).await.unwrap_err();
    assert!(matches!(err, AllocationError::InvalidInput(_)));
    inventory_mock.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}
