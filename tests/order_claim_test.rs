mod common;

use chrono::Duration;
use common::{line, Harness};
use outreach_allocator::model::{AssignmentStatus, OrderStatus, Requester};
use outreach_allocator::{AllocationError, ORDER_ALREADY_ACCEPTED};

#[tokio::test]
async fn test_concurrent_accept_has_exactly_one_winner() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let item = h.item(10).await;
    let requester = h.volunteer("Req").await;
    let order = h
        .system
        .intake
        .create_order(Requester::User(requester), line(item, 1))
        .await
        .unwrap();
    assert_eq!(order.round_id, Some(round_id));

    let v1 = h.volunteer("Vee").await;
    let v2 = h.volunteer("Wes").await;
    let (c1, c2) = (h.system.claims.clone(), h.system.claims.clone());
    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { c1.accept_order(order.id, v1, round_id).await }),
        tokio::spawn(async move { c2.accept_order(order.id, v2, round_id).await }),
    );
    let results = [r1.unwrap(), r2.unwrap()];

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(
        loser,
        &AllocationError::Conflict(ORDER_ALREADY_ACCEPTED.to_string())
    );

    let stored = h.system.orders.fetch(order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Accepted);
    assert_eq!(stored.holder().map(|a| a.volunteer_id), Some(winners[0].volunteer_id));
    h.shutdown().await;
}

#[tokio::test]
async fn test_accept_again_by_holder_returns_same_assignment() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let item = h.item(10).await;
    let order = h
        .system
        .intake
        .create_order(Requester::guest("198.51.100.4"), line(item, 1))
        .await
        .unwrap();
    let volunteer = h.volunteer("Hal").await;

    let first = h.system.claims.accept_order(order.id, volunteer, round_id).await.unwrap();
    let second = h.system.claims.accept_order(order.id, volunteer, round_id).await.unwrap();
    assert_eq!(first.id, second.id);

    let stored = h.system.orders.fetch(order.id).await.unwrap();
    assert_eq!(stored.assignments.len(), 1);
    h.shutdown().await;
}

#[tokio::test]
async fn test_claim_state_machine() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let item = h.item(10).await;
    let order = h
        .system
        .intake
        .create_order(Requester::guest("198.51.100.5"), line(item, 2))
        .await
        .unwrap();
    let volunteer = h.volunteer("Gus").await;
    let stranger = h.volunteer("Zed").await;

    let assignment = h.system.claims.accept_order(order.id, volunteer, round_id).await.unwrap();
    assert_eq!(assignment.status, AssignmentStatus::Accepted);

    // Cannot skip a step.
    let err = h.system.claims.complete_order(assignment.id, volunteer).await.unwrap_err();
    assert!(matches!(err, AllocationError::InvalidState(_)));

    // Only the holder moves the claim.
    let err = h.system.claims.start_order(assignment.id, stranger).await.unwrap_err();
    assert!(matches!(err, AllocationError::Unauthorized(_)));

    let started = h.system.claims.start_order(assignment.id, volunteer).await.unwrap();
    assert_eq!(started.status, AssignmentStatus::InProgress);
    assert_eq!(
        h.system.orders.fetch(order.id).await.unwrap().status,
        OrderStatus::Processing
    );

    let done = h.system.claims.complete_order(assignment.id, volunteer).await.unwrap();
    assert_eq!(done.status, AssignmentStatus::Completed);
    assert_eq!(done.completed_at, Some(h.clock_now()));

    let stored = h.system.orders.fetch(order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
    assert_eq!(stored.fulfilled_by, Some(volunteer));
    assert_eq!(stored.delivery_time, Some(h.clock_now()));

    // A delivered order cannot be claimed or cancelled.
    let err = h.system.claims.accept_order(order.id, stranger, round_id).await.unwrap_err();
    assert!(matches!(err, AllocationError::InvalidState(_)));
    let err = h.system.claims.cancel_assignment(assignment.id, volunteer).await.unwrap_err();
    assert!(matches!(err, AllocationError::InvalidState(_)));

    // Delivered stock stays out of inventory.
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 8);
    h.shutdown().await;
}

#[tokio::test]
async fn test_volunteer_quota_is_enforced() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let item = h.item(10).await;
    let volunteer = h.volunteer("Quo").await;

    let config = h
        .system
        .capacity
        .update_capacity(round_id, 1, None, h.staff)
        .await
        .unwrap();
    assert_eq!(config.max_orders_per_volunteer, 1);
    assert_eq!(config.last_modified_by, Some(h.staff));

    let first = h
        .system
        .intake
        .create_order(Requester::guest("192.0.2.1"), line(item, 1))
        .await
        .unwrap();
    let second = h
        .system
        .intake
        .create_order(Requester::guest("192.0.2.2"), line(item, 1))
        .await
        .unwrap();

    assert!(h.system.capacity.can_volunteer_accept_more(round_id, volunteer).await.unwrap());
    h.system.claims.accept_order(first.id, volunteer, round_id).await.unwrap();
    assert!(!h.system.capacity.can_volunteer_accept_more(round_id, volunteer).await.unwrap());

    let err = h.system.claims.accept_order(second.id, volunteer, round_id).await.unwrap_err();
    assert!(matches!(err, AllocationError::Conflict(ref msg) if msg != ORDER_ALREADY_ACCEPTED));

    let info = h.system.capacity.get_round_capacity_info(round_id).await.unwrap();
    assert_eq!(info.total_active_orders, 1);
    assert_eq!(info.volunteer_count, 0);
    assert_eq!(info.max_capacity, 0);
    assert_eq!(info.available_slots, -1);
    h.shutdown().await;
}

#[tokio::test]
async fn test_capacity_update_validation() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let volunteer = h.volunteer("Val").await;

    let err = h
        .system
        .capacity
        .update_capacity(round_id, -1, None, h.staff)
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::InvalidInput(_)));

    let err = h
        .system
        .capacity
        .update_capacity(round_id, 3, None, volunteer)
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::Unauthorized(_)));

    let defaults = h.system.capacity.get_or_create_config(round_id).await.unwrap();
    assert_eq!(defaults.max_orders_per_volunteer, 5);
    assert_eq!(defaults.override_capacity, None);

    let updated = h
        .system
        .capacity
        .update_capacity(round_id, 3, Some(12), h.staff)
        .await
        .unwrap();
    assert_eq!(updated.override_capacity, Some(12));
    let info = h.system.capacity.get_round_capacity_info(round_id).await.unwrap();
    assert_eq!(info.max_capacity, 12);
    h.shutdown().await;
}

#[tokio::test]
async fn test_cancel_assignment_releases_stock_until_reaccepted() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let item = h.item(10).await;
    let requester = Requester::guest("203.0.113.9");
    let order = h
        .system
        .intake
        .create_order(requester.clone(), line(item, 3))
        .await
        .unwrap();
    assert!(order.stock_reserved);
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 7);

    let volunteer = h.volunteer("Cy").await;
    let assignment = h.system.claims.accept_order(order.id, volunteer, round_id).await.unwrap();
    let cancelled = h.system.claims.cancel_assignment(assignment.id, volunteer).await.unwrap();
    assert_eq!(cancelled.status, AssignmentStatus::Cancelled);

    let stored = h.system.orders.fetch(order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert!(stored.holder().is_none());
    assert!(!stored.stock_reserved);
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 10);

    // Same volunteer can pick it back up, which takes the stock out again.
    let again = h.system.claims.accept_order(order.id, volunteer, round_id).await.unwrap();
    assert_eq!(again.id, assignment.id);
    assert_eq!(again.status, AssignmentStatus::Accepted);
    assert!(h.system.orders.fetch(order.id).await.unwrap().stock_reserved);
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 7);

    let err = h
        .system
        .intake
        .cancel_order(order.id, Requester::guest("203.0.113.10"))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::Unauthorized(_)));
    let withdrawn = h.system.intake.cancel_order(order.id, requester).await.unwrap();
    assert_eq!(withdrawn.status, OrderStatus::Cancelled);
    assert!(withdrawn.assignments.iter().all(|a| a.status == AssignmentStatus::Cancelled));
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 10);
    h.shutdown().await;
}

#[tokio::test]
async fn test_reaccept_after_cancel_fails_when_stock_went_elsewhere() {
    let h = Harness::start().await;
    let round_id = h.round(2, Duration::days(3), None).await;
    let item = h.item(1).await;
    let volunteer = h.volunteer("Ida").await;

    let first = h
        .system
        .intake
        .create_order(Requester::guest("203.0.113.30"), line(item, 1))
        .await
        .unwrap();
    let assignment = h.system.claims.accept_order(first.id, volunteer, round_id).await.unwrap();
    h.system.claims.cancel_assignment(assignment.id, volunteer).await.unwrap();
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 1);

    // The released unit goes to a competing order.
    h.system
        .intake
        .create_order(Requester::guest("203.0.113.31"), line(item, 1))
        .await
        .unwrap();
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 0);

    let err = h.system.claims.accept_order(first.id, volunteer, round_id).await.unwrap_err();
    assert!(matches!(err, AllocationError::Inventory(_)));

    let stored = h.system.orders.fetch(first.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert!(stored.holder().is_none());
    assert!(!stored.stock_reserved);
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 0);
    h.shutdown().await;
}

#[tokio::test]
async fn test_bound_order_cannot_be_claimed_under_another_round() {
    let h = Harness::start().await;
    let bound = h.round(2, Duration::days(2), Some(5)).await;
    let other = h.round(2, Duration::days(4), Some(5)).await;
    let item = h.item(10).await;
    let volunteer = h.volunteer("Rho").await;

    h.system.capacity.update_capacity(bound, 1, None, h.staff).await.unwrap();

    let first = h
        .system
        .intake
        .create_order(Requester::guest("192.0.2.60"), line(item, 1))
        .await
        .unwrap();
    let second = h
        .system
        .intake
        .create_order(Requester::guest("192.0.2.61"), line(item, 1))
        .await
        .unwrap();
    assert_eq!(first.round_id, Some(bound));
    assert_eq!(second.round_id, Some(bound));

    h.system.claims.accept_order(first.id, volunteer, bound).await.unwrap();

    // Naming a round with spare quota does not get around the bound round's quota.
    let err = h.system.claims.accept_order(second.id, volunteer, other).await.unwrap_err();
    assert!(matches!(err, AllocationError::InvalidInput(_)));
    let err = h.system.claims.accept_order(second.id, volunteer, bound).await.unwrap_err();
    assert!(matches!(err, AllocationError::Conflict(ref msg) if msg != ORDER_ALREADY_ACCEPTED));

    let stored = h.system.orders.fetch(second.id).await.unwrap();
    assert!(stored.holder().is_none());
    let info = h.system.capacity.get_round_capacity_info(bound).await.unwrap();
    assert_eq!(info.total_active_orders, 1);
    let info = h.system.capacity.get_round_capacity_info(other).await.unwrap();
    assert_eq!(info.total_active_orders, 0);
    h.shutdown().await;
}

#[tokio::test]
async fn test_order_with_too_little_stock_is_rejected() {
    let h = Harness::start().await;
    let item = h.item(2).await;

    let err = h
        .system
        .intake
        .create_order(Requester::guest("203.0.113.11"), line(item, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::Inventory(_)));
    assert_eq!(h.system.inventory.check_stock(item).await.unwrap(), 2);
    h.shutdown().await;
}
