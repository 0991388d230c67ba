mod common;

use chrono::Duration;
use common::{line, Harness};
use outreach_allocator::config::AllocatorConfig;
use outreach_allocator::lifecycle::SweepReport;
use outreach_allocator::model::{OrderStatus, Requester};
use outreach_allocator::AllocationError;

#[tokio::test]
async fn test_guest_window_limit_and_recovery() {
    let h = Harness::start().await;
    let item = h.item(50).await;
    let guest = Requester::guest("203.0.113.20");

    for _ in 0..2 {
        h.system
            .intake
            .create_order(guest.clone(), line(item, 1))
            .await
            .expect("Order within limit failed");
    }
    let err = h
        .system
        .intake
        .create_order(guest.clone(), line(item, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::RateLimitExceeded(_)));

    // Another guest is counted separately.
    h.system
        .intake
        .create_order(Requester::guest("203.0.113.21"), line(item, 1))
        .await
        .unwrap();

    // The window rolls forward; two orders are still pending, below the pending cap of three.
    h.clock.advance(Duration::hours(1));
    h.system
        .intake
        .create_order(guest.clone(), line(item, 1))
        .await
        .expect("Order after the window failed");

    // Now three are pending: the pending cap applies even with an empty window.
    h.clock.advance(Duration::hours(2));
    let err = h
        .system
        .intake
        .create_order(guest, line(item, 1))
        .await
        .unwrap_err();
    match err {
        AllocationError::RateLimitExceeded(msg) => assert!(msg.contains("pending"), "{}", msg),
        other => panic!("Expected RateLimitExceeded, got {:?}", other),
    }
    h.shutdown().await;
}

#[tokio::test]
async fn test_user_window_limit() {
    let h = Harness::start().await;
    let item = h.item(50).await;
    let user = h.volunteer("Una").await;

    for _ in 0..3 {
        h.system
            .intake
            .create_order(Requester::User(user), line(item, 1))
            .await
            .unwrap();
    }
    let err = h
        .system
        .intake
        .create_order(Requester::User(user), line(item, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::RateLimitExceeded(_)));
    assert!(h.system.rate_limiter.check_user_rate_limit(user).await.is_err());
    h.shutdown().await;
}

#[tokio::test]
async fn test_blank_guest_ip_is_invalid() {
    let h = Harness::start().await;
    let err = h
        .system
        .rate_limiter
        .check_guest_rate_limit("   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::InvalidInput(_)));
    h.shutdown().await;
}

#[tokio::test]
async fn test_orders_fill_earliest_round_first() {
    let h = Harness::start().await;
    let later = h.round(2, Duration::days(5), Some(5)).await;
    let earlier = h.round(2, Duration::days(2), Some(1)).await;
    let item = h.item(50).await;

    let first = h
        .system
        .intake
        .create_order(Requester::guest("198.51.100.30"), line(item, 1))
        .await
        .unwrap();
    let second = h
        .system
        .intake
        .create_order(Requester::guest("198.51.100.31"), line(item, 1))
        .await
        .unwrap();
    assert_eq!(first.round_id, Some(earlier));
    assert_eq!(second.round_id, Some(later));

    assert_eq!(h.system.orders.bound_count(earlier).await.unwrap(), 1);
    assert_eq!(h.system.orders.bound_count(later).await.unwrap(), 1);
    h.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_binding_never_overfills_a_round() {
    let h = Harness::start().await;
    let small = h.round(2, Duration::days(2), Some(2)).await;
    let item = h.item(50).await;

    let mut tasks = Vec::new();
    for i in 0..5 {
        let intake = h.system.intake.clone();
        tasks.push(tokio::spawn(async move {
            intake
                .create_order(Requester::guest(format!("192.0.2.{}", 40 + i)), line(item, 1))
                .await
        }));
    }
    let mut unbound = 0;
    for task in tasks {
        let order = task.await.unwrap().unwrap();
        if order.round_id.is_none() {
            unbound += 1;
        }
    }
    assert_eq!(h.system.orders.bound_count(small).await.unwrap(), 2);
    assert_eq!(unbound, 3);
    h.shutdown().await;
}

#[tokio::test]
async fn test_round_cancellation_rebinds_orders() {
    let h = Harness::start().await;
    let doomed = h.round(2, Duration::days(2), Some(5)).await;
    let backup = h.round(2, Duration::days(4), Some(1)).await;
    let item = h.item(50).await;

    let a = h
        .system
        .intake
        .create_order(Requester::guest("198.51.100.50"), line(item, 1))
        .await
        .unwrap();
    let b = h
        .system
        .intake
        .create_order(Requester::guest("198.51.100.51"), line(item, 1))
        .await
        .unwrap();
    assert_eq!(a.round_id, Some(doomed));
    assert_eq!(b.round_id, Some(doomed));

    h.system.scheduler.cancel_round(h.staff, doomed).await.unwrap();

    // Only one fits in the backup round; the other waits for the sweep.
    let a = h.system.orders.fetch(a.id).await.unwrap();
    let b = h.system.orders.fetch(b.id).await.unwrap();
    assert_eq!(a.round_id, Some(backup));
    assert_eq!(b.round_id, None);
    assert_eq!(b.status, OrderStatus::Pending);
    assert_eq!(h.system.orders.bound_count(doomed).await.unwrap(), 0);
    h.shutdown().await;
}

#[tokio::test]
async fn test_maintenance_binds_waiting_orders_and_expires_records() {
    let h = Harness::start().await;
    let item = h.item(50).await;

    let order = h
        .system
        .intake
        .create_order(Requester::guest("198.51.100.60"), line(item, 1))
        .await
        .unwrap();
    assert_eq!(order.round_id, None);

    // Nothing to bind to yet, nothing old enough to expire.
    assert_eq!(h.system.run_maintenance_once().await, SweepReport::default());

    h.clock.advance(Duration::days(4));
    let round_id = h.round(2, Duration::days(1), None).await;

    let report = h.system.run_maintenance_once().await;
    assert_eq!(
        report,
        SweepReport {
            expired_records: 1,
            orders_bound: 1,
        }
    );
    let order = h.system.orders.fetch(order.id).await.unwrap();
    assert_eq!(order.round_id, Some(round_id));
    h.shutdown().await;
}

#[tokio::test]
async fn test_configured_limits_are_used() {
    let mut config = AllocatorConfig::default();
    config.rate_limit.guest_orders_per_window = 1;
    let h = Harness::with_config(config).await;
    let item = h.item(50).await;
    let guest = Requester::guest("203.0.113.70");

    h.system.intake.create_order(guest.clone(), line(item, 1)).await.unwrap();
    let err = h.system.intake.create_order(guest, line(item, 1)).await.unwrap_err();
    assert!(matches!(err, AllocationError::RateLimitExceeded(_)));
    h.shutdown().await;
}
