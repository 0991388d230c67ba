//! Demo run of the allocation core: schedule a round, fill it by lottery, take an aid order
//! and deliver it.

use chrono::{Duration, Utc};
use outreach_allocator::clock::SystemClock;
use outreach_allocator::config::AllocatorConfig;
use outreach_allocator::lifecycle::{setup_tracing, OutreachSystem};
use outreach_allocator::model::{
    Capability, InventoryItemCreate, OrderLine, Requester, RoundCreate, UserCreate,
};
use outreach_allocator::notification::LoggingSink;
use outreach_allocator::AllocationError;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = AllocatorConfig::load().map_err(|e| e.to_string())?;
    info!(?config, "Starting outreach allocator demo");

    let system = OutreachSystem::start(config, Arc::new(SystemClock), Arc::new(LoggingSink));

    let staff_id = system
        .users
        .create_user(
            UserCreate::volunteer("Dana", "dana@example.org").with_capability(Capability::Staff),
        )
        .await
        .map_err(|e| e.to_string())?;

    let starts_at = Utc::now() + Duration::days(3);
    let round_id = system
        .scheduler
        .create_round(
            staff_id,
            RoundCreate {
                title: "Thursday night walk".to_string(),
                starts_at,
                ends_at: starts_at + Duration::hours(3),
                location: "Central library steps".to_string(),
                max_participants: 2,
                order_capacity: None,
            },
        )
        .await
        .map_err(|e| e.to_string())?;
    info!(%round_id, "Round scheduled");

    // Three volunteers compete for two seats.
    let span = tracing::info_span!("signups");
    let volunteers = async {
        let mut ids = Vec::new();
        for (name, email) in [
            ("Alex", "alex@example.org"),
            ("Sam", "sam@example.org"),
            ("Jo", "jo@example.org"),
        ] {
            let user_id = system
                .users
                .create_user(UserCreate::volunteer(name, email))
                .await
                .map_err(|e| e.to_string())?;
            system
                .signups
                .signup_for_round(round_id, user_id, None)
                .await
                .map_err(|e| e.to_string())?;
            ids.push(user_id);
        }
        Ok::<_, String>(ids)
    }
    .instrument(span)
    .await?;
    info!(count = volunteers.len(), "Volunteers waitlisted");

    let winners = system
        .lottery
        .run_lottery_for_round(round_id)
        .await
        .map_err(|e| e.to_string())?;
    for signup in &winners {
        info!(user_id = %signup.user_id, lottery_number = ?signup.lottery_number, "Lottery winner");
    }

    let item_id = system
        .inventory
        .create_item(InventoryItemCreate {
            name: "Wool socks".to_string(),
            size: Some("L".to_string()),
            quantity: 40,
        })
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("order_processing");
    let delivery = async {
        let order = system
            .intake
            .create_order(
                Requester::guest("203.0.113.7"),
                vec![OrderLine {
                    item_id,
                    quantity: 2,
                }],
            )
            .await?;
        let Some(bound_round) = order.round_id else {
            info!(order_id = %order.id, "Order is waiting for a round");
            return Ok(());
        };
        let Some(volunteer) = winners.first().map(|s| s.user_id) else {
            info!("Nobody won a seat, order stays pending");
            return Ok(());
        };

        let assignment = system
            .claims
            .accept_order(order.id, volunteer, bound_round)
            .await?;
        system.claims.start_order(assignment.id, volunteer).await?;
        system.claims.complete_order(assignment.id, volunteer).await?;
        Ok::<(), AllocationError>(())
    }
    .instrument(span)
    .await;

    match delivery {
        Ok(()) => info!("Order flow finished"),
        Err(e) => error!(error = %e, "Order flow failed"),
    }

    let stock = system
        .inventory
        .check_stock(item_id)
        .await
        .map_err(|e| e.to_string())?;
    let capacity = system
        .capacity
        .get_round_capacity_info(round_id)
        .await
        .map_err(|e| e.to_string())?;
    info!(stock, ?capacity, "Final state");

    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
