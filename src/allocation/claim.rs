use super::CapacityPolicy;
use crate::clients::OrderClient;
use crate::clock::Clock;
use crate::error::AllocationError;
use crate::model::{AssignmentId, OrderAssignment, OrderId, RoundId, UserId};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

type QuotaLocks = DashMap<(RoundId, UserId), Arc<Mutex<()>>>;

/// The volunteer side of orders: accept, start, complete, cancel.
///
/// Claim exclusivity per order is enforced by the order actor. The per-volunteer quota spans
/// many orders, so its check-then-accept runs under a lock keyed by `(round, volunteer)`.
#[derive(Clone)]
pub struct OrderClaimEngine {
    orders: OrderClient,
    capacity: CapacityPolicy,
    quota_locks: Arc<QuotaLocks>,
    clock: Arc<dyn Clock>,
}

impl OrderClaimEngine {
    pub fn new(orders: OrderClient, capacity: CapacityPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders,
            capacity,
            quota_locks: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Claims an order for a volunteer.
    ///
    /// Calling again as the current holder returns the existing assignment. A different
    /// holder yields `Conflict(ORDER_ALREADY_ACCEPTED)`. A volunteer at their round quota gets
    /// `Conflict` as well. An order bound to a round is only claimable for that round.
    #[instrument(skip(self))]
    pub async fn accept_order(
        &self,
        order_id: OrderId,
        volunteer_id: UserId,
        round_id: RoundId,
    ) -> Result<OrderAssignment, AllocationError> {
        let key = (round_id, volunteer_id);
        let lock = self.quota_locks.entry(key).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            self.accept_within_quota(order_id, volunteer_id, round_id).await
        };
        drop(lock);
        // Nobody else holds or waits on the lock once only the map's copy is left.
        self.quota_locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn accept_within_quota(
        &self,
        order_id: OrderId,
        volunteer_id: UserId,
        round_id: RoundId,
    ) -> Result<OrderAssignment, AllocationError> {
        let order = self.orders.fetch(order_id).await?;
        let already_holding = order
            .holder()
            .is_some_and(|a| a.volunteer_id == volunteer_id);
        if !already_holding {
            order.check_claim_round(round_id)?;
            if !self
                .capacity
                .can_volunteer_accept_more(round_id, volunteer_id)
                .await?
            {
                return Err(AllocationError::Conflict(format!(
                    "{} has reached the order limit for {}",
                    volunteer_id, round_id
                )));
            }
        }

        let assignment = self
            .orders
            .accept(order_id, volunteer_id, round_id, self.clock.now())
            .await?;
        info!(assignment_id = %assignment.id, "Order claimed");
        Ok(assignment)
    }

    #[instrument(skip(self))]
    pub async fn start_order(
        &self,
        assignment_id: AssignmentId,
        volunteer_id: UserId,
    ) -> Result<OrderAssignment, AllocationError> {
        self.orders.start(assignment_id, volunteer_id).await
    }

    #[instrument(skip(self))]
    pub async fn complete_order(
        &self,
        assignment_id: AssignmentId,
        volunteer_id: UserId,
    ) -> Result<OrderAssignment, AllocationError> {
        let assignment = self
            .orders
            .complete(assignment_id, volunteer_id, self.clock.now())
            .await?;
        info!(%assignment_id, "Order delivered");
        Ok(assignment)
    }

    /// Drops the claim. The order goes back to pending and its stock is released; a failed
    /// release is logged by the order actor and does not fail the cancellation. The next
    /// accept reserves the stock again.
    #[instrument(skip(self))]
    pub async fn cancel_assignment(
        &self,
        assignment_id: AssignmentId,
        volunteer_id: UserId,
    ) -> Result<OrderAssignment, AllocationError> {
        let assignment = self
            .orders
            .cancel_assignment(assignment_id, volunteer_id)
            .await?;
        info!(%assignment_id, "Claim cancelled");
        Ok(assignment)
    }
}
