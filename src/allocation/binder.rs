use crate::clients::{OrderClient, RoundClient};
use crate::clock::Clock;
use crate::error::AllocationError;
use crate::model::{OrderId, Round, RoundId, RoundStatus};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Binds orders to the earliest round that still has order capacity.
///
/// Counting a round's bound orders and binding one more are two messages to the order actor,
/// so every bind goes through `bind_lock`. Without it two concurrent binds could both see the
/// last free slot.
#[derive(Clone)]
pub struct OrderRoundBinder {
    rounds: RoundClient,
    orders: OrderClient,
    bind_lock: Arc<Mutex<()>>,
    clock: Arc<dyn Clock>,
}

impl OrderRoundBinder {
    pub fn new(rounds: RoundClient, orders: OrderClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            rounds,
            orders,
            bind_lock: Arc::new(Mutex::new(())),
            clock,
        }
    }

    /// Binds the order to the first candidate whose bound-order count is below its
    /// `order_capacity`. `candidates` must be sorted by start time.
    ///
    /// `Ok(None)` means no round had room; the order stays unbound.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn assign_order_to_optimal_round(
        &self,
        order_id: OrderId,
        candidates: &[Round],
    ) -> Result<Option<RoundId>, AllocationError> {
        let _guard = self.bind_lock.lock().await;
        for round in candidates {
            let bound = self.orders.bound_count(round.id).await?;
            debug!(round_id = %round.id, bound, capacity = round.order_capacity, "Candidate");
            if bound < round.order_capacity as usize {
                self.orders.bind(order_id, round.id).await?;
                info!(%order_id, round_id = %round.id, "Order bound");
                return Ok(Some(round.id));
            }
        }
        info!(%order_id, "No round with free order capacity");
        Ok(None)
    }

    /// Unbinds every order from a canceled round and tries to place each one again in the
    /// remaining scheduled rounds. Returns how many found a new round.
    #[instrument(skip(self))]
    pub async fn handle_round_cancellation(
        &self,
        round_id: RoundId,
    ) -> Result<usize, AllocationError> {
        let bound = self.orders.bound_to(round_id).await?;
        for order in &bound {
            self.orders.unbind(order.id).await?;
        }

        let candidates: Vec<Round> = self
            .upcoming_rounds()
            .await?
            .into_iter()
            .filter(|r| r.id != round_id)
            .collect();

        let mut rebound = 0;
        for order in bound.iter().filter(|o| !o.status.is_terminal()) {
            match self.assign_order_to_optimal_round(order.id, &candidates).await {
                Ok(Some(_)) => rebound += 1,
                Ok(None) => {}
                Err(e) => warn!(order_id = %order.id, error = %e, "Rebinding failed"),
            }
        }
        info!(%round_id, unbound = bound.len(), rebound, "Round cancellation handled");
        Ok(rebound)
    }

    /// Called after a confirmed volunteer leaves a round. Bound orders are left where they
    /// are; this only records that the round lost capacity.
    #[instrument(skip(self))]
    pub async fn handle_volunteer_cancellation(&self, round_id: RoundId) {
        info!(%round_id, "Volunteer left round, bound orders unchanged");
    }

    /// Tries to bind every pending, unbound order. Returns how many were bound.
    #[instrument(skip(self))]
    pub async fn assign_unassigned_orders(&self) -> Result<usize, AllocationError> {
        let pending = self.orders.unbound_pending().await?;
        if pending.is_empty() {
            return Ok(0);
        }
        let candidates = self.upcoming_rounds().await?;
        let mut assigned = 0;
        for order in &pending {
            if self
                .assign_order_to_optimal_round(order.id, &candidates)
                .await?
                .is_some()
            {
                assigned += 1;
            }
        }
        info!(pending = pending.len(), assigned, "Unassigned orders swept");
        Ok(assigned)
    }

    /// Scheduled rounds that have not started, earliest first.
    pub async fn upcoming_rounds(&self) -> Result<Vec<Round>, AllocationError> {
        self.rounds
            .starting_after(self.clock.now(), RoundStatus::Scheduled)
            .await
    }
}
