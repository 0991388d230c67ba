use super::{OrderRoundBinder, RateLimiter};
use crate::clients::OrderClient;
use crate::clock::Clock;
use crate::error::AllocationError;
use crate::model::{Order, OrderCreate, OrderId, OrderLine, RateLimitKey, Requester};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Order submission: rate limit, create (which reserves stock), record, then try to bind.
///
/// Binding is best effort. An order that cannot be placed in a round yet is still a valid
/// order and is picked up by the maintenance sweep later.
#[derive(Clone)]
pub struct OrderIntake {
    rate_limiter: RateLimiter,
    orders: OrderClient,
    binder: OrderRoundBinder,
    clock: Arc<dyn Clock>,
}

impl OrderIntake {
    pub fn new(
        rate_limiter: RateLimiter,
        orders: OrderClient,
        binder: OrderRoundBinder,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rate_limiter,
            orders,
            binder,
            clock,
        }
    }

    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn create_order(
        &self,
        requester: Requester,
        lines: Vec<OrderLine>,
    ) -> Result<Order, AllocationError> {
        self.rate_limiter.check_requester(&requester).await?;

        let key = RateLimitKey::from(&requester);
        let order_id = self
            .orders
            .create_order(OrderCreate {
                requester,
                lines,
                created_at: self.clock.now(),
            })
            .await?;
        self.rate_limiter.record_order_creation(key, order_id);

        self.try_bind(order_id).await;
        let order = self.orders.fetch(order_id).await?;
        info!(%order_id, round_id = ?order.round_id, "Order created");
        Ok(order)
    }

    /// Withdraws an order on behalf of the requester who submitted it.
    #[instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        requester: Requester,
    ) -> Result<Order, AllocationError> {
        self.orders.cancel(order_id, Some(requester)).await
    }

    async fn try_bind(&self, order_id: OrderId) {
        let candidates = match self.binder.upcoming_rounds().await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(%order_id, error = %e, "Could not list rounds for binding");
                return;
            }
        };
        if let Err(e) = self
            .binder
            .assign_order_to_optimal_round(order_id, &candidates)
            .await
        {
            warn!(%order_id, error = %e, "Binding failed, order left unbound");
        }
    }
}
