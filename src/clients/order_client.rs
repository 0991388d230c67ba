//! # Order Client
//!
//! High-level API for the `Order` actor: creation, the claim state machine, round binding,
//! and the order-side derived queries (bound counts, pending counts, active assignments).

use crate::error::AllocationError;
use crate::framework::{ActorClient, Filter, FrameworkError, ResourceClient};
use crate::model::{
    AssignmentId, Order, OrderAssignment, OrderCreate, OrderId, OrderStatus, RateLimitKey,
    Requester, RoundId, UserId,
};
use crate::order_actor::{OrderAction, OrderActionResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
///
/// Stock reservation happens in the Order actor's `on_create` hook.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = AllocationError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        AllocationError::from_framework(e)
    }
}

impl OrderClient {
    async fn act(
        &self,
        id: OrderId,
        action: OrderAction,
    ) -> Result<OrderActionResult, AllocationError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, params))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, AllocationError> {
        debug!(?params, "create_order called");
        info!("Sending create_order to actor");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    pub async fn fetch(&self, id: OrderId) -> Result<Order, AllocationError> {
        self.get(id)
            .await?
            .ok_or_else(|| AllocationError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn accept(
        &self,
        id: OrderId,
        volunteer_id: UserId,
        round_id: RoundId,
        now: DateTime<Utc>,
    ) -> Result<OrderAssignment, AllocationError> {
        match self
            .act(
                id,
                OrderAction::Accept {
                    volunteer_id,
                    round_id,
                    now,
                },
            )
            .await?
        {
            OrderActionResult::Accept(assignment) => Ok(assignment),
            _ => unreachable!("Accept action must return Accept result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn start(
        &self,
        assignment_id: AssignmentId,
        volunteer_id: UserId,
    ) -> Result<OrderAssignment, AllocationError> {
        match self
            .act(
                assignment_id.order,
                OrderAction::Start {
                    seq: assignment_id.seq,
                    volunteer_id,
                },
            )
            .await?
        {
            OrderActionResult::Start(assignment) => Ok(assignment),
            _ => unreachable!("Start action must return Start result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        assignment_id: AssignmentId,
        volunteer_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<OrderAssignment, AllocationError> {
        match self
            .act(
                assignment_id.order,
                OrderAction::Complete {
                    seq: assignment_id.seq,
                    volunteer_id,
                    now,
                },
            )
            .await?
        {
            OrderActionResult::Complete(assignment) => Ok(assignment),
            _ => unreachable!("Complete action must return Complete result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel_assignment(
        &self,
        assignment_id: AssignmentId,
        volunteer_id: UserId,
    ) -> Result<OrderAssignment, AllocationError> {
        match self
            .act(
                assignment_id.order,
                OrderAction::CancelAssignment {
                    seq: assignment_id.seq,
                    volunteer_id,
                },
            )
            .await?
        {
            OrderActionResult::CancelAssignment(assignment) => Ok(assignment),
            _ => unreachable!("CancelAssignment action must return CancelAssignment result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn bind(&self, id: OrderId, round_id: RoundId) -> Result<(), AllocationError> {
        match self.act(id, OrderAction::Bind { round_id }).await? {
            OrderActionResult::Bind => Ok(()),
            _ => unreachable!("Bind action must return Bind result"),
        }
    }

    /// Clears the binding. Returns the round it was bound to.
    #[instrument(skip(self))]
    pub async fn unbind(&self, id: OrderId) -> Result<Option<RoundId>, AllocationError> {
        match self.act(id, OrderAction::Unbind).await? {
            OrderActionResult::Unbind(previous) => Ok(previous),
            _ => unreachable!("Unbind action must return Unbind result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        id: OrderId,
        requester: Option<Requester>,
    ) -> Result<Order, AllocationError> {
        match self.act(id, OrderAction::Cancel { requester }).await? {
            OrderActionResult::Cancel(order) => Ok(order),
            _ => unreachable!("Cancel action must return Cancel result"),
        }
    }

    /// Non-cancelled orders bound to `round_id`, oldest first.
    pub async fn bound_to(&self, round_id: RoundId) -> Result<Vec<Order>, AllocationError> {
        let mut orders = self
            .query(Filter::new(move |o: &Order| {
                o.round_id == Some(round_id) && o.status != OrderStatus::Cancelled
            }))
            .await?;
        orders.sort_by_key(|o| (o.created_at, o.id));
        Ok(orders)
    }

    pub async fn bound_count(&self, round_id: RoundId) -> Result<usize, AllocationError> {
        Ok(self.bound_to(round_id).await?.len())
    }

    /// Pending orders with no round, oldest first.
    pub async fn unbound_pending(&self) -> Result<Vec<Order>, AllocationError> {
        let mut orders = self.query(Filter::new(Order::is_unbound_pending)).await?;
        orders.sort_by_key(|o| (o.created_at, o.id));
        Ok(orders)
    }

    /// Pending orders submitted under a rate-limit identity.
    pub async fn pending_count_for(&self, key: &RateLimitKey) -> Result<usize, AllocationError> {
        let key = key.clone();
        let pending = self
            .query(Filter::new(move |o: &Order| {
                o.status == OrderStatus::Pending && RateLimitKey::from(&o.requester) == key
            }))
            .await?;
        Ok(pending.len())
    }

    /// Accepted or in-progress assignments `volunteer_id` holds in `round_id`.
    pub async fn active_assignment_count(
        &self,
        round_id: RoundId,
        volunteer_id: UserId,
    ) -> Result<usize, AllocationError> {
        let orders = self
            .query(Filter::new(move |o: &Order| {
                o.active_assignments_for(round_id, volunteer_id) > 0
            }))
            .await?;
        Ok(orders
            .iter()
            .map(|o| o.active_assignments_for(round_id, volunteer_id))
            .sum())
    }

    /// Accepted or in-progress assignments across all volunteers in `round_id`.
    pub async fn active_order_count(&self, round_id: RoundId) -> Result<usize, AllocationError> {
        let orders = self
            .query(Filter::new(move |o: &Order| o.active_assignments_in(round_id) > 0))
            .await?;
        Ok(orders.iter().map(|o| o.active_assignments_in(round_id)).sum())
    }
}
