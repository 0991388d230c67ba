//! ActorEntity trait implementation for the Order domain type.
//!
//! # Claim state machine
//!
//! ```text
//! (none) --accept--> Accepted --start--> InProgress --complete--> Completed
//!                        \                   /
//!                         `----cancel-------'--> Cancelled --accept (same volunteer)--> Accepted
//! ```
//!
//! The order's own status follows its holder: Pending while unclaimed, Accepted, Processing
//! while in progress, Completed on delivery.
//!
//! Cancelling a claim returns the order's stock to inventory, and the next accept reserves it
//! again. A bound order can only be claimed for its own round.

use super::actions::{OrderAction, OrderActionResult};
use crate::collaborators::InventoryReservations;
use crate::error::{AllocationError, ORDER_ALREADY_ACCEPTED};
use crate::framework::ActorEntity;
use crate::model::{
    AssignmentId, AssignmentStatus, Order, OrderAssignment, OrderCreate, OrderId, OrderStatus,
    Requester, RoundId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = Arc<dyn InventoryReservations>;
    type Error = AllocationError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, AllocationError> {
        if params.lines.is_empty() {
            return Err(AllocationError::InvalidInput(
                "an order needs at least one line".into(),
            ));
        }
        if let Some(line) = params.lines.iter().find(|l| l.quantity == 0) {
            return Err(AllocationError::InvalidInput(format!(
                "quantity for {} must be positive",
                line.item_id
            )));
        }
        if let Requester::Guest { ip } = &params.requester {
            if ip.trim().is_empty() {
                return Err(AllocationError::InvalidInput("guest orders need an IP".into()));
            }
        }
        Ok(Self {
            id,
            status: OrderStatus::Pending,
            round_id: None,
            requester: params.requester,
            lines: params.lines,
            created_at: params.created_at,
            delivery_time: None,
            fulfilled_by: None,
            stock_reserved: false,
            assignments: Vec::new(),
        })
    }

    /// Reserves every line. If one fails, the order is not stored.
    async fn on_create(&mut self, ctx: &Self::Context) -> Result<(), AllocationError> {
        self.reserve_stock(ctx).await
    }

    async fn on_update(
        &mut self,
        _update: (),
        _ctx: &Self::Context,
    ) -> Result<(), AllocationError> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &Self::Context,
    ) -> Result<OrderActionResult, AllocationError> {
        match action {
            OrderAction::Accept {
                volunteer_id,
                round_id,
                now,
            } => self
                .accept(volunteer_id, round_id, now, ctx)
                .await
                .map(OrderActionResult::Accept),
            OrderAction::Start { seq, volunteer_id } => {
                let assignment = self.owned_assignment(seq, volunteer_id)?;
                if assignment.status != AssignmentStatus::Accepted {
                    return Err(invalid_transition(assignment, "start"));
                }
                assignment.status = AssignmentStatus::InProgress;
                let started = assignment.clone();
                self.status = OrderStatus::Processing;
                Ok(OrderActionResult::Start(started))
            }
            OrderAction::Complete {
                seq,
                volunteer_id,
                now,
            } => {
                let assignment = self.owned_assignment(seq, volunteer_id)?;
                if assignment.status != AssignmentStatus::InProgress {
                    return Err(invalid_transition(assignment, "complete"));
                }
                assignment.status = AssignmentStatus::Completed;
                assignment.completed_at = Some(now);
                let completed = assignment.clone();
                self.status = OrderStatus::Completed;
                self.delivery_time = Some(now);
                self.fulfilled_by = Some(volunteer_id);
                Ok(OrderActionResult::Complete(completed))
            }
            OrderAction::CancelAssignment { seq, volunteer_id } => {
                let assignment = self.owned_assignment(seq, volunteer_id)?;
                if !assignment.status.is_active() {
                    return Err(invalid_transition(assignment, "cancel"));
                }
                assignment.status = AssignmentStatus::Cancelled;
                let cancelled = assignment.clone();
                self.status = OrderStatus::Pending;
                self.release_stock(ctx).await;
                Ok(OrderActionResult::CancelAssignment(cancelled))
            }
            OrderAction::Bind { round_id } => {
                if self.status.is_terminal() {
                    return Err(AllocationError::InvalidState(format!(
                        "{} is {:?}",
                        self.id, self.status
                    )));
                }
                self.round_id = Some(round_id);
                Ok(OrderActionResult::Bind)
            }
            OrderAction::Unbind => Ok(OrderActionResult::Unbind(self.round_id.take())),
            OrderAction::Cancel { requester } => {
                if let Some(requester) = requester {
                    if requester != self.requester {
                        return Err(AllocationError::Unauthorized(format!(
                            "{} was not submitted by this requester",
                            self.id
                        )));
                    }
                }
                if self.status.is_terminal() {
                    return Err(AllocationError::InvalidState(format!(
                        "{} is already {:?}",
                        self.id, self.status
                    )));
                }
                for assignment in self.assignments.iter_mut().filter(|a| a.status.is_active()) {
                    assignment.status = AssignmentStatus::Cancelled;
                }
                self.status = OrderStatus::Cancelled;
                self.release_stock(ctx).await;
                Ok(OrderActionResult::Cancel(self.clone()))
            }
        }
    }
}

fn invalid_transition(assignment: &OrderAssignment, verb: &str) -> AllocationError {
    AllocationError::InvalidState(format!(
        "cannot {} {} while it is {:?}",
        verb, assignment.id, assignment.status
    ))
}

impl Order {
    /// Claims the order. An order whose stock went back to inventory when its last claim was
    /// cancelled reserves it again here, and the claim fails if the stock is gone.
    async fn accept(
        &mut self,
        volunteer_id: UserId,
        round_id: RoundId,
        now: DateTime<Utc>,
        ctx: &Arc<dyn InventoryReservations>,
    ) -> Result<OrderAssignment, AllocationError> {
        if self.status.is_terminal() {
            return Err(AllocationError::InvalidState(format!(
                "{} is already {:?}",
                self.id, self.status
            )));
        }

        if let Some(holder) = self.holder() {
            if holder.volunteer_id != volunteer_id {
                return Err(AllocationError::Conflict(ORDER_ALREADY_ACCEPTED.to_string()));
            }
            let held = holder.clone();
            if self.status == OrderStatus::Pending {
                self.status = OrderStatus::Accepted;
            }
            return Ok(held);
        }

        self.check_claim_round(round_id)?;
        if !self.stock_reserved {
            self.reserve_stock(ctx).await?;
        }

        let assignment = match self
            .assignments
            .iter_mut()
            .find(|a| a.volunteer_id == volunteer_id)
        {
            Some(previous) => {
                previous.status = AssignmentStatus::Accepted;
                previous.round_id = round_id;
                previous.accepted_at = now;
                previous.completed_at = None;
                previous.clone()
            }
            None => {
                let assignment = OrderAssignment {
                    id: AssignmentId {
                        order: self.id,
                        seq: self.assignments.len() as u32 + 1,
                    },
                    volunteer_id,
                    round_id,
                    status: AssignmentStatus::Accepted,
                    accepted_at: now,
                    completed_at: None,
                };
                self.assignments.push(assignment.clone());
                assignment
            }
        };
        self.status = OrderStatus::Accepted;
        info!(order_id = %self.id, assignment_id = %assignment.id, volunteer_id = %volunteer_id, "Order accepted");
        Ok(assignment)
    }

    fn owned_assignment(
        &mut self,
        seq: u32,
        volunteer_id: UserId,
    ) -> Result<&mut OrderAssignment, AllocationError> {
        let id = AssignmentId { order: self.id, seq };
        let assignment = seq
            .checked_sub(1)
            .and_then(|index| self.assignments.get_mut(index as usize))
            .ok_or_else(|| AllocationError::NotFound(id.to_string()))?;
        if assignment.volunteer_id != volunteer_id {
            return Err(AllocationError::Unauthorized(format!(
                "{} belongs to another volunteer",
                id
            )));
        }
        Ok(assignment)
    }

    /// Best effort: a failed release is logged and the order keeps going.
    /// Reserves every line, releasing the earlier lines again if a later one fails.
    async fn reserve_stock(
        &mut self,
        ctx: &Arc<dyn InventoryReservations>,
    ) -> Result<(), AllocationError> {
        for (index, line) in self.lines.iter().enumerate() {
            if let Err(e) = ctx.reserve(line.item_id, line.quantity).await {
                warn!(order_id = %self.id, item_id = %line.item_id, error = %e, "Reservation failed, rolling back");
                for earlier in &self.lines[..index] {
                    if let Err(e) = ctx.release(earlier.item_id, earlier.quantity).await {
                        warn!(item_id = %earlier.item_id, error = %e, "Rollback release failed");
                    }
                }
                return Err(AllocationError::Inventory(e));
            }
        }
        self.stock_reserved = true;
        Ok(())
    }

    async fn release_stock(&mut self, ctx: &Arc<dyn InventoryReservations>) {
        if !self.stock_reserved {
            return;
        }
        for line in &self.lines {
            if let Err(e) = ctx.release(line.item_id, line.quantity).await {
                warn!(order_id = %self.id, item_id = %line.item_id, error = %e, "Inventory release failed");
            }
        }
        self.stock_reserved = false;
    }
}
