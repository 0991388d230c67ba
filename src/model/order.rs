use crate::error::AllocationError;
use crate::model::{AssignmentStatus, ItemId, OrderAssignment, RoundId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_id!(Order, "order");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Who submitted an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Requester {
    User(UserId),
    Guest { ip: String },
}

impl Requester {
    pub fn guest(ip: impl Into<String>) -> Self {
        Requester::Guest { ip: ip.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// An aid request and the volunteer assignments made against it.
///
/// Implements [`ActorEntity`](crate::framework::ActorEntity) in [`crate::order_actor::entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    /// `None` until the order is bound to a round.
    pub round_id: Option<RoundId>,
    pub requester: Requester,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub fulfilled_by: Option<UserId>,
    /// Whether the lines are currently held in inventory. Cleared on release so stock is
    /// never returned twice.
    pub stock_reserved: bool,
    /// Indexed by `AssignmentId::seq - 1`.
    pub assignments: Vec<OrderAssignment>,
}

#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub requester: Requester,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The assignment that currently holds the order, if any.
    pub fn holder(&self) -> Option<&OrderAssignment> {
        self.assignments
            .iter()
            .find(|a| a.status != AssignmentStatus::Cancelled)
    }

    /// Active assignments (accepted or in progress) that `volunteer` holds in `round`.
    pub fn active_assignments_for(&self, round: RoundId, volunteer: UserId) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.round_id == round && a.volunteer_id == volunteer && a.status.is_active())
            .count()
    }

    pub fn active_assignments_in(&self, round: RoundId) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.round_id == round && a.status.is_active())
            .count()
    }

    pub fn is_unbound_pending(&self) -> bool {
        self.status == OrderStatus::Pending && self.round_id.is_none()
    }

    /// A bound order can only be claimed for the round it is bound to. Unbound orders take
    /// the caller's round.
    pub fn check_claim_round(&self, round_id: RoundId) -> Result<(), AllocationError> {
        match self.round_id {
            Some(bound) if bound != round_id => Err(AllocationError::InvalidInput(format!(
                "{} is bound to {}, not {}",
                self.id, bound, round_id
            ))),
            _ => Ok(()),
        }
    }
}
