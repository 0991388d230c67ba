//! Custom actions for the Order actor.

use crate::model::{Order, OrderAssignment, Requester, RoundId, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Claims the order for a volunteer. Idempotent for the current holder.
    Accept {
        volunteer_id: UserId,
        round_id: RoundId,
        now: DateTime<Utc>,
    },
    Start { seq: u32, volunteer_id: UserId },
    Complete {
        seq: u32,
        volunteer_id: UserId,
        now: DateTime<Utc>,
    },
    /// Drops the claim and returns the order to the pending pool.
    CancelAssignment { seq: u32, volunteer_id: UserId },
    Bind { round_id: RoundId },
    Unbind,
    /// Withdraws the order. `requester: None` is a staff cancellation.
    Cancel { requester: Option<Requester> },
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Accept(OrderAssignment),
    Start(OrderAssignment),
    Complete(OrderAssignment),
    CancelAssignment(OrderAssignment),
    Bind,
    /// The round the order was bound to, if any.
    Unbind(Option<RoundId>),
    Cancel(Order),
}
