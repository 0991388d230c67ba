use crate::model::{OrderId, RoundId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifies an assignment inside the order that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentId {
    pub order: OrderId,
    pub seq: u32,
}

impl Display for AssignmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/assignment_{}", self.order, self.seq)
    }
}

/// Claim lifecycle: `Accepted -> InProgress -> Completed`, with `Cancelled` reachable from
/// either active state. A cancelled assignment can be reactivated by the same volunteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    /// Accepted or in progress. These count against a volunteer's quota.
    pub fn is_active(self) -> bool {
        matches!(self, AssignmentStatus::Accepted | AssignmentStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub id: AssignmentId,
    pub volunteer_id: UserId,
    pub round_id: RoundId,
    pub status: AssignmentStatus,
    pub accepted_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
