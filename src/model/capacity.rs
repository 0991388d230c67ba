use crate::model::{RoundId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-round order quota policy. Owned by its [`Round`](crate::model::Round).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub round_id: RoundId,
    pub max_orders_per_volunteer: u32,
    /// Absolute ceiling that replaces `volunteer_count * max_orders_per_volunteer`.
    pub override_capacity: Option<u32>,
    pub last_modified_by: Option<UserId>,
    pub updated_at: DateTime<Utc>,
}

impl CapacityConfig {
    pub fn with_defaults(
        round_id: RoundId,
        max_orders_per_volunteer: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            round_id,
            max_orders_per_volunteer,
            override_capacity: None,
            last_modified_by: None,
            updated_at: now,
        }
    }

    pub fn max_capacity(&self, volunteer_count: u32) -> u32 {
        self.override_capacity
            .unwrap_or(volunteer_count.saturating_mul(self.max_orders_per_volunteer))
    }
}

/// Snapshot of a round's order capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundCapacityInfo {
    pub round_id: RoundId,
    pub volunteer_count: u32,
    pub total_active_orders: u32,
    pub max_capacity: u32,
    /// Negative when an override was lowered below the active load.
    pub available_slots: i64,
}
