//! Custom actions for the Round actor.
//!
//! Every action that depends on time carries `now`; the actor never reads a clock.

use crate::model::{CapacityConfig, Signup, SignupRole, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum RoundAction {
    /// Adds a signup. Volunteers are waitlisted with `lottery_number`; team leads and
    /// clinicians are confirmed if their seat is free.
    Signup {
        user_id: UserId,
        role: SignupRole,
        lottery_number: u32,
        now: DateTime<Utc>,
    },
    /// Removes a signup. `caller: None` is a staff removal that skips the ownership check and
    /// the cancellation floor.
    CancelSignup {
        seq: u32,
        caller: Option<UserId>,
        now: DateTime<Utc>,
    },
    ConfirmManually { seq: u32, now: DateTime<Utc> },
    RunLottery { now: DateTime<Utc> },
    Cancel { now: DateTime<Utc> },
    Complete,
    GetOrCreateCapacity {
        default_max_orders_per_volunteer: u32,
        now: DateTime<Utc>,
    },
    UpdateCapacity {
        max_orders_per_volunteer: u32,
        override_capacity: Option<u32>,
        admin_id: UserId,
        default_max_orders_per_volunteer: u32,
        now: DateTime<Utc>,
    },
}

/// Results from RoundActions - variants match 1:1 with RoundAction
#[derive(Debug, Clone)]
pub enum RoundActionResult {
    Signup(Signup),
    /// The removed signup as it was before removal.
    CancelSignup(Signup),
    ConfirmManually(Signup),
    /// Newly confirmed signups in promotion order.
    RunLottery(Vec<Signup>),
    /// Signups that were active when the round was canceled.
    Cancel(Vec<Signup>),
    Complete,
    GetOrCreateCapacity(CapacityConfig),
    UpdateCapacity(CapacityConfig),
}
