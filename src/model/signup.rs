use crate::model::{Capability, RoundId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifies a signup inside the round that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignupId {
    pub round: RoundId,
    pub seq: u32,
}

impl Display for SignupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/signup_{}", self.round, self.seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignupRole {
    #[default]
    Volunteer,
    TeamLead,
    Clinician,
}

impl SignupRole {
    /// The grant a user must hold to sign up in this role.
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            SignupRole::Volunteer => None,
            SignupRole::TeamLead => Some(Capability::TeamLead),
            SignupRole::Clinician => Some(Capability::Clinician),
        }
    }

    /// Single-seat roles are confirmed on signup and never go through the lottery.
    pub fn is_single_seat(self) -> bool {
        !matches!(self, SignupRole::Volunteer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignupStatus {
    Waitlisted,
    Confirmed,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signup {
    pub id: SignupId,
    pub user_id: UserId,
    pub role: SignupRole,
    pub status: SignupStatus,
    /// Drawn once when a volunteer is waitlisted and never re-drawn.
    pub lottery_number: Option<u32>,
    pub signup_time: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Signup {
    pub fn is_confirmed_as(&self, role: SignupRole) -> bool {
        self.status == SignupStatus::Confirmed && self.role == role
    }

    pub fn is_active(&self) -> bool {
        self.status != SignupStatus::Canceled
    }
}
