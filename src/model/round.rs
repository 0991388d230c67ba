use crate::model::{CapacityConfig, Signup, SignupRole, SignupStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

entity_id!(Round, "round");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundStatus {
    Scheduled,
    Canceled,
    Completed,
}

/// A scheduled outreach event.
///
/// The round is the aggregate root for its signups and its capacity config; both are only
/// reachable through it. Implements [`ActorEntity`](crate::framework::ActorEntity) in
/// [`crate::round_actor::entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub id: RoundId,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: String,
    pub status: RoundStatus,
    /// Regular-volunteer seats. Team lead and clinician seats are not counted here.
    pub max_participants: u32,
    /// How many orders may be bound to this round.
    pub order_capacity: u32,
    pub signups: BTreeMap<u32, Signup>,
    pub next_signup_seq: u32,
    /// Created lazily on first capacity query.
    pub capacity: Option<CapacityConfig>,
}

#[derive(Debug, Clone)]
pub struct RoundCreate {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: String,
    pub max_participants: u32,
    /// Falls back to the configured default when absent.
    pub order_capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundUpdate {
    pub title: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub max_participants: Option<u32>,
    pub order_capacity: Option<u32>,
}

/// What a notification needs to describe a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_id: RoundId,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: String,
}

impl Round {
    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            round_id: self.id,
            title: self.title.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            location: self.location.clone(),
        }
    }

    pub fn is_open_for_signup(&self, now: DateTime<Utc>) -> bool {
        self.status == RoundStatus::Scheduled && self.starts_at > now
    }

    /// The non-canceled signup a user holds in this round, if any.
    pub fn active_signup_of(&self, user_id: crate::model::UserId) -> Option<&Signup> {
        self.signups
            .values()
            .find(|s| s.user_id == user_id && s.is_active())
    }

    pub fn role_filled(&self, role: SignupRole) -> bool {
        self.signups.values().any(|s| s.is_confirmed_as(role))
    }

    /// Confirmed regular volunteers. Team leads and clinicians are excluded.
    pub fn confirmed_volunteer_count(&self) -> u32 {
        self.signups
            .values()
            .filter(|s| s.is_confirmed_as(SignupRole::Volunteer))
            .count() as u32
    }

    /// Every confirmed signup regardless of role.
    pub fn confirmed_count(&self) -> u32 {
        self.signups
            .values()
            .filter(|s| s.status == SignupStatus::Confirmed)
            .count() as u32
    }

    /// Waitlisted signups in promotion order: ascending lottery number, then signup order.
    pub fn waitlist(&self) -> Vec<&Signup> {
        let mut waiting: Vec<&Signup> = self
            .signups
            .values()
            .filter(|s| s.status == SignupStatus::Waitlisted)
            .collect();
        waiting.sort_by_key(|s| (s.lottery_number.unwrap_or(u32::MAX), s.id.seq));
        waiting
    }

    pub fn is_confirmed_participant(&self, user_id: crate::model::UserId) -> bool {
        self.signups
            .values()
            .any(|s| s.user_id == user_id && s.status == SignupStatus::Confirmed)
    }
}
