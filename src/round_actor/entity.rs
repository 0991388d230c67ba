//! ActorEntity trait implementation for the Round domain type.
//!
//! The signup, lottery and capacity rules are plain methods on [`Round`] so they can be
//! unit tested without an actor; `handle_action` only dispatches to them.

use super::actions::{RoundAction, RoundActionResult};
use super::CANCELLATION_FLOOR_HOURS;
use crate::config::CapacityDefaults;
use crate::error::AllocationError;
use crate::framework::ActorEntity;
use crate::model::{
    CapacityConfig, Round, RoundCreate, RoundId, RoundStatus, RoundUpdate, Signup, SignupId,
    SignupRole, SignupStatus, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::debug;

#[async_trait]
impl ActorEntity for Round {
    type Id = RoundId;
    type Create = RoundCreate;
    type Update = RoundUpdate;
    type Action = RoundAction;
    type ActionResult = RoundActionResult;
    type Context = ();
    type Error = AllocationError;

    fn from_create_params(id: RoundId, params: RoundCreate) -> Result<Self, AllocationError> {
        if params.title.trim().is_empty() {
            return Err(AllocationError::InvalidInput("title must not be blank".into()));
        }
        if params.ends_at <= params.starts_at {
            return Err(AllocationError::InvalidInput(
                "round must end after it starts".into(),
            ));
        }
        Ok(Self {
            id,
            title: params.title,
            starts_at: params.starts_at,
            ends_at: params.ends_at,
            location: params.location,
            status: RoundStatus::Scheduled,
            max_participants: params.max_participants,
            order_capacity: params
                .order_capacity
                .unwrap_or(CapacityDefaults::default().default_order_capacity),
            signups: BTreeMap::new(),
            next_signup_seq: 1,
            capacity: None,
        })
    }

    /// Handles staff edits of a scheduled round.
    ///
    /// # Fields Updated
    /// - `title`, `location`
    /// - `starts_at`, `ends_at`: must still describe a non-empty window
    /// - `max_participants`: may not drop below the confirmed volunteer count
    /// - `order_capacity`
    async fn on_update(&mut self, update: RoundUpdate, _ctx: &()) -> Result<(), AllocationError> {
        if self.status != RoundStatus::Scheduled {
            return Err(AllocationError::InvalidState(format!(
                "{} is {:?} and can no longer be edited",
                self.id, self.status
            )));
        }
        let starts_at = update.starts_at.unwrap_or(self.starts_at);
        let ends_at = update.ends_at.unwrap_or(self.ends_at);
        if ends_at <= starts_at {
            return Err(AllocationError::InvalidInput(
                "round must end after it starts".into(),
            ));
        }
        if let Some(max) = update.max_participants {
            let confirmed = self.confirmed_volunteer_count();
            if max < confirmed {
                return Err(AllocationError::InvalidInput(format!(
                    "max_participants {} is below the {} confirmed volunteers",
                    max, confirmed
                )));
            }
            self.max_participants = max;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(capacity) = update.order_capacity {
            self.order_capacity = capacity;
        }
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: RoundAction,
        _ctx: &(),
    ) -> Result<RoundActionResult, AllocationError> {
        match action {
            RoundAction::Signup {
                user_id,
                role,
                lottery_number,
                now,
            } => self
                .add_signup(user_id, role, lottery_number, now)
                .map(RoundActionResult::Signup),
            RoundAction::CancelSignup { seq, caller, now } => self
                .remove_signup(seq, caller, now)
                .map(RoundActionResult::CancelSignup),
            RoundAction::ConfirmManually { seq, now } => self
                .confirm_manually(seq, now)
                .map(RoundActionResult::ConfirmManually),
            RoundAction::RunLottery { now } => {
                Ok(RoundActionResult::RunLottery(self.draw_lottery(now)))
            }
            RoundAction::Cancel { now } => self.cancel(now).map(RoundActionResult::Cancel),
            RoundAction::Complete => self.complete().map(|_| RoundActionResult::Complete),
            RoundAction::GetOrCreateCapacity {
                default_max_orders_per_volunteer,
                now,
            } => Ok(RoundActionResult::GetOrCreateCapacity(
                self.capacity_or_default(default_max_orders_per_volunteer, now)
                    .clone(),
            )),
            RoundAction::UpdateCapacity {
                max_orders_per_volunteer,
                override_capacity,
                admin_id,
                default_max_orders_per_volunteer,
                now,
            } => {
                let config = self.capacity_or_default(default_max_orders_per_volunteer, now);
                config.max_orders_per_volunteer = max_orders_per_volunteer;
                config.override_capacity = override_capacity;
                config.last_modified_by = Some(admin_id);
                config.updated_at = now;
                Ok(RoundActionResult::UpdateCapacity(config.clone()))
            }
        }
    }
}

impl Round {
    fn signup_id(&self, seq: u32) -> SignupId {
        SignupId { round: self.id, seq }
    }

    fn ensure_open(&self, now: DateTime<Utc>) -> Result<(), AllocationError> {
        if self.status != RoundStatus::Scheduled {
            return Err(AllocationError::InvalidState(format!(
                "{} is {:?}",
                self.id, self.status
            )));
        }
        if self.starts_at <= now {
            return Err(AllocationError::InvalidState(format!(
                "{} has already started",
                self.id
            )));
        }
        Ok(())
    }

    fn add_signup(
        &mut self,
        user_id: UserId,
        role: SignupRole,
        lottery_number: u32,
        now: DateTime<Utc>,
    ) -> Result<Signup, AllocationError> {
        self.ensure_open(now)?;
        if self.active_signup_of(user_id).is_some() {
            return Err(AllocationError::Conflict(format!(
                "{} is already signed up for {}",
                user_id, self.id
            )));
        }

        let (status, lottery_number) = if role.is_single_seat() {
            if self.role_filled(role) {
                return Err(AllocationError::Conflict(format!(
                    "{:?} seat for {} is already filled",
                    role, self.id
                )));
            }
            (SignupStatus::Confirmed, None)
        } else {
            (SignupStatus::Waitlisted, Some(lottery_number))
        };

        let seq = self.next_signup_seq;
        self.next_signup_seq += 1;
        let signup = Signup {
            id: self.signup_id(seq),
            user_id,
            role,
            status,
            lottery_number,
            signup_time: now,
            updated_at: now,
        };
        self.signups.insert(seq, signup.clone());
        Ok(signup)
    }

    fn remove_signup(
        &mut self,
        seq: u32,
        caller: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Signup, AllocationError> {
        let signup = self
            .signups
            .get(&seq)
            .ok_or_else(|| AllocationError::NotFound(self.signup_id(seq).to_string()))?;

        if let Some(caller) = caller {
            if signup.user_id != caller {
                return Err(AllocationError::Unauthorized(format!(
                    "{} does not belong to {}",
                    signup.id, caller
                )));
            }
            if self.starts_at - now < Duration::hours(CANCELLATION_FLOOR_HOURS) {
                return Err(AllocationError::InvalidState(format!(
                    "signups can only be canceled at least {} hours before the round starts",
                    CANCELLATION_FLOOR_HOURS
                )));
            }
        }

        self.signups
            .remove(&seq)
            .ok_or_else(|| AllocationError::NotFound(self.signup_id(seq).to_string()))
    }

    fn confirm_manually(
        &mut self,
        seq: u32,
        now: DateTime<Utc>,
    ) -> Result<Signup, AllocationError> {
        let confirmed_volunteers = self.confirmed_volunteer_count();
        let max = self.max_participants;
        let id = self.signup_id(seq);
        let signup = self
            .signups
            .get_mut(&seq)
            .ok_or_else(|| AllocationError::NotFound(id.to_string()))?;

        if signup.status != SignupStatus::Waitlisted {
            return Err(AllocationError::InvalidState(format!(
                "{} is {:?}, not waitlisted",
                id, signup.status
            )));
        }
        if signup.role == SignupRole::Volunteer && confirmed_volunteers >= max {
            return Err(AllocationError::Conflict(format!(
                "all {} volunteer seats are taken",
                max
            )));
        }
        signup.status = SignupStatus::Confirmed;
        signup.updated_at = now;
        Ok(signup.clone())
    }

    /// Promotes waitlisted signups into free volunteer seats, lowest lottery number first.
    fn draw_lottery(&mut self, now: DateTime<Utc>) -> Vec<Signup> {
        if self.status != RoundStatus::Scheduled {
            return Vec::new();
        }
        let available = self
            .max_participants
            .saturating_sub(self.confirmed_volunteer_count()) as usize;
        if available == 0 {
            debug!(round_id = %self.id, "No open seats");
            return Vec::new();
        }

        let winners: Vec<u32> = self
            .waitlist()
            .into_iter()
            .take(available)
            .map(|s| s.id.seq)
            .collect();

        winners
            .into_iter()
            .filter_map(|seq| {
                let signup = self.signups.get_mut(&seq)?;
                signup.status = SignupStatus::Confirmed;
                signup.updated_at = now;
                Some(signup.clone())
            })
            .collect()
    }

    fn cancel(&mut self, now: DateTime<Utc>) -> Result<Vec<Signup>, AllocationError> {
        if self.status != RoundStatus::Scheduled {
            return Err(AllocationError::InvalidState(format!(
                "{} is already {:?}",
                self.id, self.status
            )));
        }
        self.status = RoundStatus::Canceled;
        let mut affected = Vec::new();
        for signup in self.signups.values_mut().filter(|s| s.is_active()) {
            affected.push(signup.clone());
            signup.status = SignupStatus::Canceled;
            signup.updated_at = now;
        }
        Ok(affected)
    }

    fn complete(&mut self) -> Result<(), AllocationError> {
        if self.status != RoundStatus::Scheduled {
            return Err(AllocationError::InvalidState(format!(
                "{} is already {:?}",
                self.id, self.status
            )));
        }
        self.status = RoundStatus::Completed;
        Ok(())
    }

    fn capacity_or_default(&mut self, default_max: u32, now: DateTime<Utc>) -> &mut CapacityConfig {
        let round_id = self.id;
        self.capacity
            .get_or_insert_with(|| CapacityConfig::with_defaults(round_id, default_max, now))
    }
}
