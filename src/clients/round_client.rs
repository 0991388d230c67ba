//! # Round Client
//!
//! High-level API for the `Round` actor: scheduling, signups, lottery and capacity config.
//! Errors come back as the original [`AllocationError`] raised inside the actor.

use crate::error::AllocationError;
use crate::framework::{ActorClient, Filter, FrameworkError, ResourceClient};
use crate::model::{
    CapacityConfig, Round, RoundCreate, RoundId, RoundStatus, RoundUpdate, Signup, SignupRole,
    UserId,
};
use crate::round_actor::{RoundAction, RoundActionResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// Client for interacting with the Round actor.
#[derive(Clone)]
pub struct RoundClient {
    inner: ResourceClient<Round>,
}

impl RoundClient {
    pub fn new(inner: ResourceClient<Round>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Round> for RoundClient {
    type Error = AllocationError;

    fn inner(&self) -> &ResourceClient<Round> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        AllocationError::from_framework(e)
    }
}

impl RoundClient {
    async fn act(
        &self,
        id: RoundId,
        action: RoundAction,
    ) -> Result<RoundActionResult, AllocationError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn create_round(&self, params: RoundCreate) -> Result<RoundId, AllocationError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_round(
        &self,
        id: RoundId,
        update: RoundUpdate,
    ) -> Result<Round, AllocationError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Like `get`, but a missing round is an error.
    pub async fn fetch(&self, id: RoundId) -> Result<Round, AllocationError> {
        self.get(id)
            .await?
            .ok_or_else(|| AllocationError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn signup(
        &self,
        id: RoundId,
        user_id: UserId,
        role: SignupRole,
        lottery_number: u32,
        now: DateTime<Utc>,
    ) -> Result<Signup, AllocationError> {
        match self
            .act(
                id,
                RoundAction::Signup {
                    user_id,
                    role,
                    lottery_number,
                    now,
                },
            )
            .await?
        {
            RoundActionResult::Signup(signup) => Ok(signup),
            _ => unreachable!("Signup action must return Signup result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel_signup(
        &self,
        id: RoundId,
        seq: u32,
        caller: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Signup, AllocationError> {
        match self
            .act(id, RoundAction::CancelSignup { seq, caller, now })
            .await?
        {
            RoundActionResult::CancelSignup(signup) => Ok(signup),
            _ => unreachable!("CancelSignup action must return CancelSignup result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn confirm_manually(
        &self,
        id: RoundId,
        seq: u32,
        now: DateTime<Utc>,
    ) -> Result<Signup, AllocationError> {
        match self.act(id, RoundAction::ConfirmManually { seq, now }).await? {
            RoundActionResult::ConfirmManually(signup) => Ok(signup),
            _ => unreachable!("ConfirmManually action must return ConfirmManually result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn run_lottery(
        &self,
        id: RoundId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Signup>, AllocationError> {
        match self.act(id, RoundAction::RunLottery { now }).await? {
            RoundActionResult::RunLottery(promoted) => Ok(promoted),
            _ => unreachable!("RunLottery action must return RunLottery result"),
        }
    }

    /// Cancels the round and returns the signups that were active.
    #[instrument(skip(self))]
    pub async fn cancel_round(
        &self,
        id: RoundId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Signup>, AllocationError> {
        match self.act(id, RoundAction::Cancel { now }).await? {
            RoundActionResult::Cancel(affected) => Ok(affected),
            _ => unreachable!("Cancel action must return Cancel result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn complete_round(&self, id: RoundId) -> Result<(), AllocationError> {
        match self.act(id, RoundAction::Complete).await? {
            RoundActionResult::Complete => Ok(()),
            _ => unreachable!("Complete action must return Complete result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn capacity_config(
        &self,
        id: RoundId,
        default_max_orders_per_volunteer: u32,
        now: DateTime<Utc>,
    ) -> Result<CapacityConfig, AllocationError> {
        match self
            .act(
                id,
                RoundAction::GetOrCreateCapacity {
                    default_max_orders_per_volunteer,
                    now,
                },
            )
            .await?
        {
            RoundActionResult::GetOrCreateCapacity(config) => Ok(config),
            _ => unreachable!("GetOrCreateCapacity action must return GetOrCreateCapacity result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn update_capacity(
        &self,
        id: RoundId,
        max_orders_per_volunteer: u32,
        override_capacity: Option<u32>,
        admin_id: UserId,
        default_max_orders_per_volunteer: u32,
        now: DateTime<Utc>,
    ) -> Result<CapacityConfig, AllocationError> {
        match self
            .act(
                id,
                RoundAction::UpdateCapacity {
                    max_orders_per_volunteer,
                    override_capacity,
                    admin_id,
                    default_max_orders_per_volunteer,
                    now,
                },
            )
            .await?
        {
            RoundActionResult::UpdateCapacity(config) => Ok(config),
            _ => unreachable!("UpdateCapacity action must return UpdateCapacity result"),
        }
    }

    /// Rounds with `status` starting after `now`, earliest first.
    #[instrument(skip(self))]
    pub async fn starting_after(
        &self,
        now: DateTime<Utc>,
        status: RoundStatus,
    ) -> Result<Vec<Round>, AllocationError> {
        let mut rounds = self
            .query(Filter::new(move |r: &Round| {
                r.status == status && r.starts_at > now
            }))
            .await?;
        rounds.sort_by_key(|r| (r.starts_at, r.id));
        Ok(rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_action_errors_keep_their_variant() {
        let mut mock = MockClient::<Round>::new();
        mock.expect_action(RoundId(1))
            .return_err(FrameworkError::EntityError(Box::new(
                AllocationError::Conflict("TeamLead seat for round_1 is already filled".into()),
            )));
        let client = RoundClient::new(mock.client());

        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let err = client
            .signup(RoundId(1), UserId(2), SignupRole::TeamLead, 1, now)
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::Conflict(_)));
        mock.verify();
    }

    #[tokio::test]
    async fn test_fetch_missing_round_is_not_found() {
        let mut mock = MockClient::<Round>::new();
        mock.expect_get(RoundId(5)).return_ok(None);
        let client = RoundClient::new(mock.client());

        assert_eq!(
            client.fetch(RoundId(5)).await.unwrap_err(),
            AllocationError::NotFound("round_5".into())
        );
        mock.verify();
    }
}
