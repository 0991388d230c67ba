use super::{LotteryEngine, OrderRoundBinder};
use crate::clients::{RoundClient, UserClient};
use crate::clock::{Clock, LotteryDraw};
use crate::collaborators::CapabilityCheck;
use crate::error::AllocationError;
use crate::framework::ActorClient;
use crate::model::{RoundId, Signup, SignupId, SignupRole, SignupStatus, UserId};
use crate::notification::{Notification, NotificationKind, NotificationQueue};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Role-priority signup and cancellation for rounds.
///
/// Team leads and clinicians with the matching grant take their single seat immediately.
/// Regular volunteers always join the waitlist with a lottery number drawn once, here, and
/// are promoted by the [`LotteryEngine`].
#[derive(Clone)]
pub struct SignupAllocator {
    rounds: RoundClient,
    users: UserClient,
    capabilities: Arc<dyn CapabilityCheck>,
    lottery: LotteryEngine,
    binder: OrderRoundBinder,
    draw: Arc<LotteryDraw>,
    notifications: NotificationQueue,
    clock: Arc<dyn Clock>,
}

impl SignupAllocator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rounds: RoundClient,
        users: UserClient,
        capabilities: Arc<dyn CapabilityCheck>,
        lottery: LotteryEngine,
        binder: OrderRoundBinder,
        draw: Arc<LotteryDraw>,
        notifications: NotificationQueue,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rounds,
            users,
            capabilities,
            lottery,
            binder,
            draw,
            notifications,
            clock,
        }
    }

    /// Signs `user_id` up for a round. `role` defaults to [`SignupRole::Volunteer`].
    ///
    /// Checks run in this order: round and user exist, round is open, no existing signup,
    /// capability for the role, seat for single-seat roles. The last three are repeated
    /// inside the round actor so a concurrent signup cannot slip between check and insert.
    #[instrument(skip(self))]
    pub async fn signup_for_round(
        &self,
        round_id: RoundId,
        user_id: UserId,
        role: Option<SignupRole>,
    ) -> Result<Signup, AllocationError> {
        let round = self.rounds.fetch(round_id).await?;
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| AllocationError::NotFound(user_id.to_string()))?;

        let now = self.clock.now();
        if !round.is_open_for_signup(now) {
            return Err(AllocationError::InvalidState(format!(
                "{} is not open for signup",
                round_id
            )));
        }
        if round.active_signup_of(user_id).is_some() {
            return Err(AllocationError::Conflict(format!(
                "{} is already signed up for {}",
                user_id, round_id
            )));
        }

        let role = role.unwrap_or_default();
        if let Some(capability) = role.required_capability() {
            super::require_capability(self.capabilities.as_ref(), user_id, capability).await?;
        }

        let signup = self
            .rounds
            .signup(round_id, user_id, role, self.draw.draw(), now)
            .await?;
        info!(signup_id = %signup.id, status = ?signup.status, "Signed up");

        let kind = match signup.status {
            SignupStatus::Confirmed => NotificationKind::SignupConfirmed,
            _ => NotificationKind::SignupWaitlisted,
        };
        self.notifications
            .publish(Notification::new(kind, user_id, round.summary()));
        Ok(signup)
    }

    /// Self-service cancellation. Refused inside the 24-hour floor.
    #[instrument(skip(self))]
    pub async fn cancel_signup(
        &self,
        signup_id: SignupId,
        user_id: UserId,
    ) -> Result<Signup, AllocationError> {
        self.remove(signup_id, Some(user_id)).await
    }

    /// Staff removal: no ownership check, no time floor.
    #[instrument(skip(self))]
    pub async fn admin_cancel_signup(
        &self,
        signup_id: SignupId,
        admin_id: UserId,
    ) -> Result<Signup, AllocationError> {
        info!(%admin_id, %signup_id, "Staff signup removal");
        self.remove(signup_id, None).await
    }

    /// Promotes one waitlisted signup regardless of lottery order. The volunteer seat limit
    /// still applies.
    #[instrument(skip(self))]
    pub async fn confirm_signup_manually(
        &self,
        signup_id: SignupId,
    ) -> Result<Signup, AllocationError> {
        let signup = self
            .rounds
            .confirm_manually(signup_id.round, signup_id.seq, self.clock.now())
            .await?;
        match self.rounds.fetch(signup_id.round).await {
            Ok(round) => self.notifications.publish(Notification::new(
                NotificationKind::SignupConfirmed,
                signup.user_id,
                round.summary(),
            )),
            Err(e) => warn!(%signup_id, error = %e, "Skipping confirmation notification"),
        }
        Ok(signup)
    }

    async fn remove(
        &self,
        signup_id: SignupId,
        caller: Option<UserId>,
    ) -> Result<Signup, AllocationError> {
        let removed = self
            .rounds
            .cancel_signup(signup_id.round, signup_id.seq, caller, self.clock.now())
            .await?;
        info!(%signup_id, status = ?removed.status, "Signup removed");

        if removed.is_confirmed_as(SignupRole::Volunteer) {
            // The signup is already gone; a failed backfill must not undo the cancellation.
            if let Err(e) = self.lottery.run_lottery_for_round(signup_id.round).await {
                warn!(round_id = %signup_id.round, error = %e, "Backfill lottery failed");
            }
            self.binder.handle_volunteer_cancellation(signup_id.round).await;
        }
        Ok(removed)
    }
}
