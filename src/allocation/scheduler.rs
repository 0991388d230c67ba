use super::OrderRoundBinder;
use crate::clients::RoundClient;
use crate::clock::Clock;
use crate::collaborators::CapabilityCheck;
use crate::config::CapacityDefaults;
use crate::error::AllocationError;
use crate::model::{Capability, Round, RoundCreate, RoundId, RoundUpdate, Signup, UserId};
use crate::notification::{Notification, NotificationKind, NotificationQueue};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Staff management of rounds. Every method requires the `Staff` capability.
#[derive(Clone)]
pub struct RoundScheduler {
    rounds: RoundClient,
    binder: OrderRoundBinder,
    capabilities: Arc<dyn CapabilityCheck>,
    notifications: NotificationQueue,
    defaults: CapacityDefaults,
    clock: Arc<dyn Clock>,
}

impl RoundScheduler {
    pub fn new(
        rounds: RoundClient,
        binder: OrderRoundBinder,
        capabilities: Arc<dyn CapabilityCheck>,
        notifications: NotificationQueue,
        defaults: CapacityDefaults,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rounds,
            binder,
            capabilities,
            notifications,
            defaults,
            clock,
        }
    }

    async fn require_staff(&self, staff_id: UserId) -> Result<(), AllocationError> {
        super::require_capability(self.capabilities.as_ref(), staff_id, Capability::Staff).await
    }

    /// A missing `order_capacity` takes the configured default.
    #[instrument(skip(self, params), fields(title = %params.title))]
    pub async fn create_round(
        &self,
        staff_id: UserId,
        mut params: RoundCreate,
    ) -> Result<RoundId, AllocationError> {
        self.require_staff(staff_id).await?;
        if params.starts_at <= self.clock.now() {
            return Err(AllocationError::InvalidInput(
                "rounds must be scheduled in the future".into(),
            ));
        }
        params
            .order_capacity
            .get_or_insert(self.defaults.default_order_capacity);
        let id = self.rounds.create_round(params).await?;
        info!(round_id = %id, %staff_id, "Round scheduled");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn update_round(
        &self,
        staff_id: UserId,
        round_id: RoundId,
        update: RoundUpdate,
    ) -> Result<Round, AllocationError> {
        self.require_staff(staff_id).await?;
        self.rounds.update_round(round_id, update).await
    }

    /// Cancels the round and every signup in it, tells the affected volunteers, then moves
    /// the round's orders to other rounds. Returns the signups that were canceled.
    #[instrument(skip(self))]
    pub async fn cancel_round(
        &self,
        staff_id: UserId,
        round_id: RoundId,
    ) -> Result<Vec<Signup>, AllocationError> {
        self.require_staff(staff_id).await?;
        let affected = self.rounds.cancel_round(round_id, self.clock.now()).await?;

        match self.rounds.fetch(round_id).await {
            Ok(round) => {
                let summary = round.summary();
                for signup in &affected {
                    self.notifications.publish(Notification::new(
                        NotificationKind::RoundCanceled,
                        signup.user_id,
                        summary.clone(),
                    ));
                }
            }
            Err(e) => warn!(%round_id, error = %e, "Skipping cancellation notifications"),
        }

        // The round is canceled either way; orders left unbound are retried by the sweep.
        if let Err(e) = self.binder.handle_round_cancellation(round_id).await {
            warn!(%round_id, error = %e, "Order rebinding failed");
        }
        info!(%round_id, %staff_id, signups = affected.len(), "Round canceled");
        Ok(affected)
    }

    #[instrument(skip(self))]
    pub async fn complete_round(
        &self,
        staff_id: UserId,
        round_id: RoundId,
    ) -> Result<(), AllocationError> {
        self.require_staff(staff_id).await?;
        self.rounds.complete_round(round_id).await
    }

    /// Scheduled rounds that have not started, earliest first.
    pub async fn upcoming_rounds(&self) -> Result<Vec<Round>, AllocationError> {
        self.binder.upcoming_rounds().await
    }
}
