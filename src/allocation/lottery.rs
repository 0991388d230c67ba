use crate::clients::RoundClient;
use crate::clock::Clock;
use crate::error::AllocationError;
use crate::model::{RoundId, Signup};
use crate::notification::{Notification, NotificationKind, NotificationQueue};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Promotes waitlisted volunteers into free seats.
///
/// The seat count and the promotions are read and written in a single round action, so a
/// signup that arrives mid-run is either fully before or fully after it.
#[derive(Clone)]
pub struct LotteryEngine {
    rounds: RoundClient,
    notifications: NotificationQueue,
    clock: Arc<dyn Clock>,
}

impl LotteryEngine {
    pub fn new(
        rounds: RoundClient,
        notifications: NotificationQueue,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rounds,
            notifications,
            clock,
        }
    }

    /// Returns the newly confirmed signups, lowest lottery number first. Empty when the round
    /// has no free seats or nobody is waiting.
    #[instrument(skip(self))]
    pub async fn run_lottery_for_round(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<Signup>, AllocationError> {
        let promoted = self.rounds.run_lottery(round_id, self.clock.now()).await?;
        if promoted.is_empty() {
            return Ok(promoted);
        }
        info!(%round_id, promoted = promoted.len(), "Lottery promoted signups");

        match self.rounds.fetch(round_id).await {
            Ok(round) => {
                let summary = round.summary();
                for signup in &promoted {
                    self.notifications.publish(Notification::new(
                        NotificationKind::LotteryWon,
                        signup.user_id,
                        summary.clone(),
                    ));
                }
            }
            Err(e) => warn!(%round_id, error = %e, "Skipping lottery notifications"),
        }
        Ok(promoted)
    }
}
