use crate::clients::{OrderClient, RoundClient};
use crate::clock::Clock;
use crate::collaborators::CapabilityCheck;
use crate::config::CapacityDefaults;
use crate::error::AllocationError;
use crate::model::{Capability, CapacityConfig, RoundCapacityInfo, RoundId, UserId};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Order quotas per round and per volunteer.
///
/// `max_capacity = override_capacity ?? volunteer_count * max_orders_per_volunteer`, where
/// `volunteer_count` is every confirmed signup in the round.
#[derive(Clone)]
pub struct CapacityPolicy {
    rounds: RoundClient,
    orders: OrderClient,
    capabilities: Arc<dyn CapabilityCheck>,
    defaults: CapacityDefaults,
    clock: Arc<dyn Clock>,
}

impl CapacityPolicy {
    pub fn new(
        rounds: RoundClient,
        orders: OrderClient,
        capabilities: Arc<dyn CapabilityCheck>,
        defaults: CapacityDefaults,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rounds,
            orders,
            capabilities,
            defaults,
            clock,
        }
    }

    /// Creates the config with defaults on first use.
    #[instrument(skip(self))]
    pub async fn get_or_create_config(
        &self,
        round_id: RoundId,
    ) -> Result<CapacityConfig, AllocationError> {
        self.rounds
            .capacity_config(
                round_id,
                self.defaults.default_max_orders_per_volunteer,
                self.clock.now(),
            )
            .await
    }

    /// `true` while the volunteer holds fewer active assignments in the round than the quota.
    #[instrument(skip(self))]
    pub async fn can_volunteer_accept_more(
        &self,
        round_id: RoundId,
        volunteer_id: UserId,
    ) -> Result<bool, AllocationError> {
        let config = self.get_or_create_config(round_id).await?;
        let active = self
            .orders
            .active_assignment_count(round_id, volunteer_id)
            .await?;
        debug!(active, max = config.max_orders_per_volunteer, "Volunteer load");
        Ok(active < config.max_orders_per_volunteer as usize)
    }

    #[instrument(skip(self))]
    pub async fn get_round_capacity_info(
        &self,
        round_id: RoundId,
    ) -> Result<RoundCapacityInfo, AllocationError> {
        let round = self.rounds.fetch(round_id).await?;
        let config = self.get_or_create_config(round_id).await?;
        let total_active_orders = self.orders.active_order_count(round_id).await? as u32;
        let volunteer_count = round.confirmed_count();
        let max_capacity = config.max_capacity(volunteer_count);
        Ok(RoundCapacityInfo {
            round_id,
            volunteer_count,
            total_active_orders,
            max_capacity,
            available_slots: i64::from(max_capacity) - i64::from(total_active_orders),
        })
    }

    /// Staff-only. Values arrive signed so negative input can be rejected explicitly.
    #[instrument(skip(self))]
    pub async fn update_capacity(
        &self,
        round_id: RoundId,
        max_orders_per_volunteer: i64,
        override_capacity: Option<i64>,
        admin_id: UserId,
    ) -> Result<CapacityConfig, AllocationError> {
        let max_orders_per_volunteer =
            non_negative("max_orders_per_volunteer", max_orders_per_volunteer)?;
        let override_capacity = override_capacity
            .map(|v| non_negative("override_capacity", v))
            .transpose()?;
        super::require_capability(self.capabilities.as_ref(), admin_id, Capability::Staff).await?;

        let config = self
            .rounds
            .update_capacity(
                round_id,
                max_orders_per_volunteer,
                override_capacity,
                admin_id,
                self.defaults.default_max_orders_per_volunteer,
                self.clock.now(),
            )
            .await?;
        info!(%round_id, %admin_id, max_orders_per_volunteer, ?override_capacity, "Capacity updated");
        Ok(config)
    }
}

fn non_negative(field: &str, value: i64) -> Result<u32, AllocationError> {
    if value < 0 {
        return Err(AllocationError::InvalidInput(format!(
            "{} must not be negative, got {}",
            field, value
        )));
    }
    u32::try_from(value)
        .map_err(|_| AllocationError::InvalidInput(format!("{} is too large: {}", field, value)))
}
