//! # Allocation Services
//!
//! The workflows that sit on top of the resource actors:
//!
//! | Service | Responsibility |
//! |---------|----------------|
//! | [`SignupAllocator`] | role-priority signup and cancellation |
//! | [`LotteryEngine`] | waitlist promotion into free volunteer seats |
//! | [`CapacityPolicy`] | per-round and per-volunteer order quotas |
//! | [`OrderRoundBinder`] | binding orders to rounds under the round's order capacity |
//! | [`OrderClaimEngine`] | the volunteer claim state machine |
//! | [`RateLimiter`] | order-creation throttling per user or guest IP |
//! | [`OrderIntake`] | order submission: rate limit, create, record, bind |
//! | [`RoundScheduler`] | staff round management and cancellation fan-out |
//!
//! Single-entity invariants are enforced inside the actors. The services add the
//! cross-entity guards: the binder serializes binding behind one lock, and the claim engine
//! serializes quota checks per `(round, volunteer)`.

pub mod binder;
pub mod capacity;
pub mod claim;
pub mod intake;
pub mod lottery;
pub mod rate_limit;
pub mod scheduler;
pub mod signup;

pub use binder::OrderRoundBinder;
pub use capacity::CapacityPolicy;
pub use claim::OrderClaimEngine;
pub use intake::OrderIntake;
pub use lottery::LotteryEngine;
pub use rate_limit::RateLimiter;
pub use scheduler::RoundScheduler;
pub use signup::SignupAllocator;

use crate::collaborators::CapabilityCheck;
use crate::error::AllocationError;
use crate::model::{Capability, UserId};

/// Fails with `Unauthorized` unless `user_id` holds `capability`.
pub(crate) async fn require_capability(
    capabilities: &dyn CapabilityCheck,
    user_id: UserId,
    capability: Capability,
) -> Result<(), AllocationError> {
    if capabilities.has_capability(user_id, capability).await? {
        Ok(())
    } else {
        Err(AllocationError::Unauthorized(format!(
            "{} lacks the {:?} capability",
            user_id, capability
        )))
    }
}
