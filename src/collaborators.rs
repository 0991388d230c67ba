//! Contracts the allocation core consumes from neighbouring subsystems.
//!
//! The actor-backed clients implement these, and tests can substitute their own.

use crate::error::AllocationError;
use crate::inventory_actor::InventoryError;
use crate::model::{Capability, ItemId, UserId};
use async_trait::async_trait;

/// "Does user X hold capability Y".
#[async_trait]
pub trait CapabilityCheck: Send + Sync {
    async fn has_capability(
        &self,
        user_id: UserId,
        capability: Capability,
    ) -> Result<bool, AllocationError>;
}

/// Stock reservation for order lines. Opaque beyond success or failure.
#[async_trait]
pub trait InventoryReservations: Send + Sync {
    async fn reserve(&self, item_id: ItemId, quantity: u32) -> Result<(), InventoryError>;
    async fn release(&self, item_id: ItemId, quantity: u32) -> Result<(), InventoryError>;
}
