//! Error taxonomy for the allocation core.
//!
//! Every allocation operation fails with an [`AllocationError`]. The Round and Order actors
//! use it directly as their entity error, so a failure raised inside an action reaches the
//! caller as the same variant after the framework round trip.

use crate::framework::FrameworkError;
use crate::inventory_actor::InventoryError;
use crate::user_actor::UserError;
use thiserror::Error;

/// Reason attached to the conflict raised when a second volunteer claims an order.
pub const ORDER_ALREADY_ACCEPTED: &str = "ORDER_ALREADY_ACCEPTED";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AllocationError {
    /// A round, signup, order, assignment or user is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller does not own the resource or lacks the required capability.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Duplicate signup, filled role slot, or an order held by someone else.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The entity is not in a state that permits the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}

impl AllocationError {
    /// Recovers the original error from a framework round trip.
    pub fn from_framework(e: FrameworkError) -> Self {
        match e.downcast_entity::<AllocationError>() {
            Ok(domain) => domain,
            Err(FrameworkError::NotFound(id)) => AllocationError::NotFound(id),
            Err(other) => match other.downcast_entity::<InventoryError>() {
                Ok(inventory) => AllocationError::Inventory(inventory),
                Err(other) => AllocationError::ActorCommunication(other.to_string()),
            },
        }
    }
}

impl From<String> for AllocationError {
    fn from(msg: String) -> Self {
        AllocationError::ActorCommunication(msg)
    }
}

impl From<FrameworkError> for AllocationError {
    fn from(e: FrameworkError) -> Self {
        AllocationError::from_framework(e)
    }
}

impl From<UserError> for AllocationError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(id) => AllocationError::NotFound(id),
            UserError::ValidationError(msg) => AllocationError::InvalidInput(msg),
            UserError::ActorCommunicationError(msg) => AllocationError::ActorCommunication(msg),
        }
    }
}
