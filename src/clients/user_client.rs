//! # User Client
//!
//! High-level API for the `User` actor. Also serves as the capability-check collaborator for
//! signup.

use crate::collaborators::CapabilityCheck;
use crate::error::AllocationError;
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Capability, User, UserCreate, UserId, UserUpdate};
use crate::user_actor::{UserAction, UserActionResult, UserError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &ResourceClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<UserError>() {
            Ok(user_error) => user_error,
            Err(FrameworkError::NotFound(id)) => UserError::NotFound(id),
            Err(other) => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl UserClient {
    #[instrument(skip(self))]
    pub async fn create_user(&self, params: UserCreate) -> Result<UserId, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Returns `true` if the grant was new.
    #[instrument(skip(self))]
    pub async fn grant(&self, id: UserId, capability: Capability) -> Result<bool, UserError> {
        match self
            .inner
            .perform_action(id, UserAction::Grant(capability))
            .await
        {
            Ok(UserActionResult::Grant(added)) => Ok(added),
            Ok(_) => unreachable!("Grant action must return Grant result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Returns `true` if the user held the capability.
    #[instrument(skip(self))]
    pub async fn revoke(&self, id: UserId, capability: Capability) -> Result<bool, UserError> {
        match self
            .inner
            .perform_action(id, UserAction::Revoke(capability))
            .await
        {
            Ok(UserActionResult::Revoke(removed)) => Ok(removed),
            Ok(_) => unreachable!("Revoke action must return Revoke result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn has_capability(
        &self,
        id: UserId,
        capability: Capability,
    ) -> Result<bool, UserError> {
        match self
            .inner
            .perform_action(id, UserAction::HasCapability(capability))
            .await
        {
            Ok(UserActionResult::HasCapability(held)) => Ok(held),
            Ok(_) => unreachable!("HasCapability action must return HasCapability result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// The address notifications for this user go to.
    #[instrument(skip(self))]
    pub async fn contact_email(&self, id: UserId) -> Result<String, UserError> {
        self.get(id)
            .await?
            .map(|user| user.email)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl CapabilityCheck for UserClient {
    async fn has_capability(
        &self,
        user_id: UserId,
        capability: Capability,
    ) -> Result<bool, AllocationError> {
        UserClient::has_capability(self, user_id, capability)
            .await
            .map_err(AllocationError::from)
    }
}
