//! ActorEntity trait implementation for the User domain type.

use super::actions::{UserAction, UserActionResult};
use super::error::UserError;
use crate::framework::ActorEntity;
use crate::model::{User, UserCreate, UserId, UserUpdate};
use async_trait::async_trait;

fn validate_email(email: &str) -> Result<(), UserError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(UserError::ValidationError(format!(
            "invalid email address: {}",
            email
        )))
    }
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = UserAction;
    type ActionResult = UserActionResult;
    type Context = ();
    type Error = UserError;

    /// Creates a new User from creation parameters.
    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, UserError> {
        if params.name.trim().is_empty() {
            return Err(UserError::ValidationError("name must not be blank".into()));
        }
        validate_email(&params.email)?;
        let mut user = Self::new(id, params.name, params.email);
        user.capabilities.extend(params.capabilities);
        Ok(user)
    }

    /// Handles updates to the User entity.
    ///
    /// # Fields Updated
    /// - `name`: User's display name
    /// - `email`: User's contact address, used for notifications
    async fn on_update(&mut self, update: UserUpdate, _ctx: &()) -> Result<(), UserError> {
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: UserAction,
        _ctx: &(),
    ) -> Result<UserActionResult, UserError> {
        match action {
            UserAction::Grant(capability) => {
                Ok(UserActionResult::Grant(self.capabilities.insert(capability)))
            }
            UserAction::Revoke(capability) => {
                Ok(UserActionResult::Revoke(self.capabilities.remove(&capability)))
            }
            UserAction::HasCapability(capability) => Ok(UserActionResult::HasCapability(
                self.has_capability(capability),
            )),
        }
    }
}
