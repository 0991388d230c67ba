use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

entity_id!(User, "user");

/// A grant that lets a user take a role beyond regular volunteering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    TeamLead,
    Clinician,
    /// Round and capacity administration.
    Staff,
}

/// Represents a registered user in the system.
///
/// Implements [`ActorEntity`](crate::framework::ActorEntity) in [`crate::user_actor::entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub capabilities: BTreeSet<Capability>,
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub capabilities: Vec<Capability>,
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            capabilities: BTreeSet::new(),
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

impl UserCreate {
    /// A plain volunteer with no grants.
    pub fn volunteer(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }
}
