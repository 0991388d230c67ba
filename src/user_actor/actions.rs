//! Custom actions for the User actor.

use crate::model::Capability;

#[derive(Debug, Clone)]
pub enum UserAction {
    Grant(Capability),
    Revoke(Capability),
    HasCapability(Capability),
}

/// Results from UserActions - variants match 1:1 with UserAction
#[derive(Debug, Clone, PartialEq)]
pub enum UserActionResult {
    /// `true` if the grant was new.
    Grant(bool),
    /// `true` if the user held the capability.
    Revoke(bool),
    HasCapability(bool),
}
