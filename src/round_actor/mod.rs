//! # Round Actor
//!
//! Owns every round together with its signups and capacity config. The allocation rules that
//! must not interleave with each other live here as actions:
//!
//! - signup insertion with the duplicate and role-slot checks,
//! - lottery promotion against the current confirmed count,
//! - manual confirmation against the same count.
//!
//! Because the actor handles one message at a time, each of these is a single atomic step.

mod actions;
pub mod entity;

pub use actions::*;

use crate::clients::RoundClient;
use crate::framework::ResourceActor;
use crate::model::Round;

/// Hard floor for self-service signup cancellation.
pub const CANCELLATION_FLOOR_HOURS: i64 = 24;

/// Creates a new Round actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Round>, RoundClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, RoundClient::new(generic_client))
}
