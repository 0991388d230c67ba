//! # Order Actor
//!
//! Owns orders and their volunteer assignments. The claim state machine runs as actions, so
//! the "is someone else holding this order" check and the assignment write are one step.
//!
//! The actor's context is the inventory reservation service: creating an order reserves its
//! lines, cancelling returns them.

mod actions;
pub mod entity;

pub use actions::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::Order;

/// Creates a new Order actor and its client.
///
/// Start it with `actor.run(reservations)` where `reservations` is an
/// `Arc<dyn InventoryReservations>`.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, OrderClient::new(generic_client))
}
