//! Inventory resource logic: stock reservation and release for order lines.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::InventoryClient;
use crate::framework::ResourceActor;
use crate::model::InventoryItem;

/// Creates a new Inventory actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<InventoryItem>, InventoryClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, InventoryClient::new(generic_client))
}
