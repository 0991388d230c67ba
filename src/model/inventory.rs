use serde::{Deserialize, Serialize};

entity_id!(Item, "item");

/// Represents a stocked aid item (e.g. "Sleeping bag", size "L").
///
/// The allocation core only reserves and releases stock; catalog management lives elsewhere.
/// Implements [`ActorEntity`](crate::framework::ActorEntity) in [`crate::inventory_actor::entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub size: Option<String>,
    pub quantity: u32,
}

impl InventoryItem {
    pub fn new(id: ItemId, name: impl Into<String>, size: Option<String>, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            quantity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InventoryItemCreate {
    pub name: String,
    pub size: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<u32>,
}
