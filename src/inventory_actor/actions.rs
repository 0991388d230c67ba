//! Custom actions for the Inventory actor.
//!
//! These actions are handled by
//! [`ActorEntity::handle_action`](crate::framework::ActorEntity::handle_action) on
//! [`InventoryItem`](crate::model::InventoryItem).

/// Custom actions for inventory items.
#[derive(Debug, Clone)]
pub enum InventoryAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Takes the given quantity out of stock.
    ///
    /// # Errors
    /// Fails if the requested amount exceeds available stock.
    Reserve(u32),
    /// Puts a previously reserved quantity back.
    Release(u32),
}

/// Results from InventoryActions - variants match 1:1 with InventoryAction.
/// Each carries the stock level after the action.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryActionResult {
    Stock(u32),
    Reserved(u32),
    Released(u32),
}
