//! ActorEntity trait implementation for the InventoryItem domain type.
//!
//! Includes the stock reservation actions order creation and cancellation rely on.

use super::actions::{InventoryAction, InventoryActionResult};
use super::error::InventoryError;
use crate::framework::ActorEntity;
use crate::model::{InventoryItem, InventoryItemCreate, InventoryItemUpdate, ItemId};
use async_trait::async_trait;

#[async_trait]
impl ActorEntity for InventoryItem {
    type Id = ItemId;
    type Create = InventoryItemCreate;
    type Update = InventoryItemUpdate;
    type Action = InventoryAction;
    type ActionResult = InventoryActionResult;
    type Context = ();
    type Error = InventoryError;

    fn from_create_params(id: ItemId, params: InventoryItemCreate) -> Result<Self, InventoryError> {
        Ok(Self::new(id, params.name, params.size, params.quantity))
    }

    /// Handles updates to the InventoryItem entity.
    ///
    /// # Fields Updated
    /// - `name`: Display name
    /// - `quantity`: Available stock, e.g. after a restock count
    async fn on_update(
        &mut self,
        update: InventoryItemUpdate,
        _ctx: &(),
    ) -> Result<(), InventoryError> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: InventoryAction,
        _ctx: &(),
    ) -> Result<InventoryActionResult, InventoryError> {
        match action {
            InventoryAction::CheckStock => Ok(InventoryActionResult::Stock(self.quantity)),
            InventoryAction::Reserve(0) | InventoryAction::Release(0) => {
                Err(InventoryError::InvalidQuantity(0))
            }
            InventoryAction::Reserve(quantity) => {
                if self.quantity < quantity {
                    return Err(InventoryError::InsufficientStock {
                        requested: quantity,
                        available: self.quantity,
                    });
                }
                self.quantity -= quantity;
                Ok(InventoryActionResult::Reserved(self.quantity))
            }
            InventoryAction::Release(quantity) => {
                self.quantity = self.quantity.saturating_add(quantity);
                Ok(InventoryActionResult::Released(self.quantity))
            }
        }
    }
}
