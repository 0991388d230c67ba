//! # Inventory Client
//!
//! Wraps a `ResourceClient<InventoryItem>` and implements the reservation contract orders
//! depend on.

use crate::collaborators::InventoryReservations;
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::inventory_actor::{InventoryAction, InventoryActionResult, InventoryError};
use crate::model::{InventoryItem, InventoryItemCreate, ItemId};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Inventory actor.
#[derive(Clone)]
pub struct InventoryClient {
    inner: ResourceClient<InventoryItem>,
}

impl InventoryClient {
    pub fn new(inner: ResourceClient<InventoryItem>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<InventoryItem> for InventoryClient {
    type Error = InventoryError;

    fn inner(&self) -> &ResourceClient<InventoryItem> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<InventoryError>() {
            Ok(inventory_error) => inventory_error,
            Err(FrameworkError::NotFound(id)) => InventoryError::NotFound(id),
            Err(other) => InventoryError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl InventoryClient {
    #[instrument(skip(self))]
    pub async fn create_item(&self, params: InventoryItemCreate) -> Result<ItemId, InventoryError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Check the current stock level for an item.
    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ItemId) -> Result<u32, InventoryError> {
        match self
            .inner
            .perform_action(id, InventoryAction::CheckStock)
            .await
        {
            Ok(InventoryActionResult::Stock(level)) => Ok(level),
            Ok(_) => unreachable!("CheckStock action must return Stock result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Takes `quantity` out of stock. Returns the remaining level.
    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, id: ItemId, quantity: u32) -> Result<u32, InventoryError> {
        debug!("Reserving {} units of {}", quantity, id);
        match self
            .inner
            .perform_action(id, InventoryAction::Reserve(quantity))
            .await
        {
            Ok(InventoryActionResult::Reserved(remaining)) => Ok(remaining),
            Ok(_) => unreachable!("Reserve action must return Reserved result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Puts `quantity` back. Returns the new level.
    #[instrument(skip(self))]
    pub async fn release_stock(&self, id: ItemId, quantity: u32) -> Result<u32, InventoryError> {
        debug!("Releasing {} units of {}", quantity, id);
        match self
            .inner
            .perform_action(id, InventoryAction::Release(quantity))
            .await
        {
            Ok(InventoryActionResult::Released(level)) => Ok(level),
            Ok(_) => unreachable!("Release action must return Released result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }
}

#[async_trait]
impl InventoryReservations for InventoryClient {
    async fn reserve(&self, item_id: ItemId, quantity: u32) -> Result<(), InventoryError> {
        self.reserve_stock(item_id, quantity).await.map(|_| ())
    }

    async fn release(&self, item_id: ItemId, quantity: u32) -> Result<(), InventoryError> {
        self.release_stock(item_id, quantity).await.map(|_| ())
    }
}
