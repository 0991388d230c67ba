//! # ActorEntity Trait
//!
//! The contract every persisted resource (User, InventoryItem, Round, Order) implements to be
//! managed by the generic [`ResourceActor`](crate::framework::ResourceActor). It fixes the
//! associated types for ids, DTOs, actions, context and errors, and provides the lifecycle
//! hooks (`on_create`, `on_update`, `on_delete`, `handle_action`).
//!
//! # Atomicity
//! A hook runs to completion before the actor looks at its next message. Any check-and-write
//! sequence that lives entirely inside one hook is therefore atomic with respect to every other
//! request for the same entity type. The allocation rules that must not race (role-slot
//! checks, lottery promotion, order claim exclusivity) are written as actions for this reason.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// This trait is `#[async_trait]` so hooks can await collaborators (the Order entity reserves
/// inventory while it is created). The `Context` type is injected into every hook when the
/// actor is started, not when it is constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must be convertible from u32 for automatic ID generation.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g., `RunLottery`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One error type per actor rather than per action: callers match on a single enum and the
    /// framework can box it uniformly into [`FrameworkError::EntityError`](crate::framework::FrameworkError).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called immediately after the entity is constructed, before it is stored.
    /// An error here discards the entity.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
