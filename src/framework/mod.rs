//! Generic actor framework for resource management.
//!
//! The building blocks every resource actor in the crate is made of:
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns a store of entities
//! - [`ResourceClient`] - Typed handle for sending requests to a `ResourceActor`
//! - [`ActorClient`] - Shared read/delete operations for domain-specific client wrappers
//! - [`FrameworkError`] - Errors raised by the plumbing
//!
//! # Testing
//!
//! See the [`mock`] module for utilities to test clients without spawning full actors.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response};
