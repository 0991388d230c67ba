//! # Outreach Allocator
//!
//! The allocation core for volunteer outreach rounds: who gets a seat in a round, which
//! round an aid order is delivered in, and which volunteer delivers it.
//!
//! ## Design
//!
//! ### Resource actors
//! Every persisted entity type (users, inventory items, rounds, orders) lives in its own
//! [`ResourceActor`](framework::ResourceActor), a Tokio task that processes its mailbox one
//! message at a time. Rules that must not race are written as actions on the owning entity:
//! a round checks its role seats and runs its lottery inside one message, and an order checks
//! and records its claim inside one message.
//!
//! ### One-way ownership
//! A [`Round`](model::Round) owns its signups and capacity config, and an
//! [`Order`](model::Order) owns its assignments. Child ids carry the parent id
//! ([`SignupId`](model::SignupId), [`AssignmentId`](model::AssignmentId)), so nothing holds
//! a back-pointer.
//!
//! ### Errors
//! Operations fail with [`AllocationError`](error::AllocationError). Errors raised inside an
//! actor survive the trip back through the framework with their variant intact.
//!
//! ### Side effects
//! Notifications are queued, never awaited. Inventory release and order binding are best
//! effort. Their failures are logged, not returned.
//!
//! ## Module Tour
//!
//! - [`framework`] - the generic actor, client, messages and mocks
//! - [`model`] - plain data: rounds, signups, orders, assignments, capacity, rate limits
//! - [`user_actor`], [`inventory_actor`], [`round_actor`], [`order_actor`] - the entities
//! - [`clients`] - typed wrappers over the generic client
//! - [`allocation`] - the services: signup, lottery, capacity, binding, claims, rate limits
//! - [`notification`] - the outbound queue and its worker
//! - [`lifecycle`] - [`OutreachSystem`](lifecycle::OutreachSystem), maintenance, tracing
//! - [`config`], [`clock`], [`collaborators`], [`error`] - the ambient pieces
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod allocation;
pub mod clients;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod framework;
pub mod inventory_actor;
pub mod lifecycle;
pub mod model;
pub mod notification;
pub mod order_actor;
pub mod round_actor;
pub mod user_actor;

pub use error::{AllocationError, ORDER_ALREADY_ACCEPTED};
