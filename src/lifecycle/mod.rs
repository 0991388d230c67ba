//! # System Lifecycle & Orchestration
//!
//! Starting, wiring and stopping the actors and background tasks of the allocation core.
//!
//! ## The OutreachSystem
//!
//! [`OutreachSystem::start`] performs the steps in this order:
//!
//! 1. **Actor Creation** - one `ResourceActor` per entity type (users, inventory, rounds,
//!    orders), each with its typed client
//! 2. **Dependency Injection** - the Order actor receives the inventory client as its
//!    `Context`, so stock is reserved inside `on_create`
//! 3. **Background Tasks** - the notification worker and the maintenance sweep
//! 4. **Services** - the allocation services from [`crate::allocation`], sharing clients
//!
//! ## Dependency Injection via Context
//!
//! Dependencies are injected at `run(context)` time, not at construction:
//!
//! ```rust,ignore
//! impl ActorEntity for Round {
//!     type Context = ();
//! }
//!
//! impl ActorEntity for Order {
//!     type Context = Arc<dyn InventoryReservations>;
//! }
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Stop the sweep** - a `watch` flag ends the maintenance loop
//! 2. **Drop all clients** - closes the sender side of every channel
//! 3. **Actors detect closure** - `receiver.recv()` returns `None`
//! 4. **Await completion** - wait for every task to finish
//!
//! The dependency graph is acyclic (worker → users, orders → inventory), so channel
//! closure is enough to stop everything.
//!
//! ## Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging. See the [`tracing`] module.

pub mod maintenance;
pub mod outreach_system;
pub mod tracing;

pub use maintenance::*;
pub use outreach_system::*;
pub use tracing::*;
