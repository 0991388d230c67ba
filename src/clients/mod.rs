//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).
//!
//! Each wrapper turns actions and queries into plain async methods with domain return types,
//! so callers never match on an `ActionResult` enum.

pub mod inventory_client;
pub mod order_client;
pub mod round_client;
pub mod user_client;

pub use inventory_client::*;
pub use order_client::*;
pub use round_client::*;
pub use user_client::*;
