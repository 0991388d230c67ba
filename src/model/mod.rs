//! Pure data structures for the allocation core.
//!
//! Ownership runs one way: a [`Round`] owns its [`Signup`]s and its [`CapacityConfig`], an
//! [`Order`] owns its [`OrderAssignment`]s. Child ids embed the parent id, so every lookup is
//! by id and nothing holds a pointer back to its parent.

/// Declares a `u32` newtype id for an entity, e.g. `entity_id!(Round, "round")` yields
/// `RoundId` which displays as `round_7`.
macro_rules! entity_id {
    ($entity:ident, $prefix:literal) => {
        paste::paste! {
            #[doc = "Type-safe identifier for " $entity " entities."]
            #[derive(
                Debug,
                Clone,
                Copy,
                PartialEq,
                Eq,
                PartialOrd,
                Ord,
                Hash,
                serde::Serialize,
                serde::Deserialize,
            )]
            pub struct [<$entity Id>](pub u32);

            impl From<u32> for [<$entity Id>] {
                fn from(id: u32) -> Self {
                    Self(id)
                }
            }

            impl std::fmt::Display for [<$entity Id>] {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, concat!($prefix, "_{}"), self.0)
                }
            }
        }
    };
}

pub mod assignment;
pub mod capacity;
pub mod inventory;
pub mod order;
pub mod rate_limit;
pub mod round;
pub mod signup;
pub mod user;

pub use assignment::*;
pub use capacity::*;
pub use inventory::*;
pub use order::*;
pub use rate_limit::*;
pub use round::*;
pub use signup::*;
pub use user::*;
