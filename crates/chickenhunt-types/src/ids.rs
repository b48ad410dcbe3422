//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Players and emitted events carry strongly-typed IDs so that a player
//! identifier can never be passed where an event identifier is expected.
//! Catalogue entries (pets, items) and altar records are addressed by plain
//! integer indices instead, see [`PetId`], [`ItemId`] and [`AltarRecordId`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player (the game's account address).
    PlayerId
}

define_id! {
    /// Unique identifier for an emitted game event.
    EventId
}

/// Index of a pet template in the pet catalogue.
pub type PetId = u32;

/// Index of an item in the item catalogue.
pub type ItemId = u32;

/// Altar record key: the number of whole days elapsed since genesis.
pub type AltarRecordId = u64;
