//! Shared type definitions for the `ChickenHunt` economic engine.
//!
//! This crate is the single source of truth for the records, identifiers
//! and events exchanged between the engine, the stock ledger and any
//! observer. Types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and catalogue index aliases
//! - [`enums`] -- Attributes, attribute tiers and stat kinds
//! - [`structs`] -- Player records, catalogue entries, altar buckets
//! - [`events`] -- Events emitted on every state transition

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Attribute, AttributeTier, StatKind};
pub use events::{ConfigChange, EventRecord, GameEvent};
pub use ids::{AltarRecordId, EventId, ItemId, PetId, PlayerId};
pub use structs::{
    AltarRecord, AttributeTiers, Attributes, DepotTier, Distribution, HunterView, Item,
    PetDefinition, Player, PlayerDetails, Stat, StoreSlot, TierPricing, TradeBook,
};
