//! Enumeration types for the `ChickenHunt` economic engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// One of the four upgradable hunter attributes.
///
/// Strength and dexterity drive hunting and offense; constitution and
/// resistance drive defense. Each attribute belongs to an
/// [`AttributeTier`] which fixes its cost curve and level cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Quadratic factor of hunting and offense power.
    Strength,
    /// Linear factor of hunting and offense power.
    Dexterity,
    /// Quadratic factor of defense power.
    Constitution,
    /// Linear factor of defense power.
    Resistance,
}

impl Attribute {
    /// All attributes, in display order.
    pub const ALL: [Self; 4] = [
        Self::Strength,
        Self::Dexterity,
        Self::Constitution,
        Self::Resistance,
    ];

    /// The pricing tier this attribute is billed under.
    pub const fn tier(self) -> AttributeTier {
        match self {
            Self::Strength | Self::Constitution => AttributeTier::Quadratic,
            Self::Dexterity | Self::Resistance => AttributeTier::Linear,
        }
    }

    /// Lowercase attribute name as used in events and scenario files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Constitution => "constitution",
            Self::Resistance => "resistance",
        }
    }
}

impl core::fmt::Display for Attribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing tier of an attribute.
///
/// Quadratic attributes contribute `level²` to power and are cheap per level
/// with a high cap; linear attributes contribute `10 + 2(level - 1)` and are
/// expensive per level with a low cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AttributeTier {
    /// Strength and constitution.
    Quadratic,
    /// Dexterity and resistance.
    Linear,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// One of the three power/multiplier pairs carried by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// Drives resource accrual.
    Hunting,
    /// Drives attack score in the arena.
    Offense,
    /// Drives defense score in the arena.
    Defense,
}
