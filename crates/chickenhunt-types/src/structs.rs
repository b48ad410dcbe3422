//! Core records owned by the engine: players, catalogue entries, altar
//! buckets and the distribution table.
//!
//! These are plain data. All mutation rules (settlement before a rate
//! change, cost curves, ownership transfer) live in `chickenhunt-core`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Attribute, AttributeTier, StatKind};
use crate::ids::{AltarRecordId, PlayerId};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A power/multiplier pair.
///
/// `power` is the attribute contribution plus pet contributions;
/// `multiplier` is the base of 10 plus the bonuses of owned items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Stat {
    /// Additive power.
    pub power: u64,
    /// Percentage-style multiplier (10 = base).
    pub multiplier: u64,
}

impl Stat {
    /// Construct a stat from its two parts.
    pub const fn new(power: u64, multiplier: u64) -> Self {
        Self { power, multiplier }
    }
}

/// The four hunter attribute levels. Every level starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Attributes {
    /// Strength level.
    pub strength: u32,
    /// Dexterity level.
    pub dexterity: u32,
    /// Constitution level.
    pub constitution: u32,
    /// Resistance level.
    pub resistance: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: 1,
            dexterity: 1,
            constitution: 1,
            resistance: 1,
        }
    }
}

impl Attributes {
    /// Current level of one attribute.
    pub const fn level(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Resistance => self.resistance,
        }
    }

    /// Overwrite the level of one attribute.
    pub const fn set_level(&mut self, attribute: Attribute, level: u32) {
        match attribute {
            Attribute::Strength => self.strength = level,
            Attribute::Dexterity => self.dexterity = level,
            Attribute::Constitution => self.constitution = level,
            Attribute::Resistance => self.resistance = level,
        }
    }
}

/// Full per-player record, owned exclusively by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Account identity.
    pub id: PlayerId,
    /// Accrual rate inputs.
    pub hunting: Stat,
    /// Arena attack inputs.
    pub offense: Stat,
    /// Arena defense inputs.
    pub defense: Stat,
    /// Attribute levels.
    pub attributes: Attributes,
    /// Pet levels indexed by pet id. Missing trailing entries are level 0.
    pub pets: Vec<u32>,
    /// Depot count, at least 1. Divides the loot an attacker can take.
    pub depots: u32,
    /// Settled resource balance.
    pub saved_chicken: u128,
    /// Unix second of the last settlement.
    pub last_save_time: u64,
    /// Unix second before which the player cannot attack.
    pub cooldown_until: u64,
}

impl Player {
    /// Base hunting and offense power of a fresh player.
    pub const BASE_POWER: u64 = 10;
    /// Base defense power of a fresh player (includes the flat 100 bonus).
    pub const BASE_DEFENSE_POWER: u64 = 110;
    /// Base multiplier for every stat.
    pub const BASE_MULTIPLIER: u64 = 10;

    /// A freshly joined player whose accrual clock starts at `now`.
    pub fn new(id: PlayerId, now: u64) -> Self {
        Self {
            id,
            hunting: Stat::new(Self::BASE_POWER, Self::BASE_MULTIPLIER),
            offense: Stat::new(Self::BASE_POWER, Self::BASE_MULTIPLIER),
            defense: Stat::new(Self::BASE_DEFENSE_POWER, Self::BASE_MULTIPLIER),
            attributes: Attributes::default(),
            pets: Vec::new(),
            depots: 1,
            saved_chicken: 0,
            last_save_time: now,
            cooldown_until: 0,
        }
    }

    /// Level of a pet, 0 if never bought.
    pub fn pet_level(&self, pet: u32) -> u32 {
        usize::try_from(pet)
            .ok()
            .and_then(|idx| self.pets.get(idx))
            .copied()
            .unwrap_or(0)
    }

    /// Set a pet level, growing the pet vector as needed.
    pub fn set_pet_level(&mut self, pet: u32, level: u32) {
        let Ok(idx) = usize::try_from(pet) else {
            return;
        };
        if self.pets.len() <= idx {
            self.pets.resize(idx.saturating_add(1), 0);
        }
        if let Some(slot) = self.pets.get_mut(idx) {
            *slot = level;
        }
    }

    /// Borrow one of the three stats.
    pub const fn stat(&self, kind: StatKind) -> &Stat {
        match kind {
            StatKind::Hunting => &self.hunting,
            StatKind::Offense => &self.offense,
            StatKind::Defense => &self.defense,
        }
    }

    /// Mutably borrow one of the three stats.
    pub const fn stat_mut(&mut self, kind: StatKind) -> &mut Stat {
        match kind {
            StatKind::Hunting => &mut self.hunting,
            StatKind::Offense => &mut self.offense,
            StatKind::Defense => &mut self.defense,
        }
    }
}

/// The attribute levels of a player, zero for unknown accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HunterView {
    /// Strength level.
    pub strength: u32,
    /// Dexterity level.
    pub dexterity: u32,
    /// Constitution level.
    pub constitution: u32,
    /// Resistance level.
    pub resistance: u32,
}

impl From<Attributes> for HunterView {
    fn from(a: Attributes) -> Self {
        Self {
            strength: a.strength,
            dexterity: a.dexterity,
            constitution: a.constitution,
            resistance: a.resistance,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Immutable pet template. Players buy levels of a pet one unit at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PetDefinition {
    /// Hunting power added per level.
    pub hunting_power: u64,
    /// Offense power added per level.
    pub offense_power: u64,
    /// Defense power added per level.
    pub defense_power: u64,
    /// Base chicken price, scaled by the cube of the level bought.
    pub chicken: u128,
    /// Base wei price, scaled by the square of the level bought.
    pub ether: u128,
    /// Highest level a player may own.
    pub max: u32,
}

impl PetDefinition {
    /// Power this pet adds per level for the given stat.
    pub const fn power(&self, kind: StatKind) -> u64 {
        match kind {
            StatKind::Hunting => self.hunting_power,
            StatKind::Offense => self.offense_power,
            StatKind::Defense => self.defense_power,
        }
    }
}

/// A unique tradable item. Whoever owns it gets its multiplier bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Item {
    /// Current holder.
    pub owner: PlayerId,
    /// Hunting multiplier bonus.
    pub hunting_bonus: u16,
    /// Offense multiplier bonus.
    pub offense_bonus: u16,
    /// Defense multiplier bonus.
    pub defense_bonus: u16,
    /// Price the current owner paid (or the listing price for a new item).
    pub cost: u128,
}

impl Item {
    /// Multiplier bonus for the given stat.
    pub fn bonus(&self, kind: StatKind) -> u64 {
        u64::from(match kind {
            StatKind::Hunting => self.hunting_bonus,
            StatKind::Offense => self.offense_bonus,
            StatKind::Defense => self.defense_bonus,
        })
    }
}

/// The single store slot. Its owner collects the store cut of every
/// distributed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StoreSlot {
    /// Current owner.
    pub owner: PlayerId,
    /// Price the current owner paid.
    pub cost: u128,
    /// Store cut accumulated since the last withdrawal.
    pub balance: u128,
}

/// Depot price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DepotTier {
    /// Wei per depot.
    pub price: u128,
    /// Maximum depot count per player.
    pub max: u32,
}

/// Price and cap of one attribute tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TierPricing {
    /// Chicken multiplier of the cube-sum cost curve.
    pub chicken: u128,
    /// Wei multiplier of the square-sum cost curve.
    pub ether: u128,
    /// Highest reachable level.
    pub max: u32,
}

/// Pricing of both attribute tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AttributeTiers {
    /// Strength and constitution.
    pub quadratic: TierPricing,
    /// Dexterity and resistance.
    pub linear: TierPricing,
}

impl Default for AttributeTiers {
    fn default() -> Self {
        Self {
            quadratic: TierPricing {
                chicken: 100,
                ether: 10_000_000_000_000,
                max: 99,
            },
            linear: TierPricing {
                chicken: 100_000,
                ether: 1_000_000_000_000_000,
                max: 9,
            },
        }
    }
}

impl AttributeTiers {
    /// Pricing for the tier an attribute belongs to.
    pub const fn for_attribute(&self, attribute: Attribute) -> &TierPricing {
        match attribute.tier() {
            AttributeTier::Quadratic => &self.quadratic,
            AttributeTier::Linear => &self.linear,
        }
    }
}

/// Percentages routed to each stakeholder. Always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Distribution {
    /// Share minted as stock and paid out as dividends.
    pub dividend_rate: u8,
    /// Share added to the altar fund.
    pub altar_cut: u8,
    /// Share accumulated for the store owner. Never zero.
    pub store_cut: u8,
    /// Share accumulated as developer fee.
    pub dev_cut: u8,
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            dividend_rate: 20,
            altar_cut: 75,
            store_cut: 1,
            dev_cut: 4,
        }
    }
}

impl Distribution {
    /// Sum of the four cuts, widened so it cannot overflow.
    pub fn total(self) -> u16 {
        u16::from(self.dividend_rate)
            .saturating_add(u16::from(self.altar_cut))
            .saturating_add(u16::from(self.store_cut))
            .saturating_add(u16::from(self.dev_cut))
    }
}

// ---------------------------------------------------------------------------
// Altar
// ---------------------------------------------------------------------------

/// One day bucket of the altar market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AltarRecord {
    /// Wei reserved from the altar fund when the bucket opened.
    pub currency_allocated: u128,
    /// Sum of all chicken deposited into the bucket.
    pub total_resource_deposited: u128,
}

/// A player's open altar position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeBook {
    /// Day bucket the chicken was deposited into.
    pub record_id: AltarRecordId,
    /// Chicken deposited into that bucket.
    pub resource_deposited: u128,
}

// ---------------------------------------------------------------------------
// Read model
// ---------------------------------------------------------------------------

/// Everything an observer needs to render a player, balance included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerDetails {
    /// The stored record.
    pub player: Player,
    /// Balance including unsettled accrual at read time.
    pub chicken: u128,
    /// Withdrawable wei.
    pub wallet: u128,
    /// Stock shares held.
    pub shares: u128,
    /// Unredeemed dividends.
    pub dividends: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_defaults() {
        let player = Player::new(PlayerId::new(), 42);
        assert_eq!(player.hunting, Stat::new(10, 10));
        assert_eq!(player.offense, Stat::new(10, 10));
        assert_eq!(player.defense, Stat::new(110, 10));
        assert_eq!(player.attributes, Attributes::default());
        assert!(player.pets.is_empty());
        assert_eq!(player.depots, 1);
        assert_eq!(player.saved_chicken, 0);
        assert_eq!(player.last_save_time, 42);
        assert_eq!(player.cooldown_until, 0);
    }

    #[test]
    fn pet_levels_grow_lazily() {
        let mut player = Player::new(PlayerId::new(), 0);
        assert_eq!(player.pet_level(5), 0);
        player.set_pet_level(2, 3);
        assert_eq!(player.pets, vec![0, 0, 3]);
        assert_eq!(player.pet_level(2), 3);
        assert_eq!(player.pet_level(1), 0);
    }

    #[test]
    fn attribute_levels_by_name() {
        let mut attrs = Attributes::default();
        attrs.set_level(Attribute::Resistance, 7);
        assert_eq!(attrs.level(Attribute::Resistance), 7);
        assert_eq!(attrs.level(Attribute::Strength), 1);
    }

    #[test]
    fn default_distribution_sums_to_100() {
        assert_eq!(Distribution::default().total(), 100);
    }
}
