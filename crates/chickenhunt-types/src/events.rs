//! Events emitted by the engine, one per state transition.
//!
//! Observers consume these through the engine's event log. Every variant
//! carries the affected identities and the resulting quantities so an
//! auditor can replay the economy without reading engine state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Attribute;
use crate::ids::{AltarRecordId, EventId, ItemId, PetId, PlayerId};
use crate::structs::{AttributeTiers, DepotTier, Distribution, PetDefinition};

// ---------------------------------------------------------------------------
// Configuration changes
// ---------------------------------------------------------------------------

/// Which administrative setting changed, and its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigChange {
    /// The distribution table was replaced.
    Distribution {
        /// New percentages.
        distribution: Distribution,
    },
    /// The arena cooldown changed.
    CooldownTime {
        /// New cooldown in seconds.
        seconds: u64,
    },
    /// Attribute tier pricing changed.
    AttributeTiers {
        /// New tier table.
        tiers: AttributeTiers,
    },
    /// A pet template was added.
    PetAdded {
        /// Id assigned to the new pet.
        pet: PetId,
        /// The template.
        definition: PetDefinition,
    },
    /// An existing pet template was replaced.
    PetChanged {
        /// Pet that changed.
        pet: PetId,
        /// The replacement template.
        definition: PetDefinition,
    },
    /// A new item was listed, owned by the committee.
    ItemAdded {
        /// Id assigned to the new item.
        item: ItemId,
        /// Hunting multiplier bonus.
        hunting_bonus: u16,
        /// Offense multiplier bonus.
        offense_bonus: u16,
        /// Defense multiplier bonus.
        defense_bonus: u16,
        /// Listing cost.
        cost: u128,
    },
    /// The depot tier changed.
    Depot {
        /// New depot tier.
        depot: DepotTier,
    },
    /// The developer account changed.
    Developer {
        /// New developer.
        developer: PlayerId,
    },
    /// The committee identity changed.
    Committee {
        /// New committee.
        committee: PlayerId,
    },
}

// ---------------------------------------------------------------------------
// Game events
// ---------------------------------------------------------------------------

/// A single state transition of the economy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A player joined the game.
    Join {
        /// The new player.
        player: PlayerId,
    },
    /// Resource moved between players, by transfer or by plunder.
    ResourceTransfer {
        /// Sender.
        from: PlayerId,
        /// Receiver.
        to: PlayerId,
        /// Amount of chicken.
        value: u128,
    },
    /// A player drained their wallet.
    CurrencyWithdrawal {
        /// The withdrawing player.
        player: PlayerId,
        /// Wei paid out.
        value: u128,
    },
    /// Stock shares moved. `from` is `None` for a mint, `to` is `None` for a burn.
    StockTransfer {
        /// Sender, absent when shares are minted.
        from: Option<PlayerId>,
        /// Receiver, absent when shares are burned.
        to: Option<PlayerId>,
        /// Number of shares.
        value: u128,
    },
    /// A stock allowance was set.
    StockApproval {
        /// Share owner.
        owner: PlayerId,
        /// Allowed spender.
        spender: PlayerId,
        /// New allowance.
        value: u128,
    },
    /// A holder redeemed dividends and burned their shares.
    SharesRedeemed {
        /// The redeeming holder.
        player: PlayerId,
        /// Shares burned.
        shares: u128,
        /// Dividends credited to the wallet.
        dividends: u128,
    },
    /// A new altar day bucket was opened.
    NewAltarRecord {
        /// Day index since genesis.
        id: AltarRecordId,
        /// Wei reserved for the bucket.
        currency_allocated: u128,
    },
    /// Chicken was deposited into the altar.
    AltarDeposit {
        /// Depositor.
        player: PlayerId,
        /// Day bucket.
        id: AltarRecordId,
        /// Chicken deposited in this call.
        value: u128,
    },
    /// An altar position was settled.
    AltarSettlement {
        /// Position owner.
        player: PlayerId,
        /// Day bucket the position was in.
        id: AltarRecordId,
        /// Wei credited to the wallet.
        value: u128,
    },
    /// An attack succeeded.
    Attack {
        /// Attacker.
        attacker: PlayerId,
        /// Defender.
        defender: PlayerId,
        /// Chicken plundered.
        booty: u128,
    },
    /// An attribute was raised.
    AttributeUpgrade {
        /// The upgrading player.
        player: PlayerId,
        /// Which attribute.
        attribute: Attribute,
        /// New level.
        to: u32,
    },
    /// An item changed hands.
    ItemPurchase {
        /// Buyer.
        buyer: PlayerId,
        /// Seller.
        seller: PlayerId,
        /// Item bought.
        item: ItemId,
        /// Price paid.
        price: u128,
    },
    /// Pet levels were bought.
    PetLevelUp {
        /// The buying player.
        player: PlayerId,
        /// Which pet.
        pet: PetId,
        /// New level.
        level: u32,
    },
    /// Depots were bought.
    DepotUpgrade {
        /// The buying player.
        player: PlayerId,
        /// New depot count.
        depots: u32,
    },
    /// The store changed hands.
    StorePurchase {
        /// Buyer.
        buyer: PlayerId,
        /// Previous owner.
        seller: PlayerId,
        /// Price paid.
        price: u128,
    },
    /// The accumulated store balance was paid out to its owner.
    StoreBalanceWithdrawn {
        /// Store owner.
        owner: PlayerId,
        /// Wei paid out.
        value: u128,
    },
    /// The accumulated developer fee was paid out.
    DevFeeWithdrawn {
        /// Developer.
        developer: PlayerId,
        /// Wei paid out.
        value: u128,
    },
    /// An administrative setting changed.
    ConfigurationChange {
        /// What changed.
        change: ConfigChange,
    },
}

/// A [`GameEvent`] stamped with its identity and time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventRecord {
    /// Unique event identifier.
    pub id: EventId,
    /// Unix second at which the transition happened.
    pub at: u64,
    /// The transition.
    pub event: GameEvent,
}
