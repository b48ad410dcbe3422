//! The administrative surface.
//!
//! One account, the committee, may retune the economy: the distribution
//! table, the combat cooldown, attribute tiers, the pet and item catalogues
//! and depot pricing. Every change is validated like a launch config and
//! logged as a [`GameEvent::ConfigurationChange`].
//!
//! Caps only grow. Lowering a max would strand players already above it.

use tracing::info;

use chickenhunt_types::{
    AttributeTiers, ConfigChange, DepotTier, Distribution, GameEvent, Item, ItemId,
    PetDefinition, PetId, PlayerId,
};

use crate::arena::Entropy;
use crate::clock::Clock;
use crate::distribution;
use crate::error::GameError;
use crate::game::{ChickenHunt, apply_item_bonus, index};

/// Administrative state held by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committee {
    /// The account allowed to change configuration.
    pub admin: PlayerId,
    /// Receiver of the developer fee.
    pub developer: PlayerId,
    /// Developer fee accrued and not yet withdrawn.
    pub dev_fee: u128,
}

impl Committee {
    /// A committee where `admin` is also the developer.
    pub const fn new(admin: PlayerId) -> Self {
        Self {
            admin,
            developer: admin,
            dev_fee: 0,
        }
    }

    /// Reject any caller but the admin.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Unauthorized`] for every other caller.
    pub fn authorize(&self, caller: PlayerId) -> Result<(), GameError> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(GameError::Unauthorized { caller })
        }
    }
}

fn ensure_max_grows(what: &str, old: u32, new: u32) -> Result<(), GameError> {
    if new < old {
        return Err(GameError::invalid_range(format!(
            "{what} max cannot decrease from {old} to {new}"
        )));
    }
    Ok(())
}

impl<C: Clock, E: Entropy> ChickenHunt<C, E> {
    /// The administrative state.
    pub const fn committee(&self) -> Committee {
        self.committee
    }

    /// Receiver of the developer fee.
    pub const fn developer(&self) -> PlayerId {
        self.committee.developer
    }

    /// Developer fee accrued and not yet withdrawn.
    pub const fn dev_fee(&self) -> u128 {
        self.committee.dev_fee
    }

    fn config_changed(&mut self, change: ConfigChange) {
        info!(?change, "Configuration changed");
        self.emit(GameEvent::ConfigurationChange { change });
    }

    /// Replace the payment distribution table.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigurationInvalid`] unless the cuts sum to
    /// 100 with a positive store cut.
    pub fn set_distribution(
        &mut self,
        caller: PlayerId,
        distribution: Distribution,
    ) -> Result<(), GameError> {
        self.committee.authorize(caller)?;
        distribution::validate(distribution)?;
        self.distribution = distribution;
        self.config_changed(ConfigChange::Distribution { distribution });
        Ok(())
    }

    /// Change the post-attack cooldown.
    pub fn set_cooldown_time(&mut self, caller: PlayerId, seconds: u64) -> Result<(), GameError> {
        self.committee.authorize(caller)?;
        self.cooldown_time = seconds;
        self.config_changed(ConfigChange::CooldownTime { seconds });
        Ok(())
    }

    /// Replace attribute tier pricing. Tier maxima may only grow.
    pub fn set_attribute_tiers(
        &mut self,
        caller: PlayerId,
        tiers: AttributeTiers,
    ) -> Result<(), GameError> {
        self.committee.authorize(caller)?;
        ensure_max_grows("quadratic tier", self.tiers.quadratic.max, tiers.quadratic.max)?;
        ensure_max_grows("linear tier", self.tiers.linear.max, tiers.linear.max)?;
        self.tiers = tiers;
        self.config_changed(ConfigChange::AttributeTiers { tiers });
        Ok(())
    }

    /// Append a pet template. Returns its id.
    pub fn add_pet(&mut self, caller: PlayerId, definition: PetDefinition) -> Result<PetId, GameError> {
        self.committee.authorize(caller)?;
        if definition.max == 0 {
            return Err(GameError::invalid_range("pet max must be positive"));
        }
        let pet = PetId::try_from(self.pets.len())
            .ok()
            .ok_or(GameError::overflow("pet catalogue"))?;
        self.pets.push(definition);
        self.config_changed(ConfigChange::PetAdded { pet, definition });
        Ok(pet)
    }

    /// Replace a pet template. Its max may only grow.
    ///
    /// Power already granted to players is kept; the new powers apply to
    /// later purchases.
    pub fn change_pet(
        &mut self,
        caller: PlayerId,
        pet: PetId,
        definition: PetDefinition,
    ) -> Result<(), GameError> {
        self.committee.authorize(caller)?;
        let slot = index(pet)
            .and_then(|idx| self.pets.get_mut(idx))
            .ok_or(GameError::UnknownPet { pet })?;
        ensure_max_grows("pet", slot.max, definition.max)?;
        *slot = definition;
        self.config_changed(ConfigChange::PetChanged { pet, definition });
        Ok(())
    }

    /// Mint a new item owned by the committee, whose multipliers gain its
    /// bonuses. Returns its id.
    pub fn add_item(
        &mut self,
        caller: PlayerId,
        hunting_bonus: u16,
        offense_bonus: u16,
        defense_bonus: u16,
        cost: u128,
    ) -> Result<ItemId, GameError> {
        self.committee.authorize(caller)?;
        let id = ItemId::try_from(self.items.len())
            .ok()
            .ok_or(GameError::overflow("item catalogue"))?;
        let item = Item {
            owner: caller,
            hunting_bonus,
            offense_bonus,
            defense_bonus,
            cost,
        };
        let now = self.now();
        let mut admin = self.player(caller)?.clone();
        crate::accrual::settle(&mut admin, now)?;
        apply_item_bonus(&mut admin, &item, true)?;

        self.players.insert(caller, admin);
        self.items.push(item);
        self.config_changed(ConfigChange::ItemAdded {
            item: id,
            hunting_bonus,
            offense_bonus,
            defense_bonus,
            cost,
        });
        Ok(id)
    }

    /// Replace depot pricing. The max may only grow.
    pub fn set_depot(&mut self, caller: PlayerId, depot: DepotTier) -> Result<(), GameError> {
        self.committee.authorize(caller)?;
        ensure_max_grows("depot", self.depot.max, depot.max)?;
        self.depot = depot;
        self.config_changed(ConfigChange::Depot { depot });
        Ok(())
    }

    /// Hand the developer role to another account. The fee accrued so far
    /// is paid to the outgoing developer first.
    pub fn set_developer(&mut self, caller: PlayerId, developer: PlayerId) -> Result<(), GameError> {
        self.committee.authorize(caller)?;
        self.withdraw_dev_fee()?;
        self.committee.developer = developer;
        self.config_changed(ConfigChange::Developer { developer });
        Ok(())
    }

    /// Pay the accrued developer fee into the developer's wallet. Anyone may
    /// call this. Returns the wei paid.
    pub fn withdraw_dev_fee(&mut self) -> Result<u128, GameError> {
        let developer = self.committee.developer;
        let value = self.committee.dev_fee;
        self.wallet.credit(developer, value)?;
        self.committee.dev_fee = 0;
        if value > 0 {
            self.emit(GameEvent::DevFeeWithdrawn { developer, value });
            info!(%developer, value, "Developer fee withdrawn");
        }
        Ok(value)
    }

    /// Hand the committee seat to another account.
    ///
    /// The account is not joined. It must join before it can call
    /// [`Self::add_item`], which grants the new item's bonus to the caller.
    pub fn set_committee(&mut self, caller: PlayerId, committee: PlayerId) -> Result<(), GameError> {
        self.committee.authorize(caller)?;
        self.committee.admin = committee;
        self.config_changed(ConfigChange::Committee { committee });
        Ok(())
    }
}
