//! Scenario files and their replay against the engine.
//!
//! A scenario names its players, then lists steps. Each step is either a
//! game operation performed by a named player or a clock advance. Steps run
//! in order on a [`ManualClock`], so a scenario replays identically every
//! time.
//!
//! ```yaml
//! start: 1700000000
//! committee: dev
//! players: [alice, bob]
//! steps:
//!   - action: advance
//!     seconds: 3600
//!   - action: buy_depots
//!     player: alice
//!     amount: 1
//!     sent: 50000000000000000
//!   - action: attack
//!     attacker: bob
//!     defender: alice
//! ```
//!
//! A rejected step is logged and skipped unless the scenario is `strict`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use chickenhunt_core::{ChickenHunt, Clock, GameConfig, GameError, ManualClock, SeededEntropy};
use chickenhunt_ledger::{SolvencyResult, verify_solvency};
use chickenhunt_types::{Attribute, EventRecord, ItemId, PetId, PlayerId};
use uuid::Uuid;

use crate::error::SimError;

/// A parsed scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    /// Unix second the game starts at.
    #[serde(default)]
    pub start: u64,

    /// Name of the committee account.
    #[serde(default = "default_committee")]
    pub committee: String,

    /// Names of the players joined right after genesis.
    #[serde(default)]
    pub players: Vec<String>,

    /// Abort on the first rejected step.
    #[serde(default)]
    pub strict: bool,

    /// Steps to replay, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_committee() -> String {
    String::from("committee")
}

/// One scenario step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Move the clock forward.
    Advance {
        /// Seconds to advance.
        seconds: u64,
    },
    /// Fold pending chicken into the saved balance.
    SaveChicken {
        /// Player name.
        player: String,
    },
    /// Move chicken between players.
    TransferChicken {
        /// Sender name.
        from: String,
        /// Receiver name.
        to: String,
        /// Chicken moved.
        amount: u128,
    },
    /// Raise an attribute.
    UpgradeAttribute {
        /// Player name.
        player: String,
        /// Attribute raised.
        attribute: Attribute,
        /// Target level.
        to: u32,
        /// Wei sent.
        sent: u128,
    },
    /// Buy pet levels.
    BuyPets {
        /// Player name.
        player: String,
        /// Pet id.
        pet: PetId,
        /// Levels bought.
        amount: u32,
        /// Wei sent.
        sent: u128,
    },
    /// Buy depots.
    BuyDepots {
        /// Player name.
        player: String,
        /// Depots bought.
        amount: u32,
        /// Wei sent.
        sent: u128,
    },
    /// Buy an item from its owner.
    BuyItem {
        /// Player name.
        player: String,
        /// Item id.
        item: ItemId,
        /// Wei sent.
        sent: u128,
    },
    /// Buy the store.
    BuyStore {
        /// Player name.
        player: String,
        /// Wei sent.
        sent: u128,
    },
    /// Attack another player.
    Attack {
        /// Attacker name.
        attacker: String,
        /// Defender name.
        defender: String,
    },
    /// Deposit chicken at the altar.
    ChickenToAltar {
        /// Player name.
        player: String,
        /// Chicken deposited.
        amount: u128,
    },
    /// Settle a matured altar position.
    EthereumFromAltar {
        /// Player name.
        player: String,
    },
    /// Move shares between players.
    TransferShares {
        /// Sender name.
        from: String,
        /// Receiver name.
        to: String,
        /// Shares moved.
        amount: u128,
    },
    /// Redeem all shares for dividends.
    RedeemShares {
        /// Player name.
        player: String,
    },
    /// Drain a wallet.
    Withdraw {
        /// Player name.
        player: String,
    },
    /// Pay the store balance to the store owner.
    WithdrawStoreBalance,
    /// Pay the developer fee to the developer.
    WithdrawDevFee,
    /// Run the solvency audit.
    Audit,
}

/// Totals reported after a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    /// Steps that succeeded.
    pub applied: usize,
    /// Steps the engine rejected.
    pub rejected: usize,
    /// Events emitted, genesis included.
    pub events: usize,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, SimError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// A scenario bound to a running engine.
#[derive(Debug)]
pub struct Replay {
    game: ChickenHunt<ManualClock, SeededEntropy>,
    names: BTreeMap<String, PlayerId>,
    strict: bool,
}

impl Replay {
    /// Start an engine for `scenario` and join its players.
    ///
    /// Player ids are derived from declaration order, so the committee is
    /// always id 1 and the n-th player id `n + 1`.
    pub fn new(scenario: &Scenario, config: GameConfig) -> Result<Self, SimError> {
        let mut names = BTreeMap::new();
        let declared = std::iter::once(&scenario.committee).chain(&scenario.players);
        for (id, name) in (1_u128..).zip(declared) {
            let player = PlayerId::from(Uuid::from_u128(id));
            if names.insert(name.clone(), player).is_some() {
                return Err(SimError::DuplicatePlayer { name: name.clone() });
            }
        }
        let committee = lookup(&names, &scenario.committee)?;

        let seed = config.arena.seed;
        let mut game = ChickenHunt::new(
            config,
            committee,
            ManualClock::new(scenario.start),
            SeededEntropy::new(seed),
        )?;
        for name in &scenario.players {
            let player = lookup(&names, name)?;
            game.join(player)?;
        }
        info!(players = names.len(), start = scenario.start, "Scenario loaded");
        Ok(Self {
            game,
            names,
            strict: scenario.strict,
        })
    }

    /// The engine being driven.
    pub const fn game(&self) -> &ChickenHunt<ManualClock, SeededEntropy> {
        &self.game
    }

    /// Id bound to a player name.
    pub fn player(&self, name: &str) -> Result<PlayerId, SimError> {
        lookup(&self.names, name)
    }

    /// Events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.game.drain_events()
    }

    /// Run every step, handing each batch of events to `sink` as it is
    /// emitted.
    pub fn run<F>(&mut self, steps: &[Step], mut sink: F) -> Result<ReplaySummary, SimError>
    where
        F: FnMut(&EventRecord) -> Result<(), SimError>,
    {
        let mut summary = ReplaySummary::default();
        for record in self.drain_events() {
            summary.events = summary.events.saturating_add(1);
            sink(&record)?;
        }
        for (index, step) in steps.iter().enumerate() {
            match self.apply(step) {
                Ok(()) => summary.applied = summary.applied.saturating_add(1),
                Err(SimError::Game { source }) if !self.strict => {
                    warn!(step = index, ?step, error = %source, "Step rejected");
                    summary.rejected = summary.rejected.saturating_add(1);
                }
                Err(err) => return Err(err),
            }
            for record in self.drain_events() {
                summary.events = summary.events.saturating_add(1);
                sink(&record)?;
            }
        }
        info!(
            applied = summary.applied,
            rejected = summary.rejected,
            events = summary.events,
            "Scenario finished"
        );
        Ok(summary)
    }

    /// Apply a single step.
    pub fn apply(&mut self, step: &Step) -> Result<(), SimError> {
        match step {
            Step::Advance { seconds } => {
                let now = self
                    .game
                    .clock_mut()
                    .advance(*seconds)
                    .map_err(GameError::from)?;
                info!(now, "Clock advanced");
            }
            Step::SaveChicken { player } => {
                let player = self.player(player)?;
                self.game.save_chicken_of(player)?;
            }
            Step::TransferChicken { from, to, amount } => {
                let (from, to) = (self.player(from)?, self.player(to)?);
                self.game.transfer_chicken(from, to, *amount)?;
            }
            Step::UpgradeAttribute {
                player,
                attribute,
                to,
                sent,
            } => {
                let player = self.player(player)?;
                self.game.upgrade_attribute(player, *attribute, *to, *sent)?;
            }
            Step::BuyPets {
                player,
                pet,
                amount,
                sent,
            } => {
                let player = self.player(player)?;
                self.game.buy_pets(player, *pet, *amount, *sent)?;
            }
            Step::BuyDepots {
                player,
                amount,
                sent,
            } => {
                let player = self.player(player)?;
                self.game.buy_depots(player, *amount, *sent)?;
            }
            Step::BuyItem { player, item, sent } => {
                let player = self.player(player)?;
                self.game.buy_item(player, *item, *sent)?;
            }
            Step::BuyStore { player, sent } => {
                let player = self.player(player)?;
                self.game.buy_store(player, *sent)?;
            }
            Step::Attack { attacker, defender } => {
                let (attacker, defender) = (self.player(attacker)?, self.player(defender)?);
                self.game.attack(attacker, defender)?;
            }
            Step::ChickenToAltar { player, amount } => {
                let player = self.player(player)?;
                self.game.chicken_to_altar(player, *amount)?;
            }
            Step::EthereumFromAltar { player } => {
                let player = self.player(player)?;
                self.game.ethereum_from_altar(player)?;
            }
            Step::TransferShares { from, to, amount } => {
                let (from, to) = (self.player(from)?, self.player(to)?);
                self.game.transfer_shares(from, to, *amount)?;
            }
            Step::RedeemShares { player } => {
                let player = self.player(player)?;
                self.game.redeem_shares(player)?;
            }
            Step::Withdraw { player } => {
                let player = self.player(player)?;
                self.game.withdraw(player)?;
            }
            Step::WithdrawStoreBalance => {
                self.game.withdraw_store_balance()?;
            }
            Step::WithdrawDevFee => {
                self.game.withdraw_dev_fee()?;
            }
            Step::Audit => {
                let snapshot = self.game.solvency_snapshot()?;
                let totals = serde_json::to_string(&snapshot)?;
                match verify_solvency(&snapshot) {
                    SolvencyResult::Solvent { surplus } => {
                        info!(
                            surplus,
                            %totals,
                            now = self.game.clock().now(),
                            "Solvency audit passed"
                        );
                    }
                    SolvencyResult::Anomaly(anomaly) => {
                        warn!(%anomaly, %totals, "Solvency audit failed");
                    }
                }
            }
        }
        Ok(())
    }
}

fn lookup(names: &BTreeMap<String, PlayerId>, name: &str) -> Result<PlayerId, SimError> {
    names
        .get(name)
        .copied()
        .ok_or_else(|| SimError::UnknownPlayer {
            name: name.to_owned(),
        })
}
