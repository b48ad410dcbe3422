//! Configuration loading and typed config structures for the `ChickenHunt`
//! engine.
//!
//! The canonical configuration lives in `chickenhunt-config.yaml` at the
//! project root. Every section is optional; missing sections and fields fall
//! back to the launch values of the game. [`GameConfig::validate`] must pass
//! before an engine is built from the configuration.

use std::path::Path;

use serde::Deserialize;

use chickenhunt_types::{AttributeTiers, DepotTier, Distribution, PetDefinition};

use crate::distribution;
use crate::error::GameError;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `chickenhunt-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Percentages routed to dividends, altar, store and developer.
    #[serde(default)]
    pub distribution: Distribution,

    /// Combat parameters.
    #[serde(default)]
    pub arena: ArenaConfig,

    /// Attribute tier pricing.
    #[serde(default)]
    pub attributes: AttributeTiers,

    /// Depot pricing.
    #[serde(default = "default_depot")]
    pub depot: DepotTier,

    /// Store slot parameters.
    #[serde(default)]
    pub store: StoreConfig,

    /// Altar market parameters.
    #[serde(default)]
    pub altar: AltarConfig,

    /// Pet catalogue at genesis.
    #[serde(default = "default_pets")]
    pub pets: Vec<PetDefinition>,

    /// Item catalogue at genesis, owned by the committee.
    #[serde(default = "default_items")]
    pub items: Vec<ItemConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::launch()
    }
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::launch());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The configuration the game launched with.
    pub fn launch() -> Self {
        Self {
            distribution: Distribution::default(),
            arena: ArenaConfig::default(),
            attributes: AttributeTiers::default(),
            depot: default_depot(),
            store: StoreConfig::default(),
            altar: AltarConfig::default(),
            pets: default_pets(),
            items: default_items(),
        }
    }

    /// Check every value the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigurationInvalid`] naming the first
    /// rejected value.
    pub fn validate(&self) -> Result<(), GameError> {
        distribution::validate(self.distribution)?;
        if self.altar.day_length == 0 {
            return Err(GameError::invalid_config("altar.day_length must be at least 1"));
        }
        if self.altar.allocation_percent > 100 {
            return Err(GameError::invalid_config(
                "altar.allocation_percent must not exceed 100",
            ));
        }
        if self.depot.max == 0 {
            return Err(GameError::invalid_config("depot.max must be at least 1"));
        }
        if self.attributes.quadratic.max == 0 || self.attributes.linear.max == 0 {
            return Err(GameError::invalid_config("attribute tier max must be at least 1"));
        }
        if let Some(idx) = self.pets.iter().position(|pet| pet.max == 0) {
            return Err(GameError::invalid_config(format!(
                "pets[{idx}].max must be at least 1"
            )));
        }
        Ok(())
    }
}

/// Combat configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ArenaConfig {
    /// Seconds an attacker must wait between attacks.
    #[serde(default = "default_cooldown_time")]
    pub cooldown_time: u64,

    /// Seed for the combat weight generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            cooldown_time: default_cooldown_time(),
            seed: default_seed(),
        }
    }
}

/// Store slot configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Listing cost of the store at genesis, in wei.
    #[serde(default = "default_store_cost")]
    pub cost: u128,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cost: default_store_cost(),
        }
    }
}

/// Altar market configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AltarConfig {
    /// Length of one altar day in seconds.
    #[serde(default = "default_day_length")]
    pub day_length: u64,

    /// Share of the fund reserved for each new day bucket.
    #[serde(default = "default_allocation_percent")]
    pub allocation_percent: u8,
}

impl Default for AltarConfig {
    fn default() -> Self {
        Self {
            day_length: default_day_length(),
            allocation_percent: default_allocation_percent(),
        }
    }
}

/// An item listed at genesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ItemConfig {
    /// Hunting multiplier bonus.
    #[serde(default)]
    pub hunting_bonus: u16,

    /// Offense multiplier bonus.
    #[serde(default)]
    pub offense_bonus: u16,

    /// Defense multiplier bonus.
    #[serde(default)]
    pub defense_bonus: u16,

    /// Listing cost in wei.
    #[serde(default = "default_item_cost")]
    pub cost: u128,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_cooldown_time() -> u64 {
    600
}

const fn default_seed() -> u64 {
    42
}

const fn default_store_cost() -> u128 {
    100_000_000_000_000_000
}

const fn default_day_length() -> u64 {
    86_400
}

const fn default_allocation_percent() -> u8 {
    10
}

const fn default_item_cost() -> u128 {
    10_000_000_000_000_000
}

const fn default_depot() -> DepotTier {
    DepotTier {
        price: 50_000_000_000_000_000,
        max: 9,
    }
}

fn default_pets() -> Vec<PetDefinition> {
    let pet = |hunting_power, offense_power, defense_power, chicken| PetDefinition {
        hunting_power,
        offense_power,
        defense_power,
        chicken,
        ether: 10_000_000_000_000_000,
        max: 9,
    };
    vec![
        pet(1_000, 0, 0, 100_000),
        pet(0, 1_000, 0, 100_000),
        pet(0, 0, 1_000, 202_500),
    ]
}

fn default_items() -> Vec<ItemConfig> {
    vec![
        ItemConfig {
            hunting_bonus: 5,
            offense_bonus: 5,
            defense_bonus: 0,
            cost: default_item_cost(),
        },
        ItemConfig {
            hunting_bonus: 0,
            offense_bonus: 0,
            defense_bonus: 5,
            cost: default_item_cost(),
        },
    ]
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn launch_config_is_valid() {
        let config = GameConfig::launch();
        assert!(config.validate().is_ok());
        assert_eq!(config.arena.cooldown_time, 600);
        assert_eq!(config.altar.day_length, 86_400);
        assert_eq!(config.pets.len(), 3);
        assert_eq!(config.pets[2].chicken, 202_500);
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.depot.price, 50_000_000_000_000_000);
        assert_eq!(config.attributes.quadratic.max, 99);
        assert_eq!(config.attributes.linear.ether, 1_000_000_000_000_000);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
distribution:
  dividend_rate: 30
  altar_cut: 60
  store_cut: 2
  dev_cut: 8

arena:
  cooldown_time: 120
  seed: 7

attributes:
  quadratic:
    chicken: 50
    ether: 1000
    max: 20
  linear:
    chicken: 5000
    ether: 100000
    max: 5

depot:
  price: 1000
  max: 4

store:
  cost: 5000

altar:
  day_length: 3600
  allocation_percent: 25

pets:
  - hunting_power: 10
    offense_power: 0
    defense_power: 0
    chicken: 100
    ether: 10
    max: 3

items:
  - hunting_bonus: 1
    cost: 77
";

        let config = GameConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_else(GameConfig::launch);

        assert_eq!(config.distribution.dividend_rate, 30);
        assert_eq!(config.arena.cooldown_time, 120);
        assert_eq!(config.attributes.linear.max, 5);
        assert_eq!(config.depot.max, 4);
        assert_eq!(config.store.cost, 5_000);
        assert_eq!(config.altar.allocation_percent, 25);
        assert_eq!(config.pets.len(), 1);
        assert_eq!(config.items[0].hunting_bonus, 1);
        assert_eq!(config.items[0].defense_bonus, 0);
        assert_eq!(config.items[0].cost, 77);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "arena:\n  cooldown_time: 30\n";
        let config = GameConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_else(GameConfig::launch);

        assert_eq!(config.arena.cooldown_time, 30);
        // Everything else uses launch values
        assert_eq!(config.arena.seed, 42);
        assert_eq!(config.distribution, Distribution::default());
        assert_eq!(config.pets.len(), 3);
        assert_eq!(config.items.len(), 2);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = GameConfig::parse("");
        assert_eq!(config.ok(), Some(GameConfig::launch()));
    }

    #[test]
    fn validate_rejects_bad_distribution() {
        let mut config = GameConfig::launch();
        config.distribution.dev_cut = 5;
        assert!(matches!(
            config.validate(),
            Err(GameError::ConfigurationInvalid { .. })
        ));

        let mut config = GameConfig::launch();
        config.distribution.store_cut = 0;
        config.distribution.dev_cut = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_caps() {
        let mut config = GameConfig::launch();
        config.pets[1].max = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::launch();
        config.altar.day_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("chickenhunt-config.yaml");
        if path.exists() {
            let config = GameConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            let config = config.ok().unwrap_or_else(GameConfig::launch);
            assert!(config.validate().is_ok());
            assert_eq!(config, GameConfig::launch());
        }
    }
}
