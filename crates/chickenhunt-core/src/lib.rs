//! Game engine for the `ChickenHunt` economy.
//!
//! Players accrue chicken over time, spend chicken and wei on upgrades,
//! raid each other in the arena and trade chicken for wei at the altar.
//! Every wei paid in is split between shareholders, the altar fund, the
//! store owner and the developer.
//!
//! # Modules
//!
//! - [`accrual`] -- Lazy chicken production from the hunting stat.
//! - [`altar`] -- Day-bucketed chicken-for-currency market.
//! - [`arena`] -- Combat resolution and the [`Entropy`] seam.
//! - [`clock`] -- The [`Clock`] seam and altar day indexing.
//! - [`committee`] -- Administrative operations.
//! - [`config`] -- Loading `chickenhunt-config.yaml` into [`GameConfig`].
//! - [`distribution`] -- Splitting payments into their cuts.
//! - [`error`] -- The [`GameError`] type.
//! - [`game`] -- The [`ChickenHunt`] engine.
//! - [`progression`] -- Cost curves for attributes, pets, depots and
//!   resales.
//!
//! [`Entropy`]: arena::Entropy
//! [`Clock`]: clock::Clock
//! [`GameConfig`]: config::GameConfig
//! [`GameError`]: error::GameError
//! [`ChickenHunt`]: game::ChickenHunt

pub mod accrual;
pub mod altar;
pub mod arena;
pub mod clock;
pub mod committee;
pub mod config;
pub mod distribution;
pub mod error;
pub mod game;
pub mod progression;

pub use arena::{CombatOutcome, ConstantEntropy, Entropy, SeededEntropy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use committee::Committee;
pub use config::GameConfig;
pub use error::GameError;
pub use game::ChickenHunt;
