//! The error type returned by every engine operation.
//!
//! All errors are fail-fast: an operation that returns one of these has
//! left the engine exactly as it found it.

use chickenhunt_ledger::LedgerError;
use chickenhunt_types::{AltarRecordId, ItemId, PetId, PlayerId};

use crate::clock::ClockError;

/// Errors that can occur when applying a game operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The player's settled chicken does not cover the cost.
    #[error("player {player} has {available} chicken, {required} required")]
    InsufficientResource {
        /// The spending player.
        player: PlayerId,
        /// Chicken required.
        required: u128,
        /// Chicken available after settlement.
        available: u128,
    },

    /// Less currency was sent than the operation costs.
    #[error("payment of {sent} wei is below the required {required} wei")]
    InsufficientPayment {
        /// Wei required.
        required: u128,
        /// Wei sent.
        sent: u128,
    },

    /// A level, amount or cap parameter is out of range.
    #[error("invalid range: {reason}")]
    InvalidRange {
        /// What was out of range.
        reason: String,
    },

    /// A non-committee caller tried an administrative operation.
    #[error("{caller} is not the committee")]
    Unauthorized {
        /// The rejected caller.
        caller: PlayerId,
    },

    /// The attacker is still cooling down.
    #[error("player {player} cannot attack until {until}, now {now}")]
    Cooldown {
        /// The attacker.
        player: PlayerId,
        /// Unix second the cooldown ends.
        until: u64,
        /// Current unix second.
        now: u64,
    },

    /// An altar position was settled on the day it was opened.
    #[error("altar record {record} has not matured (today is day {today})")]
    NotMatured {
        /// Day bucket of the position.
        record: AltarRecordId,
        /// Current day index.
        today: AltarRecordId,
    },

    /// A configuration value is rejected.
    #[error("invalid configuration: {reason}")]
    ConfigurationInvalid {
        /// What is wrong.
        reason: String,
    },

    /// The account never joined.
    #[error("unknown player {player}")]
    UnknownPlayer {
        /// The unknown account.
        player: PlayerId,
    },

    /// The account already joined.
    #[error("player {player} already joined")]
    AlreadyJoined {
        /// The existing account.
        player: PlayerId,
    },

    /// No pet template with this id.
    #[error("unknown pet {pet}")]
    UnknownPet {
        /// The requested pet id.
        pet: PetId,
    },

    /// No item with this id.
    #[error("unknown item {item}")]
    UnknownItem {
        /// The requested item id.
        item: ItemId,
    },

    /// An intermediate value left its integer range.
    #[error("arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// The operation that overflowed.
        operation: &'static str,
    },

    /// The stock ledger or a wallet rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The clock could not produce a day index.
    #[error(transparent)]
    Clock(#[from] ClockError),
}

impl GameError {
    /// Shorthand for [`GameError::InvalidRange`].
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`GameError::ConfigurationInvalid`].
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`GameError::ArithmeticOverflow`].
    pub const fn overflow(operation: &'static str) -> Self {
        Self::ArithmeticOverflow { operation }
    }
}
