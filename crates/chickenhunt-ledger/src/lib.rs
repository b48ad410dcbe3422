//! Dividend-bearing stock ledger and currency bookkeeping for the
//! `ChickenHunt` engine.
//!
//! Every wei that enters the game is eventually owed to someone: a holder's
//! wallet, a holder's pending dividends, the altar fund, the store owner or
//! the developer. This crate tracks the two per-holder liabilities and
//! verifies that the sum of all liabilities never exceeds what was received.
//!
//! # Architecture
//!
//! - [`stock`] -- The [`StockLedger`]: shares, allowances and O(1) dividend
//!   accounting under mint, burn and transfer.
//! - [`wallet`] -- The [`Wallet`]: per-player withdrawable currency.
//! - [`solvency`] -- Solvency and share-supply verification.
//!
//! # Dividend accounting
//!
//! Deposits raise a magnified dividend-per-share accumulator. Each holder
//! carries a signed correction that cancels the accumulator growth that
//! happened before the holder acquired their shares:
//!
//! ```text
//! dividends_of(h) = (acc * balance[h] + correction[h]) / 2^64
//! ```
//!
//! No operation iterates over holders.
//!
//! # Usage
//!
//! ```
//! use chickenhunt_ledger::StockLedger;
//! use chickenhunt_types::PlayerId;
//!
//! let mut stock = StockLedger::new();
//! let alice = PlayerId::new();
//!
//! stock.give_shares(alice, 1_000).ok();
//! assert_eq!(stock.balance_of(alice), 1_000);
//! assert_eq!(stock.dividends_of(alice).ok(), Some(1_000));
//! ```

pub mod solvency;
pub mod stock;
pub mod wallet;

// Re-export primary types at crate root.
pub use solvency::{SolvencyResult, SolvencySnapshot, verify_solvency};
pub use stock::{DividendDeposit, Redemption, StockLedger};
pub use wallet::Wallet;

use chickenhunt_types::PlayerId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when mutating the stock ledger or a wallet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A holder tried to move or burn more shares than they hold.
    #[error("holder {holder} has {balance} shares, {requested} requested")]
    InsufficientShares {
        /// The holder.
        holder: PlayerId,
        /// Shares held.
        balance: u128,
        /// Shares requested.
        requested: u128,
    },

    /// A spender tried to move more shares than they were approved for.
    #[error("spender {spender} may move {allowance} of {owner}'s shares, {requested} requested")]
    InsufficientAllowance {
        /// Share owner.
        owner: PlayerId,
        /// Approved spender.
        spender: PlayerId,
        /// Remaining allowance.
        allowance: u128,
        /// Shares requested.
        requested: u128,
    },

    /// An intermediate value left its integer range.
    #[error("arithmetic overflow in {operation}")]
    Overflow {
        /// The operation that overflowed.
        operation: &'static str,
    },

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A solvency violation: the game owes more than it ever received.
///
/// This is the ledger's most critical integrity alert. It never panics;
/// the anomaly is returned to the caller for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Sum of every outstanding liability.
    pub liabilities: u128,
    /// Currency still held by the game (received minus paid out).
    pub assets: u128,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
