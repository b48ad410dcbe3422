//! Per-player withdrawable currency.
//!
//! Refunds, sale proceeds, altar income, redeemed dividends and fee
//! payouts all land here. A withdrawal drains the whole balance.

use std::collections::BTreeMap;

use chickenhunt_types::PlayerId;

use crate::LedgerError;

/// Withdrawable wei per player, plus lifetime totals for auditing.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    balances: BTreeMap<PlayerId, u128>,
    /// Sum of all balances.
    outstanding: u128,
    /// Wei ever withdrawn.
    withdrawn: u128,
}

impl Wallet {
    /// Create an empty wallet book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Withdrawable wei of `player`.
    pub fn balance_of(&self, player: PlayerId) -> u128 {
        self.balances.get(&player).copied().unwrap_or(0)
    }

    /// Sum of all withdrawable balances.
    pub const fn outstanding(&self) -> u128 {
        self.outstanding
    }

    /// Wei ever withdrawn.
    pub const fn withdrawn(&self) -> u128 {
        self.withdrawn
    }

    /// Check that crediting `amount` to `player` cannot overflow.
    pub fn ensure_credit(&self, player: PlayerId, amount: u128) -> Result<(), LedgerError> {
        self.balance_of(player)
            .checked_add(amount)
            .and_then(|_| self.outstanding.checked_add(amount))
            .map(|_| ())
            .ok_or(LedgerError::Overflow {
                operation: "wallet credit",
            })
    }

    /// Add `amount` to `player`'s balance.
    pub fn credit(&mut self, player: PlayerId, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        let overflow = LedgerError::Overflow {
            operation: "wallet credit",
        };
        let balance = self
            .balance_of(player)
            .checked_add(amount)
            .ok_or_else(|| overflow.clone())?;
        let outstanding = self.outstanding.checked_add(amount).ok_or(overflow)?;
        self.balances.insert(player, balance);
        self.outstanding = outstanding;
        Ok(())
    }

    /// Drain `player`'s balance, returning the amount paid out.
    pub fn withdraw(&mut self, player: PlayerId) -> Result<u128, LedgerError> {
        let amount = self.balance_of(player);
        if amount == 0 {
            return Ok(0);
        }
        let outstanding = self
            .outstanding
            .checked_sub(amount)
            .ok_or(LedgerError::InternalError("wallet total below balance"))?;
        let withdrawn = self
            .withdrawn
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                operation: "wallet withdraw",
            })?;
        self.balances.remove(&player);
        self.outstanding = outstanding;
        self.withdrawn = withdrawn;
        Ok(amount)
    }
}
