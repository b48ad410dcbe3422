//! The profit-sharing stock ledger.
//!
//! Shares are minted to players whenever they pay into the game; a cut of
//! every payment is deposited as dividends and shared pro rata among all
//! current holders. Holders can move shares like a fungible token and
//! redeem, which pays their dividends and burns every share they hold.
//!
//! # Design
//!
//! - **Magnified accumulator**: `dividends_per_share` is scaled by `2^64`
//!   and stored as an unsigned 256-bit integer.
//! - **Signed corrections**: every balance change adjusts the holder's
//!   256-bit signed correction so already-earned dividends stay put.
//! - **Validate then commit**: every mutating method computes all new
//!   values before writing any of them, so a failed call leaves no trace.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::{I256, U256};
use tracing::{debug, warn};

use chickenhunt_types::PlayerId;

use crate::LedgerError;
use crate::wallet::Wallet;

/// The dividend magnification factor, `2^64`.
pub const MAGNITUDE: U256 = U256::from_limbs([0, 1, 0, 0]);

/// What happened to a dividend deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividendDeposit {
    /// The amount was shared among the current holders.
    Distributed {
        /// Wei deposited.
        amount: u128,
    },
    /// There were no shares outstanding, so nobody could receive it.
    Forfeited {
        /// Wei lost.
        amount: u128,
    },
}

/// Result of a successful redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    /// Shares burned.
    pub shares: u128,
    /// Dividends credited to the holder's wallet.
    pub dividends: u128,
}

// ---------------------------------------------------------------------------
// StockLedger
// ---------------------------------------------------------------------------

/// Share balances, allowances and the dividend accumulator.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    /// Shares per holder. Zero balances are removed.
    balances: BTreeMap<PlayerId, u128>,
    /// Remaining allowance keyed by `(owner, spender)`.
    allowances: BTreeMap<(PlayerId, PlayerId), u128>,
    /// Signed dividend corrections, magnified.
    corrections: BTreeMap<PlayerId, I256>,
    /// Sum of all balances.
    total_supply: u128,
    /// Dividends per share, magnified by [`MAGNITUDE`].
    dividends_per_share: U256,
    /// Wei ever distributed to holders.
    total_deposited: u128,
    /// Wei ever paid out through redemption.
    total_redeemed: u128,
    /// Wei deposited while no shares existed.
    forfeited: u128,
}

const fn overflow(operation: &'static str) -> LedgerError {
    LedgerError::Overflow { operation }
}

impl StockLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Reads --------------------------------------------------------------

    /// Shares held by `holder`.
    pub fn balance_of(&self, holder: PlayerId) -> u128 {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    /// Shares outstanding.
    pub const fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Remaining allowance `owner` granted to `spender`.
    pub fn allowance(&self, owner: PlayerId, spender: PlayerId) -> u128 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// The magnified dividends-per-share accumulator.
    pub const fn dividends_per_share(&self) -> U256 {
        self.dividends_per_share
    }

    /// Wei ever distributed to holders.
    pub const fn total_deposited(&self) -> u128 {
        self.total_deposited
    }

    /// Wei ever paid out through redemption.
    pub const fn total_redeemed(&self) -> u128 {
        self.total_redeemed
    }

    /// Wei deposited while no shares existed.
    pub const fn forfeited(&self) -> u128 {
        self.forfeited
    }

    /// Number of accounts holding shares.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Unredeemed dividends of `holder`. Reading does not burn anything.
    pub fn dividends_of(&self, holder: PlayerId) -> Result<u128, LedgerError> {
        let gross = self.magnified(self.balance_of(holder), "dividends_of")?;
        let net = gross
            .checked_add(self.correction_of(holder))
            .ok_or(overflow("dividends_of"))?;
        if net.is_negative() {
            return Err(LedgerError::InternalError("negative dividend balance"));
        }
        let scaled = net
            .into_raw()
            .checked_div(MAGNITUDE)
            .ok_or(overflow("dividends_of"))?;
        u128::try_from(scaled)
            .ok()
            .ok_or(overflow("dividends_of"))
    }

    /// Sum of every holder's unredeemed dividends.
    ///
    /// Accounts that sold or burned every share keep a correction and are
    /// included.
    pub fn total_pending_dividends(&self) -> Result<u128, LedgerError> {
        let accounts: BTreeSet<&PlayerId> =
            self.balances.keys().chain(self.corrections.keys()).collect();
        accounts.into_iter().try_fold(0_u128, |acc, holder| {
            acc.checked_add(self.dividends_of(*holder)?)
                .ok_or(overflow("total_pending_dividends"))
        })
    }

    /// Iterate over `(holder, shares)` pairs.
    pub fn holders(&self) -> impl Iterator<Item = (PlayerId, u128)> + '_ {
        self.balances.iter().map(|(holder, shares)| (*holder, *shares))
    }

    // -- Supply -------------------------------------------------------------

    /// Mint `amount` new shares to `to`.
    ///
    /// The holder's correction absorbs the current accumulator so the new
    /// shares earn only future deposits.
    pub fn mint(&mut self, to: PlayerId, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(overflow("mint supply"))?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(overflow("mint balance"))?;
        let shift = self.magnified(amount, "mint")?;
        let correction = self
            .correction_of(to)
            .checked_sub(shift)
            .ok_or(overflow("mint correction"))?;

        self.total_supply = supply;
        self.set_balance(to, balance);
        self.set_correction(to, correction);
        debug!(holder = %to, amount, supply, "Shares minted");
        Ok(())
    }

    /// Burn `amount` of `from`'s shares. Earned dividends are kept.
    pub fn burn(&mut self, from: PlayerId, amount: u128) -> Result<(), LedgerError> {
        let held = self.balance_of(from);
        let balance = held
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientShares {
                holder: from,
                balance: held,
                requested: amount,
            })?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::InternalError("supply below holder balance"))?;
        let shift = self.magnified(amount, "burn")?;
        let correction = self
            .correction_of(from)
            .checked_add(shift)
            .ok_or(overflow("burn correction"))?;

        self.total_supply = supply;
        self.set_balance(from, balance);
        self.set_correction(from, correction);
        debug!(holder = %from, amount, supply, "Shares burned");
        Ok(())
    }

    // -- Dividends ----------------------------------------------------------

    /// Share `amount` wei among current holders.
    ///
    /// With no shares outstanding the deposit is forfeited and counted in
    /// [`StockLedger::forfeited`].
    pub fn deposit_dividends(&mut self, amount: u128) -> Result<DividendDeposit, LedgerError> {
        if amount == 0 {
            return Ok(DividendDeposit::Distributed { amount });
        }
        if self.total_supply == 0 {
            let forfeited = self
                .forfeited
                .checked_add(amount)
                .ok_or(overflow("forfeit"))?;
            self.forfeited = forfeited;
            warn!(amount, "Dividends deposited with no shares outstanding, forfeited");
            return Ok(DividendDeposit::Forfeited { amount });
        }

        let accumulator = self.accumulator_after(amount, self.total_supply)?;
        let deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(overflow("total_deposited"))?;

        self.dividends_per_share = accumulator;
        self.total_deposited = deposited;
        debug!(amount, supply = self.total_supply, "Dividends deposited");
        Ok(DividendDeposit::Distributed { amount })
    }

    /// Mint `amount` shares to `to`, then deposit the same amount as
    /// dividends. The recipient shares in its own deposit.
    pub fn give_shares(
        &mut self,
        to: PlayerId,
        amount: u128,
    ) -> Result<DividendDeposit, LedgerError> {
        self.check_give_shares(to, amount)?;
        self.mint(to, amount)?;
        self.deposit_dividends(amount)
    }

    /// Check that [`StockLedger::give_shares`] would succeed, without
    /// changing anything.
    pub fn check_give_shares(&self, to: PlayerId, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(overflow("give_shares supply"))?;
        self.balance_of(to)
            .checked_add(amount)
            .ok_or(overflow("give_shares balance"))?;
        self.magnified(amount, "give_shares")?;
        if amount > 0 {
            self.accumulator_after(amount, supply)?;
            self.total_deposited
                .checked_add(amount)
                .ok_or(overflow("give_shares deposit"))?;
        }
        Ok(())
    }

    // -- Transfers ----------------------------------------------------------

    /// Move `amount` shares from `from` to `to`. Dividends already earned
    /// stay with the sender.
    pub fn transfer(
        &mut self,
        from: PlayerId,
        to: PlayerId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let held = self.balance_of(from);
        let from_balance = held
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientShares {
                holder: from,
                balance: held,
                requested: amount,
            })?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(overflow("transfer balance"))?;
        let shift = self.magnified(amount, "transfer")?;
        let from_correction = self
            .correction_of(from)
            .checked_add(shift)
            .ok_or(overflow("transfer correction"))?;
        let to_correction = self
            .correction_of(to)
            .checked_sub(shift)
            .ok_or(overflow("transfer correction"))?;

        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        self.set_correction(from, from_correction);
        self.set_correction(to, to_correction);
        debug!(%from, %to, amount, "Shares transferred");
        Ok(())
    }

    /// Allow `spender` to move up to `amount` of `owner`'s shares,
    /// replacing any previous allowance.
    pub fn approve(&mut self, owner: PlayerId, spender: PlayerId, amount: u128) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Move shares on behalf of `from`, consuming `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        spender: PlayerId,
        from: PlayerId,
        to: PlayerId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(from, spender);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                owner: from,
                spender,
                allowance,
                requested: amount,
            })?;
        self.transfer(from, to, amount)?;
        self.approve(from, spender, remaining);
        Ok(())
    }

    // -- Redemption ---------------------------------------------------------

    /// Pay `holder`'s dividends into `wallet` and burn all their shares.
    pub fn redeem(
        &mut self,
        holder: PlayerId,
        wallet: &mut Wallet,
    ) -> Result<Redemption, LedgerError> {
        let dividends = self.dividends_of(holder)?;
        let shares = self.balance_of(holder);
        let supply = self
            .total_supply
            .checked_sub(shares)
            .ok_or(LedgerError::InternalError("supply below holder balance"))?;
        let redeemed = self
            .total_redeemed
            .checked_add(dividends)
            .ok_or(overflow("total_redeemed"))?;
        wallet.ensure_credit(holder, dividends)?;

        wallet.credit(holder, dividends)?;
        self.total_supply = supply;
        self.total_redeemed = redeemed;
        self.balances.remove(&holder);
        self.corrections.remove(&holder);
        debug!(%holder, shares, dividends, "Shares redeemed");
        Ok(Redemption { shares, dividends })
    }

    // -- Internals ----------------------------------------------------------

    fn correction_of(&self, holder: PlayerId) -> I256 {
        self.corrections.get(&holder).copied().unwrap_or(I256::ZERO)
    }

    fn set_balance(&mut self, holder: PlayerId, balance: u128) {
        if balance == 0 {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, balance);
        }
    }

    fn set_correction(&mut self, holder: PlayerId, correction: I256) {
        if correction == I256::ZERO {
            self.corrections.remove(&holder);
        } else {
            self.corrections.insert(holder, correction);
        }
    }

    /// `dividends_per_share * amount` as a signed value.
    fn magnified(&self, amount: u128, operation: &'static str) -> Result<I256, LedgerError> {
        let product = self
            .dividends_per_share
            .checked_mul(U256::from(amount))
            .ok_or(overflow(operation))?;
        I256::try_from(product).ok().ok_or(overflow(operation))
    }

    /// The accumulator after depositing `amount` over `supply` shares.
    fn accumulator_after(&self, amount: u128, supply: u128) -> Result<U256, LedgerError> {
        let delta = U256::from(amount)
            .checked_mul(MAGNITUDE)
            .and_then(|scaled| scaled.checked_div(U256::from(supply)))
            .ok_or(overflow("dividend accumulator"))?;
        self.dividends_per_share
            .checked_add(delta)
            .ok_or(overflow("dividend accumulator"))
    }
}
