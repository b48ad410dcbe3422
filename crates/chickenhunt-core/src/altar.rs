//! The altar: a day-bucketed chicken-for-currency market.
//!
//! The altar fund grows by the altar cut of every payment. The first deposit
//! of each day opens a bucket and reserves a fixed share of the fund for it.
//! Everyone who deposits chicken into that bucket is later paid a share of
//! the reservation proportional to their deposit:
//!
//! ```text
//! income = floor(allocated * deposited / total_deposited)
//! ```
//!
//! A position can be settled from the next day on. Depositing on a later
//! day settles the matured position first.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use tracing::{debug, info};

use chickenhunt_ledger::Wallet;
use chickenhunt_types::{AltarRecord, AltarRecordId, PlayerId, TradeBook};

use crate::distribution::percent_of;
use crate::error::GameError;

/// A settled altar position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Day bucket of the position.
    pub record_id: AltarRecordId,
    /// Wei credited to the wallet.
    pub income: u128,
}

/// Everything a deposit changed, in event order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositOutcome {
    /// The bucket opened by this deposit and its allocation, if any.
    pub opened: Option<(AltarRecordId, u128)>,
    /// The matured position settled before depositing, if any.
    pub settled: Option<Settlement>,
    /// Bucket the chicken went into.
    pub record_id: AltarRecordId,
}

/// Fund, day buckets and open positions.
#[derive(Debug, Clone, Default)]
pub struct AltarPool {
    /// Unallocated currency.
    fund: u128,
    /// Allocations not yet paid out.
    reserved: u128,
    /// Percentage of the fund reserved per bucket.
    allocation_percent: u8,
    records: BTreeMap<AltarRecordId, AltarRecord>,
    books: BTreeMap<PlayerId, TradeBook>,
}

impl AltarPool {
    /// Create an empty pool reserving `allocation_percent` of the fund for
    /// each new bucket.
    pub fn new(allocation_percent: u8) -> Self {
        Self {
            allocation_percent,
            ..Self::default()
        }
    }

    /// Unallocated currency.
    pub const fn fund(&self) -> u128 {
        self.fund
    }

    /// Currency reserved for open buckets and not yet paid out.
    pub const fn reserved(&self) -> u128 {
        self.reserved
    }

    /// The bucket for a day, if one was opened.
    pub fn record(&self, id: AltarRecordId) -> Option<AltarRecord> {
        self.records.get(&id).copied()
    }

    /// A player's open position, if any.
    pub fn trade_book(&self, player: PlayerId) -> Option<TradeBook> {
        self.books.get(&player).copied()
    }

    /// Add the altar cut of a payment to the fund.
    pub fn add_to_fund(&mut self, amount: u128) -> Result<(), GameError> {
        self.fund = self
            .fund
            .checked_add(amount)
            .ok_or(GameError::overflow("altar fund"))?;
        Ok(())
    }

    /// Income a position would be paid, without settling it.
    fn income_of(&self, book: &TradeBook) -> Result<u128, GameError> {
        let Some(record) = self.records.get(&book.record_id) else {
            return Ok(0);
        };
        if record.total_resource_deposited == 0 {
            return Ok(0);
        }
        let income = U256::from(record.currency_allocated)
            .checked_mul(U256::from(book.resource_deposited))
            .and_then(|product| {
                product.checked_div(U256::from(record.total_resource_deposited))
            })
            .ok_or(GameError::overflow("altar income"))?;
        u128::try_from(income)
            .ok()
            .ok_or(GameError::overflow("altar income"))
    }

    /// Deposit `amount` chicken for `player` into today's bucket.
    ///
    /// The caller must already have checked and will spend the chicken.
    /// A matured position is settled into `wallet` first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRange`] if `amount` is zero.
    pub fn deposit(
        &mut self,
        player: PlayerId,
        amount: u128,
        today: AltarRecordId,
        wallet: &mut Wallet,
    ) -> Result<DepositOutcome, GameError> {
        if amount == 0 {
            return Err(GameError::invalid_range("altar deposit must be positive"));
        }

        // Matured position from an earlier day.
        let existing = self.trade_book(player);
        let matured = existing
            .filter(|book| book.record_id != today)
            .map(|book| self.income_of(&book).map(|income| (book, income)))
            .transpose()?;
        if let Some((_, income)) = matured {
            wallet.ensure_credit(player, income)?;
        }

        // Today's bucket, opened if needed.
        let (mut record, opened) = self.records.get(&today).map_or_else(
            || {
                let allocated = percent_of(self.fund, self.allocation_percent);
                let record = AltarRecord {
                    currency_allocated: allocated,
                    total_resource_deposited: 0,
                };
                (record, Some((today, allocated)))
            },
            |record| (*record, None),
        );
        record.total_resource_deposited = record
            .total_resource_deposited
            .checked_add(amount)
            .ok_or(GameError::overflow("altar record total"))?;

        let same_day = existing
            .filter(|book| book.record_id == today)
            .map_or(0, |book| book.resource_deposited);
        let position = same_day
            .checked_add(amount)
            .ok_or(GameError::overflow("altar position"))?;

        let (fund, reserved) = match opened {
            Some((_, allocated)) => (
                self.fund.saturating_sub(allocated),
                self.reserved
                    .checked_add(allocated)
                    .ok_or(GameError::overflow("altar reserve"))?,
            ),
            None => (self.fund, self.reserved),
        };
        let reserved = match matured {
            Some((_, income)) => reserved
                .checked_sub(income)
                .ok_or(GameError::overflow("altar reserve"))?,
            None => reserved,
        };

        // Commit.
        let settled = match matured {
            Some((book, income)) => {
                wallet.credit(player, income)?;
                debug!(%player, record = book.record_id, income, "Altar position auto-settled");
                Some(Settlement {
                    record_id: book.record_id,
                    income,
                })
            }
            None => None,
        };
        if let Some((id, allocated)) = opened {
            info!(record = id, allocated, fund, "Altar record opened");
        }
        self.fund = fund;
        self.reserved = reserved;
        self.records.insert(today, record);
        self.books.insert(
            player,
            TradeBook {
                record_id: today,
                resource_deposited: position,
            },
        );
        debug!(%player, record = today, amount, position, "Chicken deposited to altar");

        Ok(DepositOutcome {
            opened,
            settled,
            record_id: today,
        })
    }

    /// Pay out `player`'s position into `wallet`.
    ///
    /// Without an open position this is a no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotMatured`] if the position was opened today.
    pub fn settle(
        &mut self,
        player: PlayerId,
        today: AltarRecordId,
        wallet: &mut Wallet,
    ) -> Result<Option<Settlement>, GameError> {
        let Some(book) = self.trade_book(player) else {
            return Ok(None);
        };
        if book.record_id >= today {
            return Err(GameError::NotMatured {
                record: book.record_id,
                today,
            });
        }
        let income = self.income_of(&book)?;
        let reserved = self
            .reserved
            .checked_sub(income)
            .ok_or(GameError::overflow("altar reserve"))?;
        wallet.credit(player, income)?;
        self.reserved = reserved;
        self.books.remove(&player);
        debug!(%player, record = book.record_id, income, "Altar position settled");
        Ok(Some(Settlement {
            record_id: book.record_id,
            income,
        }))
    }
}
