//! Splitting incoming currency among stakeholders.
//!
//! Every paid operation routes its required price through [`split_payment`].
//! Each cut truncates independently, so up to three wei of dust per payment
//! is owed to nobody. Anything sent above the price is refunded to the
//! payer's wallet.

use chickenhunt_types::Distribution;

use crate::error::GameError;

/// How one payment is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaymentSplit {
    /// Minted as shares to the payer and deposited as dividends.
    pub dividends: u128,
    /// Added to the altar fund.
    pub altar: u128,
    /// Added to the store balance.
    pub store: u128,
    /// Added to the developer fee.
    pub dev: u128,
    /// Credited back to the payer's wallet.
    pub refund: u128,
}

impl PaymentSplit {
    /// Wei routed somewhere other than the refund.
    pub fn allocated(&self) -> u128 {
        self.dividends
            .saturating_add(self.altar)
            .saturating_add(self.store)
            .saturating_add(self.dev)
    }
}

/// Reject distribution tables that do not sum to 100 or starve the store.
pub fn validate(distribution: Distribution) -> Result<(), GameError> {
    let total = distribution.total();
    if total != 100 {
        return Err(GameError::invalid_config(format!(
            "distribution must sum to 100, got {total}"
        )));
    }
    if distribution.store_cut == 0 {
        return Err(GameError::invalid_config("store cut must be positive"));
    }
    Ok(())
}

/// `floor(amount * percent / 100)` without overflowing on large amounts.
pub fn percent_of(amount: u128, percent: u8) -> u128 {
    let percent = u128::from(percent);
    let whole = amount / 100;
    let rest = amount % 100;
    whole
        .saturating_mul(percent)
        .saturating_add(rest.saturating_mul(percent) / 100)
}

/// Divide a payment of `sent` wei toward a price of `required` wei.
///
/// # Errors
///
/// Returns [`GameError::InsufficientPayment`] if `sent < required`.
pub fn split_payment(
    distribution: Distribution,
    required: u128,
    sent: u128,
) -> Result<PaymentSplit, GameError> {
    let refund = sent
        .checked_sub(required)
        .ok_or(GameError::InsufficientPayment { required, sent })?;
    Ok(PaymentSplit {
        dividends: percent_of(required, distribution.dividend_rate),
        altar: percent_of(required, distribution.altar_cut),
        store: percent_of(required, distribution.store_cut),
        dev: percent_of(required, distribution.dev_cut),
        refund,
    })
}
