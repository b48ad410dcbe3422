//! Solvency verification for the game's currency.
//!
//! Currency enters through payments and leaves only through wallet
//! withdrawals. Everything in between is a liability: wallet balances,
//! unredeemed dividends, the altar fund and its open reservations, the
//! store balance and the developer fee. The check is:
//!
//! ```text
//! sum(liabilities) <= received - withdrawn
//! ```
//!
//! Distribution cuts truncate and dividend reads round down, so the game
//! normally holds a small surplus of dust. A shortfall means currency was
//! promised twice and produces a [`LedgerAnomaly`].

use serde::Serialize;
use tracing::warn;

use crate::LedgerAnomaly;

/// Every currency total needed for a solvency check, captured at one
/// instant. Serializes as a flat JSON object for audit output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolvencySnapshot {
    /// Wei ever received, refunds included.
    pub received: u128,
    /// Wei ever withdrawn from wallets.
    pub withdrawn: u128,
    /// Sum of wallet balances.
    pub wallets: u128,
    /// Sum of unredeemed dividends.
    pub pending_dividends: u128,
    /// Unallocated altar fund.
    pub altar_fund: u128,
    /// Altar allocations reserved for buckets not yet fully settled.
    pub altar_reserved: u128,
    /// Accumulated store cut.
    pub store_balance: u128,
    /// Accumulated developer fee.
    pub dev_fee: u128,
}

/// The result of a solvency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolvencyResult {
    /// Liabilities are covered.
    Solvent {
        /// Wei held but owed to nobody (rounding dust, forfeited dividends).
        surplus: u128,
    },
    /// The game owes more than it holds, or a sum overflowed.
    Anomaly(LedgerAnomaly),
}

impl SolvencySnapshot {
    /// Sum of every liability, `None` on overflow.
    pub fn liabilities(&self) -> Option<u128> {
        [
            self.pending_dividends,
            self.altar_fund,
            self.altar_reserved,
            self.store_balance,
            self.dev_fee,
        ]
        .into_iter()
        .try_fold(self.wallets, u128::checked_add)
    }
}

/// Verify that the game can pay everything it owes.
pub fn verify_solvency(snapshot: &SolvencySnapshot) -> SolvencyResult {
    let Some(liabilities) = snapshot.liabilities() else {
        return overflow_anomaly("liabilities");
    };
    let Some(assets) = snapshot.received.checked_sub(snapshot.withdrawn) else {
        return overflow_anomaly("assets");
    };

    if let Some(surplus) = assets.checked_sub(liabilities) {
        return SolvencyResult::Solvent { surplus };
    }
    let shortfall = liabilities.saturating_sub(assets);
    warn!(liabilities, assets, shortfall, "Solvency anomaly");
    SolvencyResult::Anomaly(LedgerAnomaly {
        liabilities,
        assets,
        message: format!(
            "LEDGER_ANOMALY: liabilities {liabilities} exceed assets {assets} by {shortfall}",
        ),
    })
}

/// Construct an anomaly result for arithmetic overflow during summation.
fn overflow_anomaly(what: &str) -> SolvencyResult {
    SolvencyResult::Anomaly(LedgerAnomaly {
        liabilities: 0,
        assets: 0,
        message: format!("LEDGER_ANOMALY: arithmetic overflow while summing {what}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_solvent() {
        let result = verify_solvency(&SolvencySnapshot::default());
        assert_eq!(result, SolvencyResult::Solvent { surplus: 0 });
    }

    #[test]
    fn dust_is_reported_as_surplus() {
        let snapshot = SolvencySnapshot {
            received: 1_000,
            withdrawn: 100,
            wallets: 50,
            pending_dividends: 199,
            altar_fund: 600,
            altar_reserved: 0,
            store_balance: 10,
            dev_fee: 40,
        };
        assert_eq!(verify_solvency(&snapshot), SolvencyResult::Solvent { surplus: 1 });
    }

    #[test]
    fn double_promise_is_an_anomaly() {
        let snapshot = SolvencySnapshot {
            received: 100,
            wallets: 60,
            altar_fund: 60,
            ..SolvencySnapshot::default()
        };
        let SolvencyResult::Anomaly(anomaly) = verify_solvency(&snapshot) else {
            panic!("expected anomaly");
        };
        assert_eq!(anomaly.liabilities, 120);
        assert_eq!(anomaly.assets, 100);
        assert!(anomaly.to_string().contains("LEDGER_ANOMALY"));
    }

    #[test]
    fn snapshot_serializes_every_total() {
        let snapshot = SolvencySnapshot {
            received: 1_000,
            withdrawn: 100,
            altar_fund: 900,
            ..SolvencySnapshot::default()
        };
        let value = serde_json::to_value(snapshot).unwrap();
        assert_eq!(value["received"], 1_000);
        assert_eq!(value["withdrawn"], 100);
        assert_eq!(value["altar_fund"], 900);
        assert_eq!(value["dev_fee"], 0);
        assert_eq!(value.as_object().unwrap().len(), 8);
    }

    #[test]
    fn overflowing_liabilities_are_an_anomaly() {
        let snapshot = SolvencySnapshot {
            received: u128::MAX,
            wallets: u128::MAX,
            dev_fee: 1,
            ..SolvencySnapshot::default()
        };
        assert!(matches!(
            verify_solvency(&snapshot),
            SolvencyResult::Anomaly(_)
        ));
    }
}
