//! Combat between two players.
//!
//! An attack compares two randomly perturbed scores:
//!
//! ```text
//! attack_score  = offense.power * offense.multiplier * r1
//! defense_score = defense.power * defense.multiplier * r2
//! ```
//!
//! ## Combat flow
//!
//! 1. Reject self-attacks and attackers still cooling down.
//! 2. Draw `r1, r2` from the engine's [`Entropy`] source.
//! 3. If `attack_score < defense_score` nothing happens at all.
//! 4. Otherwise the attacker plunders `floor(balance / depots)` chicken
//!    from the defender and starts a cooldown.

use alloy_primitives::U256;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use chickenhunt_types::{Player, Stat};

use crate::error::GameError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest combat weight.
pub const MIN_WEIGHT: u64 = 1;

/// Largest combat weight.
pub const MAX_WEIGHT: u64 = 100;

// ---------------------------------------------------------------------------
// Entropy
// ---------------------------------------------------------------------------

/// A source of combat weights.
pub trait Entropy {
    /// Draw `(r1, r2)`: the attack weight and the defense weight.
    fn weights(&mut self) -> (u64, u64);
}

/// Uniform weights in `MIN_WEIGHT..=MAX_WEIGHT` from a seeded generator.
#[derive(Debug, Clone)]
pub struct SeededEntropy {
    rng: StdRng,
}

impl SeededEntropy {
    /// Create a generator from a seed. Equal seeds replay equal fights.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Entropy for SeededEntropy {
    fn weights(&mut self) -> (u64, u64) {
        (
            self.rng.random_range(MIN_WEIGHT..=MAX_WEIGHT),
            self.rng.random_range(MIN_WEIGHT..=MAX_WEIGHT),
        )
    }
}

/// Fixed weights, for deterministic fights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantEntropy {
    /// Attack weight.
    pub attack: u64,
    /// Defense weight.
    pub defense: u64,
}

impl ConstantEntropy {
    /// Equal weights, so raw stats decide the fight.
    pub const fn even() -> Self {
        Self {
            attack: 1,
            defense: 1,
        }
    }
}

impl Entropy for ConstantEntropy {
    fn weights(&mut self) -> (u64, u64) {
        (self.attack, self.defense)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// The outcome of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Defense held; nothing changes.
    Repelled {
        /// Attack score.
        attack_score: U256,
        /// Defense score.
        defense_score: U256,
    },
    /// Attack won; `booty` chicken changes hands.
    Victory {
        /// Attack score.
        attack_score: U256,
        /// Defense score.
        defense_score: U256,
        /// Chicken plundered.
        booty: u128,
    },
}

/// `power * multiplier * weight` in 256 bits.
pub fn score(stat: &Stat, weight: u64) -> U256 {
    U256::from(stat.power)
        .saturating_mul(U256::from(stat.multiplier))
        .saturating_mul(U256::from(weight))
}

/// Chicken exposed to a single raid: `floor(balance / depots)`.
pub fn booty(balance: u128, depots: u32) -> u128 {
    balance.checked_div(u128::from(depots)).unwrap_or(balance)
}

/// Check that `attacker` may attack `defender` at `now`.
pub fn check_attack(attacker: &Player, defender: &Player, now: u64) -> Result<(), GameError> {
    if attacker.id == defender.id {
        return Err(GameError::invalid_range("a player cannot attack themselves"));
    }
    if now < attacker.cooldown_until {
        return Err(GameError::Cooldown {
            player: attacker.id,
            until: attacker.cooldown_until,
            now,
        });
    }
    Ok(())
}

/// Decide a fight given the drawn weights and the defender's settled
/// balance.
pub fn resolve(
    attacker: &Player,
    defender: &Player,
    (r1, r2): (u64, u64),
    defender_balance: u128,
) -> CombatOutcome {
    let attack_score = score(&attacker.offense, r1);
    let defense_score = score(&defender.defense, r2);
    if attack_score < defense_score {
        CombatOutcome::Repelled {
            attack_score,
            defense_score,
        }
    } else {
        CombatOutcome::Victory {
            attack_score,
            defense_score,
            booty: booty(defender_balance, defender.depots),
        }
    }
}

#[cfg(test)]
mod tests {
    use chickenhunt_types::PlayerId;

    use super::*;

    fn player() -> Player {
        Player::new(PlayerId::new(), 0)
    }

    #[test]
    fn fresh_defense_beats_fresh_offense_on_even_weights() {
        // 10 * 10 vs 110 * 10.
        let outcome = resolve(&player(), &player(), ConstantEntropy::even().weights(), 500);
        assert!(matches!(outcome, CombatOutcome::Repelled { .. }));
    }

    #[test]
    fn equal_scores_favour_the_attacker() {
        let mut attacker = player();
        attacker.offense = Stat::new(110, 10);
        let outcome = resolve(&attacker, &player(), (1, 1), 500);
        assert_eq!(
            outcome,
            CombatOutcome::Victory {
                attack_score: U256::from(1_100_u64),
                defense_score: U256::from(1_100_u64),
                booty: 500,
            }
        );
    }

    #[test]
    fn weights_can_swing_the_fight() {
        // 100 * 11 >= 1100 * 1
        let outcome = resolve(&player(), &player(), (11, 1), 0);
        assert!(matches!(outcome, CombatOutcome::Victory { .. }));
        let outcome = resolve(&player(), &player(), (10, 1), 0);
        assert!(matches!(outcome, CombatOutcome::Repelled { .. }));
    }

    #[test]
    fn depots_divide_booty() {
        assert_eq!(booty(1_000, 1), 1_000);
        assert_eq!(booty(1_000, 3), 333);
        assert_eq!(booty(1_000, 0), 1_000);
    }

    #[test]
    fn cooldown_and_self_attack_are_rejected() {
        let mut attacker = player();
        let defender = player();
        attacker.cooldown_until = 600;
        assert!(matches!(
            check_attack(&attacker, &defender, 599),
            Err(GameError::Cooldown { until: 600, .. })
        ));
        assert!(check_attack(&attacker, &defender, 600).is_ok());
        assert!(matches!(
            check_attack(&attacker, &attacker, 600),
            Err(GameError::InvalidRange { .. })
        ));
    }

    #[test]
    fn seeded_entropy_is_reproducible_and_bounded() {
        let mut a = SeededEntropy::new(9);
        let mut b = SeededEntropy::new(9);
        for _ in 0..100 {
            let (r1, r2) = a.weights();
            assert_eq!((r1, r2), b.weights());
            assert!((MIN_WEIGHT..=MAX_WEIGHT).contains(&r1));
            assert!((MIN_WEIGHT..=MAX_WEIGHT).contains(&r2));
        }
    }
}
