//! Continuous chicken accrual.
//!
//! A player produces `hunting.power * hunting.multiplier / 100` chicken per
//! second. Nothing is stored per second: the balance is derived lazily from
//! the settled amount and the time since the last settlement.
//!
//! ```text
//! chicken_of(p, now) = saved + floor(power * multiplier * (now - last_save) / 100)
//! ```
//!
//! Any change to a player's hunting stat must be preceded by [`settle`] so
//! that the new rate only applies from that instant on.

use chickenhunt_types::{Player, Stat};

use crate::error::GameError;

/// Divisor applied to `power * multiplier` to get chicken per second.
pub const RATE_DIVISOR: u128 = 100;

/// Chicken produced by `stat` over `elapsed` seconds.
pub fn accrued(stat: &Stat, elapsed: u64) -> Result<u128, GameError> {
    u128::from(stat.power)
        .checked_mul(u128::from(stat.multiplier))
        .and_then(|rate| rate.checked_mul(u128::from(elapsed)))
        .and_then(|total| total.checked_div(RATE_DIVISOR))
        .ok_or(GameError::overflow("accrual"))
}

/// Chicken produced since the last settlement.
pub fn pending(player: &Player, now: u64) -> Result<u128, GameError> {
    accrued(&player.hunting, now.saturating_sub(player.last_save_time))
}

/// The player's balance at `now`, unsettled accrual included.
pub fn chicken_of(player: &Player, now: u64) -> Result<u128, GameError> {
    player
        .saved_chicken
        .checked_add(pending(player, now)?)
        .ok_or(GameError::overflow("chicken balance"))
}

/// Fold pending accrual into the saved balance and restart the accrual
/// clock at `now`. Returns the amount folded.
pub fn settle(player: &mut Player, now: u64) -> Result<u128, GameError> {
    let folded = pending(player, now)?;
    let saved = player
        .saved_chicken
        .checked_add(folded)
        .ok_or(GameError::overflow("settle"))?;
    player.saved_chicken = saved;
    player.last_save_time = player.last_save_time.max(now);
    Ok(folded)
}

/// Settle, then remove `amount` chicken. Returns the amount folded by the
/// settlement.
///
/// # Errors
///
/// Returns [`GameError::InsufficientResource`] if the settled balance is
/// short; the player is left untouched.
pub fn spend(player: &mut Player, amount: u128, now: u64) -> Result<u128, GameError> {
    let available = chicken_of(player, now)?;
    let remaining = available
        .checked_sub(amount)
        .ok_or(GameError::InsufficientResource {
            player: player.id,
            required: amount,
            available,
        })?;
    let folded = settle(player, now)?;
    player.saved_chicken = remaining;
    Ok(folded)
}

/// Settle, then add `amount` chicken. Returns the amount folded by the
/// settlement.
pub fn earn(player: &mut Player, amount: u128, now: u64) -> Result<u128, GameError> {
    let balance = chicken_of(player, now)?
        .checked_add(amount)
        .ok_or(GameError::overflow("earn"))?;
    let folded = settle(player, now)?;
    player.saved_chicken = balance;
    Ok(folded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chickenhunt_types::PlayerId;

    use super::*;

    fn player_at(now: u64) -> Player {
        Player::new(PlayerId::new(), now)
    }

    #[test]
    fn fresh_player_accrues_one_per_second() {
        // 10 * 10 / 100 = 1 chicken per second.
        let player = player_at(1_000);
        assert_eq!(chicken_of(&player, 1_000).unwrap(), 0);
        assert_eq!(chicken_of(&player, 1_060).unwrap(), 60);
    }

    #[test]
    fn accrual_is_linear_and_reads_are_idempotent() {
        let mut player = player_at(0);
        player.hunting = Stat::new(37, 13);
        player.saved_chicken = 5;
        for t in [0_u64, 1, 7, 100, 86_400] {
            let expected = 5 + u128::from(37 * 13 * t) / 100;
            assert_eq!(chicken_of(&player, t).unwrap(), expected);
            assert_eq!(chicken_of(&player, t).unwrap(), expected);
        }
    }

    #[test]
    fn settle_folds_and_restarts() {
        let mut player = player_at(0);
        assert_eq!(settle(&mut player, 250).unwrap(), 250);
        assert_eq!(player.saved_chicken, 250);
        assert_eq!(player.last_save_time, 250);
        assert_eq!(chicken_of(&player, 250).unwrap(), 250);
    }

    #[test]
    fn rate_change_after_settle_applies_prospectively() {
        let mut player = player_at(0);
        settle(&mut player, 100).unwrap();
        player.hunting.multiplier = 20;
        assert_eq!(chicken_of(&player, 200).unwrap(), 100 + 200);
    }

    #[test]
    fn spend_checks_settled_balance() {
        let mut player = player_at(0);
        let err = spend(&mut player, 101, 100).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientResource {
                required: 101,
                available: 100,
                ..
            }
        ));
        assert_eq!(player.saved_chicken, 0);
        assert_eq!(player.last_save_time, 0);

        assert_eq!(spend(&mut player, 40, 100).unwrap(), 100);
        assert_eq!(player.saved_chicken, 60);
        assert_eq!(player.last_save_time, 100);
    }

    #[test]
    fn earn_adds_on_top_of_accrual() {
        let mut player = player_at(0);
        earn(&mut player, 1_000, 10).unwrap();
        assert_eq!(chicken_of(&player, 10).unwrap(), 1_010);
    }
}
