//! Time sources for the engine.
//!
//! The engine never reads the system time directly. It asks an injected
//! [`Clock`] for the current unix second, so accrual, cooldowns and altar
//! days can be driven deterministically in tests and scenario replays.
//!
//! # Design Principles
//!
//! - Time is a plain `u64` of unix seconds; there is no tick counter.
//! - Day indices are derived from the genesis time, never stored.
//! - Advancing a [`ManualClock`] uses checked arithmetic.

use chrono::Utc;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The clock would move past `u64::MAX`.
    #[error("clock overflow: cannot advance beyond u64::MAX")]
    TimeOverflow,

    /// Invalid time configuration (e.g. a zero-length day).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// A source of the current unix second.
pub trait Clock {
    /// The current unix second.
    fn now(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    pub const fn new(now: u64) -> Self {
        Self { now }
    }

    /// Move the clock forward by `seconds`. Returns the new time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TimeOverflow`] if the time would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self, seconds: u64) -> Result<u64, ClockError> {
        self.now = self
            .now
            .checked_add(seconds)
            .ok_or(ClockError::TimeOverflow)?;
        Ok(self.now)
    }

    /// Jump to an absolute time. Moving backwards is allowed.
    pub const fn set(&mut self, now: u64) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now
    }
}

/// Number of whole days between `genesis` and `now`.
///
/// Times before genesis map to day 0.
///
/// # Errors
///
/// Returns [`ClockError::InvalidConfig`] if `day_length` is zero.
pub fn day_index(now: u64, genesis: u64, day_length: u64) -> Result<u64, ClockError> {
    now.saturating_sub(genesis)
        .checked_div(day_length)
        .ok_or_else(|| ClockError::InvalidConfig {
            reason: "day_length must be at least 1".to_owned(),
        })
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let mut clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        assert_eq!(clock.advance(50), Ok(150));
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn manual_clock_overflow() {
        let mut clock = ManualClock::new(u64::MAX);
        assert_eq!(clock.advance(1), Err(ClockError::TimeOverflow));
        assert_eq!(clock.now(), u64::MAX);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn day_index_boundaries() {
        let day = 86_400;
        assert_eq!(day_index(1_000, 1_000, day), Ok(0));
        assert_eq!(day_index(1_000 + day - 1, 1_000, day), Ok(0));
        assert_eq!(day_index(1_000 + day, 1_000, day), Ok(1));
        assert_eq!(day_index(10, 1_000, day), Ok(0));
        assert!(day_index(10, 0, 0).is_err());
    }
}
