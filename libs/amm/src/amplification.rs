//! Amplification ramp state machine
//!
//! A is stored multiplied by [`A_PRECISION`]. While a ramp is active the
//! effective value moves linearly from `initial_a` to `future_a`; outside a
//! ramp it is `future_a`. Callers pass `now` explicitly, nothing here reads
//! a clock.

use crate::error::{PoolError, Result};
use driftswap_config::amplification::A_PRECISION;
use driftswap_config::RampLimits;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplificationState {
    initial_a: u64,
    future_a: u64,
    initial_time: u64,
    future_time: u64,
}

impl AmplificationState {
    /// Stable state at `a` (unscaled)
    pub fn new(a: u64, limits: &RampLimits) -> Result<Self> {
        if a == 0 || a >= limits.max_a {
            return Err(PoolError::AOutOfBounds {
                a,
                max: limits.max_a,
            });
        }
        let precise = a.checked_mul(A_PRECISION).ok_or(PoolError::AOutOfBounds {
            a,
            max: limits.max_a,
        })?;
        Ok(Self {
            initial_a: precise,
            future_a: precise,
            initial_time: 0,
            future_time: 0,
        })
    }

    pub fn initial_a(&self) -> u64 {
        self.initial_a
    }

    pub fn future_a(&self) -> u64 {
        self.future_a
    }

    pub fn initial_time(&self) -> u64 {
        self.initial_time
    }

    pub fn future_time(&self) -> u64 {
        self.future_time
    }

    pub fn is_ramping(&self, now: u64) -> bool {
        self.future_time > now
    }

    /// Effective A in A-precision units at `now`
    pub fn a_precise(&self, now: u64) -> u64 {
        if !self.is_ramping(now) {
            return self.future_a;
        }
        let a0 = self.initial_a as u128;
        let a1 = self.future_a as u128;
        let elapsed = now.saturating_sub(self.initial_time) as u128;
        let duration = (self.future_time - self.initial_time) as u128;
        if duration == 0 {
            return self.future_a;
        }
        // a0 and a1 fit u64, so the interpolated value does too
        let interpolated = if a1 > a0 {
            a0 + (a1 - a0) * elapsed / duration
        } else {
            a0 - (a0 - a1) * elapsed / duration
        };
        interpolated as u64
    }

    /// Effective A without the precision factor
    pub fn a(&self, now: u64) -> u64 {
        self.a_precise(now) / A_PRECISION
    }

    /// Start ramping towards `future_a` (unscaled), reaching it at `future_time`
    ///
    /// # Errors
    /// * [`PoolError::RampTooSoon`] within the cool-down of the last ramp start
    /// * [`PoolError::RampTooShort`] when the ramp is shorter than the minimum window
    /// * [`PoolError::AOutOfBounds`] unless `0 < future_a < max_a`
    /// * [`PoolError::AChangeTooSmall`] / [`PoolError::AChangeTooLarge`] outside
    ///   the multiplicative envelope around the current effective A
    pub fn ramp(
        &mut self,
        future_a: u64,
        future_time: u64,
        now: u64,
        limits: &RampLimits,
    ) -> Result<()> {
        let earliest_start = self.initial_time.saturating_add(limits.ramp_cooldown_secs);
        if now < earliest_start {
            return Err(PoolError::RampTooSoon {
                earliest: earliest_start,
            });
        }
        let earliest_end = now.saturating_add(limits.min_ramp_time_secs);
        if future_time < earliest_end {
            return Err(PoolError::RampTooShort {
                future_time,
                earliest: earliest_end,
            });
        }
        if future_a == 0 || future_a >= limits.max_a {
            return Err(PoolError::AOutOfBounds {
                a: future_a,
                max: limits.max_a,
            });
        }

        let current = self.a_precise(now);
        let future_precise =
            future_a
                .checked_mul(A_PRECISION)
                .ok_or(PoolError::AOutOfBounds {
                    a: future_a,
                    max: limits.max_a,
                })?;
        if future_precise < current {
            if future_precise.saturating_mul(limits.max_a_change) < current {
                return Err(PoolError::AChangeTooSmall {
                    current,
                    requested: future_precise,
                });
            }
        } else if future_precise > current.saturating_mul(limits.max_a_change) {
            return Err(PoolError::AChangeTooLarge {
                current,
                requested: future_precise,
            });
        }

        self.initial_a = current;
        self.future_a = future_precise;
        self.initial_time = now;
        self.future_time = future_time;

        info!(
            initial_a = current,
            future_a = future_precise,
            initial_time = now,
            future_time,
            "Ramping A"
        );
        Ok(())
    }

    /// Freeze A at its current effective value
    ///
    /// Fails with [`PoolError::AlreadyStopped`] when no ramp is in progress.
    pub fn stop(&mut self, now: u64) -> Result<()> {
        if !self.is_ramping(now) {
            return Err(PoolError::AlreadyStopped);
        }
        let current = self.a_precise(now);
        self.initial_a = current;
        self.future_a = current;
        self.initial_time = now;
        self.future_time = now;

        info!(a = current, time = now, "Stopped ramping A");
        Ok(())
    }
}
