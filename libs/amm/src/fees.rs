//! Trade, imbalance and admin fee accounting
//!
//! Both fees are fractions over [`FEE_DENOMINATOR`]. The admin fee is a share
//! of the collected swap fee, not of the traded amount.

use crate::error::{PoolError, Result};
use driftswap_config::fees::{FEE_DENOMINATOR, MAX_ADMIN_FEE, MAX_SWAP_FEE};
use driftswap_types::{abs_diff, mul_div, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    swap_fee: u64,
    admin_fee: u64,
}

impl FeeSchedule {
    pub fn new(swap_fee: u64, admin_fee: u64) -> Result<Self> {
        let mut schedule = Self {
            swap_fee: 0,
            admin_fee: 0,
        };
        schedule.check_swap_fee(swap_fee)?;
        schedule.check_admin_fee(admin_fee)?;
        schedule.swap_fee = swap_fee;
        schedule.admin_fee = admin_fee;
        Ok(schedule)
    }

    pub fn swap_fee(&self) -> u64 {
        self.swap_fee
    }

    pub fn admin_fee(&self) -> u64 {
        self.admin_fee
    }

    fn check_swap_fee(&self, fee: u64) -> Result<()> {
        if fee > MAX_SWAP_FEE {
            return Err(PoolError::FeeTooHigh {
                fee,
                max: MAX_SWAP_FEE,
            });
        }
        Ok(())
    }

    fn check_admin_fee(&self, fee: u64) -> Result<()> {
        if fee > MAX_ADMIN_FEE {
            return Err(PoolError::FeeTooHigh {
                fee,
                max: MAX_ADMIN_FEE,
            });
        }
        Ok(())
    }

    pub fn set_swap_fee(&mut self, fee: u64) -> Result<()> {
        self.check_swap_fee(fee)?;
        info!(old = self.swap_fee, new = fee, "Swap fee updated");
        self.swap_fee = fee;
        Ok(())
    }

    pub fn set_admin_fee(&mut self, fee: u64) -> Result<()> {
        self.check_admin_fee(fee)?;
        info!(old = self.admin_fee, new = fee, "Admin fee updated");
        self.admin_fee = fee;
        Ok(())
    }

    /// Swap fee charged on an output amount
    pub fn trade_fee(&self, amount: U256) -> Result<U256> {
        Ok(mul_div(
            amount,
            U256::from(self.swap_fee),
            U256::from(FEE_DENOMINATOR),
        )?)
    }

    /// Admin share of a collected fee
    pub fn admin_share(&self, fee: U256) -> Result<U256> {
        Ok(mul_div(
            fee,
            U256::from(self.admin_fee),
            U256::from(FEE_DENOMINATOR),
        )?)
    }

    /// Per-token imbalance fee rate: `swap_fee * n / (4 * (n - 1))`
    pub fn fee_per_token(&self, num_tokens: usize) -> U256 {
        if num_tokens < 2 {
            return U256::zero();
        }
        U256::from(self.swap_fee) * U256::from(num_tokens)
            / (U256::from(num_tokens - 1) * U256::from(4u8))
    }

    /// Imbalance fee on the distance between an ideal and an actual balance
    pub fn imbalance_fee(&self, num_tokens: usize, ideal: U256, actual: U256) -> Result<U256> {
        Ok(mul_div(
            self.fee_per_token(num_tokens),
            abs_diff(ideal, actual),
            U256::from(FEE_DENOMINATOR),
        )?)
    }
}
