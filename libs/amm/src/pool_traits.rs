//! Seams between a meta pool and the outside world

use crate::error::Result;
use driftswap_types::{U256, RAY};
use serde::{Deserialize, Serialize};

/// Source of the drift rate, a RAY-scaled value of one drift token
pub trait RateSource {
    /// Current rate; read once per pool operation
    fn current_rate(&self) -> U256;
}

/// Rate held in memory and moved by its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRate {
    rate: U256,
}

impl SnapshotRate {
    pub fn new(rate: U256) -> Self {
        Self { rate }
    }

    pub fn set_rate(&mut self, rate: U256) {
        self.rate = rate;
    }
}

impl Default for SnapshotRate {
    fn default() -> Self {
        Self::new(RAY)
    }
}

impl RateSource for SnapshotRate {
    fn current_rate(&self) -> U256 {
        self.rate
    }
}

impl<R: RateSource + ?Sized> RateSource for &R {
    fn current_rate(&self) -> U256 {
        (**self).current_rate()
    }
}

/// Nested stableswap pool whose LP share a meta pool holds
///
/// Every method takes the caller's `now` so both pools see one timestamp.
pub trait BasePool {
    fn num_tokens(&self) -> usize;

    fn get_token_balance(&self, index: usize) -> Result<U256>;

    /// Share value, WAD-scaled
    fn get_virtual_price(&self, now: u64) -> Result<U256>;

    fn calculate_swap(&self, from: usize, to: usize, dx: U256, now: u64) -> Result<U256>;

    fn calculate_token_amount(&self, amounts: &[U256], deposit: bool, now: u64) -> Result<U256>;

    fn calculate_remove_liquidity_one_token(
        &self,
        amount: U256,
        index: usize,
        now: u64,
    ) -> Result<U256>;

    fn swap(
        &mut self,
        from: usize,
        to: usize,
        dx: U256,
        min_dy: U256,
        deadline: u64,
        now: u64,
    ) -> Result<U256>;

    /// Returns shares minted
    fn add_liquidity(
        &mut self,
        amounts: &[U256],
        min_to_mint: U256,
        deadline: u64,
        now: u64,
    ) -> Result<U256>;

    /// Returns tokens paid out
    fn remove_liquidity_one_token(
        &mut self,
        amount: U256,
        index: usize,
        min_amount: U256,
        deadline: u64,
        now: u64,
    ) -> Result<U256>;
}
