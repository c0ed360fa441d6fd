//! Drifting meta pool
//!
//! A stableswap pool whose last token is the LP share of a nested
//! [`BasePool`], and whose drift token (if any) is rescaled by a
//! [`RateSource`] snapshot. Each operation reads the rate once and the base
//! pool's virtual price at most once, builds one [`Normalizer`] from them,
//! and runs the shared swap and liquidity engines against it.

use crate::error::{PoolError, Result};
use crate::invariant::InvariantSolver;
use crate::liquidity::LiquidityEngine;
use crate::normalizer::Normalizer;
use crate::pool::{PoolState, PoolView};
use crate::pool_traits::{BasePool, RateSource};
use crate::requests::{
    AddLiquidityRequest, RemoveImbalanceRequest, RemoveLiquidityRequest, RemoveOneTokenRequest,
    SwapRequest,
};
use crate::swap::SwapEngine;
use crate::virtual_price::VirtualPriceCalculator;
use driftswap_config::PoolConfig;
use driftswap_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Last observed base pool virtual price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseVirtualPriceCache {
    pub virtual_price: U256,
    pub last_updated: u64,
}

/// Scalars captured once for one operation
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub normalizer: Normalizer,
    pub base_virtual_price: U256,
    /// Set when the cache was stale and `base_virtual_price` is a fresh read
    pub refreshed: bool,
}

#[derive(Debug, Clone)]
pub struct DriftingMetaPool<R, B> {
    pub(crate) state: PoolState,
    drift_index: Option<usize>,
    rate_source: R,
    pub(crate) base_pool: B,
    base_cache: BaseVirtualPriceCache,
    cache_expire_secs: u64,
    pub(crate) solver: InvariantSolver,
}

impl<R: RateSource, B: BasePool> DriftingMetaPool<R, B> {
    /// Wrap an empty meta pool state around a base pool
    ///
    /// The last token of `state` is the base pool's LP share. `drift_index`
    /// may name any other token.
    pub fn new(
        state: PoolState,
        drift_index: Option<usize>,
        rate_source: R,
        base_pool: B,
        cache_expire_secs: u64,
        now: u64,
    ) -> Result<Self> {
        if state.num_tokens() < 2 {
            return Err(PoolError::TooFewTokens {
                count: state.num_tokens(),
            });
        }
        let base_index = state.num_tokens() - 1;
        if let Some(index) = drift_index {
            if index >= base_index {
                return Err(PoolError::InvalidDriftIndex { index });
            }
        }
        if base_pool.num_tokens() < 2 {
            return Err(PoolError::TooFewTokens {
                count: base_pool.num_tokens(),
            });
        }

        let base_cache = BaseVirtualPriceCache {
            virtual_price: base_pool.get_virtual_price(now)?,
            last_updated: now,
        };
        info!(
            tokens = state.num_tokens(),
            base_tokens = base_pool.num_tokens(),
            ?drift_index,
            base_virtual_price = %base_cache.virtual_price,
            "Meta pool initialized"
        );

        Ok(Self {
            state,
            drift_index,
            rate_source,
            base_pool,
            base_cache,
            cache_expire_secs,
            solver: InvariantSolver::default(),
        })
    }

    pub fn from_config(config: &PoolConfig, rate_source: R, base_pool: B, now: u64) -> Result<Self> {
        Self::new(
            PoolState::from_config(config)?,
            config.drift_index,
            rate_source,
            base_pool,
            config.limits.base_cache_expire_secs,
            now,
        )
    }

    pub fn with_solver(mut self, solver: InvariantSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    pub fn drift_index(&self) -> Option<usize> {
        self.drift_index
    }

    /// Index of the base pool's LP share
    pub fn base_index(&self) -> usize {
        self.state.num_tokens().saturating_sub(1)
    }

    pub fn rate_source(&self) -> &R {
        &self.rate_source
    }

    pub fn rate_source_mut(&mut self) -> &mut R {
        &mut self.rate_source
    }

    pub fn base_pool(&self) -> &B {
        &self.base_pool
    }

    pub fn base_pool_mut(&mut self) -> &mut B {
        &mut self.base_pool
    }

    pub fn base_cache(&self) -> BaseVirtualPriceCache {
        self.base_cache
    }

    /// Read the rate and the base virtual price for one operation
    pub(crate) fn snapshot(&self, now: u64) -> Result<Snapshot> {
        let expires = self
            .base_cache
            .last_updated
            .saturating_add(self.cache_expire_secs);
        let (base_virtual_price, refreshed) = if now > expires {
            (self.base_pool.get_virtual_price(now)?, true)
        } else {
            (self.base_cache.virtual_price, false)
        };

        let mut normalizer = Normalizer::for_assets(&self.state.assets)
            .with_base_share(self.base_index(), base_virtual_price)?;
        if let Some(index) = self.drift_index {
            normalizer = normalizer.with_drift(index, self.rate_source.current_rate())?;
        }

        Ok(Snapshot {
            normalizer,
            base_virtual_price,
            refreshed,
        })
    }

    /// Store a freshly read base virtual price after a committed operation
    pub(crate) fn commit_snapshot(&mut self, snapshot: &Snapshot, now: u64) {
        if snapshot.refreshed {
            debug!(virtual_price = %snapshot.base_virtual_price, "Base virtual price cache refreshed");
            self.base_cache = BaseVirtualPriceCache {
                virtual_price: snapshot.base_virtual_price,
                last_updated: now,
            };
        }
    }

    pub(crate) fn view(&self, snapshot: &Snapshot, now: u64) -> PoolView<'_> {
        self.state.view(snapshot.normalizer.clone(), now, self.solver)
    }

    pub fn quote_swap(&self, from: usize, to: usize, dx: U256, now: u64) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        Ok(SwapEngine::quote(&self.view(&snapshot, now), from, to, dx)?.dy)
    }

    pub fn execute_swap(&mut self, request: &SwapRequest, now: u64) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        let quote = self.state.execute_swap(
            snapshot.normalizer.clone(),
            now,
            self.solver,
            request,
        )?;
        self.commit_snapshot(&snapshot, now);
        Ok(quote.dy)
    }

    pub fn quote_add_liquidity(&self, amounts: &[U256], now: u64) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        Ok(LiquidityEngine::quote_add(&self.view(&snapshot, now), amounts)?.minted)
    }

    pub fn execute_add_liquidity(
        &mut self,
        request: &AddLiquidityRequest,
        now: u64,
    ) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        let quote = self.state.execute_add_liquidity(
            snapshot.normalizer.clone(),
            now,
            self.solver,
            request,
        )?;
        self.commit_snapshot(&snapshot, now);
        Ok(quote.minted)
    }

    /// Fee-free share delta of depositing or withdrawing `amounts`
    pub fn calculate_token_amount(&self, amounts: &[U256], deposit: bool, now: u64) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        LiquidityEngine::calculate_token_amount(&self.view(&snapshot, now), amounts, deposit)
    }

    pub fn quote_remove_liquidity(&self, amount: U256) -> Result<Vec<U256>> {
        LiquidityEngine::quote_remove(&self.state, amount)
    }

    pub fn execute_remove_liquidity(
        &mut self,
        request: &RemoveLiquidityRequest,
        now: u64,
    ) -> Result<Vec<U256>> {
        self.state.execute_remove_liquidity(now, request)
    }

    pub fn quote_remove_liquidity_imbalance(&self, amounts: &[U256], now: u64) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        Ok(LiquidityEngine::quote_remove_imbalance(&self.view(&snapshot, now), amounts)?.burn)
    }

    pub fn execute_remove_liquidity_imbalance(
        &mut self,
        request: &RemoveImbalanceRequest,
        now: u64,
    ) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        let quote = self.state.execute_remove_liquidity_imbalance(
            snapshot.normalizer.clone(),
            now,
            self.solver,
            request,
        )?;
        self.commit_snapshot(&snapshot, now);
        Ok(quote.burn)
    }

    pub fn quote_remove_liquidity_one_token(
        &self,
        amount: U256,
        index: usize,
        now: u64,
    ) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        Ok(LiquidityEngine::quote_remove_one(&self.view(&snapshot, now), amount, index)?.dy)
    }

    pub fn execute_remove_liquidity_one_token(
        &mut self,
        request: &RemoveOneTokenRequest,
        now: u64,
    ) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        let quote = self.state.execute_remove_liquidity_one_token(
            snapshot.normalizer.clone(),
            now,
            self.solver,
            request,
        )?;
        self.commit_snapshot(&snapshot, now);
        Ok(quote.dy)
    }

    /// Drift-adjusted share value, WAD-scaled
    pub fn get_virtual_price(&self, now: u64) -> Result<U256> {
        let snapshot = self.snapshot(now)?;
        VirtualPriceCalculator::virtual_price(&self.view(&snapshot, now))
    }

    pub fn get_token_balance(&self, index: usize) -> Result<U256> {
        self.state.token_balance(index)
    }

    pub fn get_a(&self, now: u64) -> u64 {
        self.state.amplification.a(now)
    }

    pub fn get_a_precise(&self, now: u64) -> u64 {
        self.state.amplification.a_precise(now)
    }

    pub fn ramp_a(&mut self, future_a: u64, future_time: u64, now: u64) -> Result<()> {
        self.state.ramp_a(future_a, future_time, now)
    }

    pub fn stop_ramp_a(&mut self, now: u64) -> Result<()> {
        self.state.stop_ramp_a(now)
    }

    pub fn set_swap_fee(&mut self, fee: u64) -> Result<()> {
        self.state.fees.set_swap_fee(fee)
    }

    pub fn set_admin_fee(&mut self, fee: u64) -> Result<()> {
        self.state.fees.set_admin_fee(fee)
    }

    pub fn get_admin_balance(&self, index: usize) -> Result<U256> {
        self.state.admin_balance(index)
    }

    pub fn withdraw_admin_fees(&mut self) -> Vec<U256> {
        self.state.withdraw_admin_fees()
    }
}
