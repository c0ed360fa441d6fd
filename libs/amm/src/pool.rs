//! Pool state and the plain stableswap pool
//!
//! [`PoolState`] is the only mutable data in the engine. Every operation
//! reads it through a [`PoolView`] that pins the normalizer and the
//! effective A for the duration of the call, then commits a precomputed
//! quote in one step.

use crate::amplification::AmplificationState;
use crate::error::{PoolError, Result};
use crate::fees::FeeSchedule;
use crate::invariant::InvariantSolver;
use crate::liquidity::LiquidityEngine;
use crate::normalizer::Normalizer;
use crate::pool_traits::BasePool;
use crate::requests::{
    AddLiquidityRequest, RemoveImbalanceRequest, RemoveLiquidityRequest, RemoveOneTokenRequest,
    SwapRequest,
};
use crate::swap::SwapEngine;
use crate::virtual_price::VirtualPriceCalculator;
use driftswap_config::{PoolConfig, RampLimits};
use driftswap_types::{TokenPrecision, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One token held by the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PooledAsset {
    pub index: usize,
    pub precision: TokenPrecision,
    /// Balance in native decimals, net of accrued admin fees
    pub balance: U256,
}

/// Complete mutable state of one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub assets: Vec<PooledAsset>,
    pub total_supply: U256,
    pub fees: FeeSchedule,
    pub amplification: AmplificationState,
    /// Accrued admin fees per token, tracked apart from `assets[i].balance`
    pub admin_fee_balances: Vec<U256>,
    pub ramp_limits: RampLimits,
}

impl PoolState {
    /// Empty pool over tokens with the given decimals
    ///
    /// # Arguments
    /// * `decimals` - native decimals per token, in index order
    /// * `a` - initial amplification (unscaled)
    /// * `swap_fee`, `admin_fee` - fractions over the fee denominator
    /// * `ramp_limits` - limits applied to later `ramp_a` calls
    pub fn new(
        decimals: &[u8],
        a: u64,
        swap_fee: u64,
        admin_fee: u64,
        ramp_limits: RampLimits,
    ) -> Result<Self> {
        if decimals.len() < 2 {
            return Err(PoolError::TooFewTokens {
                count: decimals.len(),
            });
        }
        let assets = decimals
            .iter()
            .enumerate()
            .map(|(index, d)| {
                Ok(PooledAsset {
                    index,
                    precision: TokenPrecision::new(*d)?,
                    balance: U256::zero(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            admin_fee_balances: vec![U256::zero(); assets.len()],
            assets,
            total_supply: U256::zero(),
            fees: FeeSchedule::new(swap_fee, admin_fee)?,
            amplification: AmplificationState::new(a, &ramp_limits)?,
            ramp_limits,
        })
    }

    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        Self::new(
            &config.decimals(),
            config.a,
            config.swap_fee,
            config.admin_fee,
            config.limits.ramp,
        )
    }

    pub fn num_tokens(&self) -> usize {
        self.assets.len()
    }

    /// Raw balances in index order
    pub fn balances(&self) -> Vec<U256> {
        self.assets.iter().map(|a| a.balance).collect()
    }

    pub fn token_balance(&self, index: usize) -> Result<U256> {
        PoolError::check_index(index, self.num_tokens())?;
        Ok(self.assets[index].balance)
    }

    pub(crate) fn set_balances(&mut self, balances: &[U256]) {
        for (asset, balance) in self.assets.iter_mut().zip(balances) {
            asset.balance = *balance;
        }
    }

    /// Pin a normalizer and the effective A at `now` for one operation
    pub fn view(&self, normalizer: Normalizer, now: u64, solver: InvariantSolver) -> PoolView<'_> {
        PoolView {
            state: self,
            normalizer,
            a_precise: self.amplification.a_precise(now),
            solver,
        }
    }

    pub fn admin_balance(&self, index: usize) -> Result<U256> {
        PoolError::check_index(index, self.num_tokens())?;
        Ok(self.admin_fee_balances[index])
    }

    /// Drain accrued admin fees, returning the amounts per token
    pub fn withdraw_admin_fees(&mut self) -> Vec<U256> {
        let drained = std::mem::replace(
            &mut self.admin_fee_balances,
            vec![U256::zero(); self.assets.len()],
        );
        info!(fees = ?drained, "Admin fees withdrawn");
        drained
    }

    pub fn ramp_a(&mut self, future_a: u64, future_time: u64, now: u64) -> Result<()> {
        let limits = self.ramp_limits;
        self.amplification.ramp(future_a, future_time, now, &limits)
    }

    pub fn stop_ramp_a(&mut self, now: u64) -> Result<()> {
        self.amplification.stop(now)
    }
}

/// Read-only view of a pool with one normalizer and one A for a whole call
#[derive(Debug, Clone)]
pub struct PoolView<'a> {
    pub state: &'a PoolState,
    pub normalizer: Normalizer,
    pub a_precise: u64,
    pub solver: InvariantSolver,
}

impl<'a> PoolView<'a> {
    pub fn num_tokens(&self) -> usize {
        self.state.num_tokens()
    }

    /// Normalized current balances
    pub fn xp(&self) -> Result<Vec<U256>> {
        self.normalizer.normalize_all(&self.state.balances())
    }

    /// Invariant of an arbitrary raw balance vector under this view
    pub fn d_of(&self, balances: &[U256]) -> Result<U256> {
        let xp = self.normalizer.normalize_all(balances)?;
        self.solver.solve_d(&xp, self.a_precise)
    }

    /// Invariant of the current balances
    pub fn d(&self) -> Result<U256> {
        self.solver.solve_d(&self.xp()?, self.a_precise)
    }
}

/// Stableswap pool without drift, usable as a nested base pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableSwapPool {
    state: PoolState,
    solver: InvariantSolver,
}

impl StableSwapPool {
    pub fn new(state: PoolState) -> Self {
        Self {
            state,
            solver: InvariantSolver::default(),
        }
    }

    /// Build an empty pool; configs naming a drift index are rejected
    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        if let Some(index) = config.drift_index {
            return Err(PoolError::InvalidDriftIndex { index });
        }
        Ok(Self::new(PoolState::from_config(config)?))
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    fn view(&self, now: u64) -> PoolView<'_> {
        self.state
            .view(Normalizer::for_assets(&self.state.assets), now, self.solver)
    }

    fn normalizer(&self) -> Normalizer {
        Normalizer::for_assets(&self.state.assets)
    }

    pub fn quote_swap(&self, from: usize, to: usize, dx: U256, now: u64) -> Result<U256> {
        Ok(SwapEngine::quote(&self.view(now), from, to, dx)?.dy)
    }

    pub fn execute_swap(&mut self, request: &SwapRequest, now: u64) -> Result<U256> {
        let normalizer = self.normalizer();
        Ok(self
            .state
            .execute_swap(normalizer, now, self.solver, request)?
            .dy)
    }

    pub fn quote_add_liquidity(&self, amounts: &[U256], now: u64) -> Result<U256> {
        Ok(LiquidityEngine::quote_add(&self.view(now), amounts)?.minted)
    }

    pub fn execute_add_liquidity(&mut self, request: &AddLiquidityRequest, now: u64) -> Result<U256> {
        let normalizer = self.normalizer();
        Ok(self
            .state
            .execute_add_liquidity(normalizer, now, self.solver, request)?
            .minted)
    }

    pub fn calculate_token_amount(&self, amounts: &[U256], deposit: bool, now: u64) -> Result<U256> {
        LiquidityEngine::calculate_token_amount(&self.view(now), amounts, deposit)
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
        Ok(LiquidityEngine::quote_remove_imbalance(&self.view(now), amounts)?.burn)
    }

    pub fn execute_remove_liquidity_imbalance(
        &mut self,
        request: &RemoveImbalanceRequest,
        now: u64,
    ) -> Result<U256> {
        let normalizer = self.normalizer();
        Ok(self
            .state
            .execute_remove_liquidity_imbalance(normalizer, now, self.solver, request)?
            .burn)
    }

    pub fn quote_remove_liquidity_one_token(
        &self,
        amount: U256,
        index: usize,
        now: u64,
    ) -> Result<U256> {
        Ok(LiquidityEngine::quote_remove_one(&self.view(now), amount, index)?.dy)
    }

    pub fn execute_remove_liquidity_one_token(
        &mut self,
        request: &RemoveOneTokenRequest,
        now: u64,
    ) -> Result<U256> {
        let normalizer = self.normalizer();
        Ok(self
            .state
            .execute_remove_liquidity_one_token(normalizer, now, self.solver, request)?
            .dy)
    }

    pub fn get_virtual_price(&self, now: u64) -> Result<U256> {
        VirtualPriceCalculator::virtual_price(&self.view(now))
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

impl BasePool for StableSwapPool {
    fn num_tokens(&self) -> usize {
        self.state.num_tokens()
    }

    fn get_token_balance(&self, index: usize) -> Result<U256> {
        self.state.token_balance(index)
    }

    fn get_virtual_price(&self, now: u64) -> Result<U256> {
        StableSwapPool::get_virtual_price(self, now)
    }

    fn calculate_swap(&self, from: usize, to: usize, dx: U256, now: u64) -> Result<U256> {
        self.quote_swap(from, to, dx, now)
    }

    fn calculate_token_amount(&self, amounts: &[U256], deposit: bool, now: u64) -> Result<U256> {
        StableSwapPool::calculate_token_amount(self, amounts, deposit, now)
    }

    fn calculate_remove_liquidity_one_token(
        &self,
        amount: U256,
        index: usize,
        now: u64,
    ) -> Result<U256> {
        self.quote_remove_liquidity_one_token(amount, index, now)
    }

    fn swap(
        &mut self,
        from: usize,
        to: usize,
        dx: U256,
        min_dy: U256,
        deadline: u64,
        now: u64,
    ) -> Result<U256> {
        self.execute_swap(&SwapRequest::new(from, to, dx, min_dy, deadline), now)
    }

    fn add_liquidity(
        &mut self,
        amounts: &[U256],
        min_to_mint: U256,
        deadline: u64,
        now: u64,
    ) -> Result<U256> {
        self.execute_add_liquidity(
            &AddLiquidityRequest::new(amounts.to_vec(), min_to_mint, deadline),
            now,
        )
    }

    fn remove_liquidity_one_token(
        &mut self,
        amount: U256,
        index: usize,
        min_amount: U256,
        deadline: u64,
        now: u64,
    ) -> Result<U256> {
        self.execute_remove_liquidity_one_token(
            &RemoveOneTokenRequest::new(amount, index, min_amount, deadline),
            now,
        )
    }
}
