//! Scenario runner
//!
//! Builds the base pool, seeds it, wraps it in a drifting meta pool and
//! replays each step at the simulated clock. A failing step is recorded
//! with its error and leaves both pools as they were.

use crate::config::{amount, amounts, ScenarioStep, SimulatorConfig};
use anyhow::{Context, Result};
use driftswap_amm::{
    AddLiquidityRequest, DriftingMetaPool, PoolState, RemoveImbalanceRequest,
    RemoveLiquidityRequest, RemoveOneTokenRequest, SnapshotRate, StableSwapPool, SwapRequest,
};
use driftswap_types::U256;
use serde::Serialize;
use tracing::{debug, info, warn};

pub type MetaPool = DriftingMetaPool<SnapshotRate, StableSwapPool>;

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub action: &'static str,
    pub time: u64,
    /// Amounts returned by the operation, decimal
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Meta pool virtual price after the step, decimal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_price: Option<String>,
    pub a_precise: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub pool: String,
    pub base_pool: String,
    pub steps: Vec<StepRecord>,
    pub meta_state: PoolState,
    pub base_state: PoolState,
}

pub struct Simulator {
    name: String,
    base_name: String,
    pool: MetaPool,
    now: u64,
}

impl Simulator {
    pub fn new(config: &SimulatorConfig) -> Result<Self> {
        let now = config.start_time;
        let mut base = StableSwapPool::from_config(&config.base)
            .with_context(|| format!("Failed to build base pool '{}'", config.base.name))?;

        for (i, deposit) in config.base_deposits.iter().enumerate() {
            let request = AddLiquidityRequest::new(amounts(deposit)?, U256::zero(), now);
            let minted = base
                .execute_add_liquidity(&request, now)
                .with_context(|| format!("Base deposit {} failed", i))?;
            debug!(deposit = i, %minted, "Base pool seeded");
        }

        let rate = SnapshotRate::new(config.initial_rate()?);
        let pool = DriftingMetaPool::from_config(&config.meta, rate, base, now)
            .with_context(|| format!("Failed to build meta pool '{}'", config.meta.name))?;

        info!(
            pool = %config.meta.name,
            base = %config.base.name,
            start = now,
            "Simulator ready"
        );
        Ok(Self {
            name: config.meta.name.clone(),
            base_name: config.base.name.clone(),
            pool,
            now,
        })
    }

    pub fn pool(&self) -> &MetaPool {
        &self.pool
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn run(mut self, steps: &[ScenarioStep]) -> Result<SimulationReport> {
        let mut records = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let (output, error) = match self.apply(step) {
                Ok(output) => (output, None),
                Err(e) => {
                    let message = format!("{:#}", e);
                    warn!(index, action = step.name(), error = %message, "Step failed");
                    (Vec::new(), Some(message))
                }
            };
            records.push(StepRecord {
                index,
                action: step.name(),
                time: self.now,
                output: output.iter().map(|v| v.to_string()).collect(),
                error,
                virtual_price: self
                    .pool
                    .get_virtual_price(self.now)
                    .ok()
                    .map(|vp| vp.to_string()),
                a_precise: self.pool.get_a_precise(self.now),
            });
        }

        Ok(SimulationReport {
            pool: self.name,
            base_pool: self.base_name,
            steps: records,
            meta_state: self.pool.state().clone(),
            base_state: self.pool.base_pool().state().clone(),
        })
    }

    /// Apply one step at the current simulated time
    pub fn apply(&mut self, step: &ScenarioStep) -> Result<Vec<U256>> {
        let now = self.now;
        let pool = &mut self.pool;
        let output = match step {
            ScenarioStep::SetRate { rate } => {
                pool.rate_source_mut().set_rate(amount(rate)?);
                Vec::new()
            }
            ScenarioStep::Advance { secs } => {
                self.now = now.saturating_add(*secs);
                Vec::new()
            }
            ScenarioStep::AddLiquidity { amounts: raw } => {
                let request = AddLiquidityRequest::new(amounts(raw)?, U256::zero(), now);
                vec![pool.execute_add_liquidity(&request, now)?]
            }
            ScenarioStep::Swap { from, to, dx } => {
                let request = SwapRequest::new(*from, *to, amount(dx)?, U256::zero(), now);
                vec![pool.execute_swap(&request, now)?]
            }
            ScenarioStep::SwapUnderlying { from, to, dx } => {
                let request = SwapRequest::new(*from, *to, amount(dx)?, U256::zero(), now);
                vec![pool.swap_underlying(&request, now)?]
            }
            ScenarioStep::RemoveLiquidity { amount: shares } => {
                let min_amounts = vec![U256::zero(); pool.state().num_tokens()];
                let request = RemoveLiquidityRequest::new(amount(shares)?, min_amounts, now);
                pool.execute_remove_liquidity(&request, now)?
            }
            ScenarioStep::RemoveLiquidityImbalance {
                amounts: raw,
                max_burn,
            } => {
                let request = RemoveImbalanceRequest::new(amounts(raw)?, amount(max_burn)?, now);
                vec![pool.execute_remove_liquidity_imbalance(&request, now)?]
            }
            ScenarioStep::RemoveLiquidityOneToken {
                amount: shares,
                token_index,
            } => {
                let request =
                    RemoveOneTokenRequest::new(amount(shares)?, *token_index, U256::zero(), now);
                vec![pool.execute_remove_liquidity_one_token(&request, now)?]
            }
            ScenarioStep::RampA {
                future_a,
                duration_secs,
            } => {
                pool.ramp_a(*future_a, now.saturating_add(*duration_secs), now)?;
                Vec::new()
            }
            ScenarioStep::StopRampA => {
                pool.stop_ramp_a(now)?;
                Vec::new()
            }
            ScenarioStep::SetSwapFee { fee } => {
                pool.set_swap_fee(*fee)?;
                Vec::new()
            }
            ScenarioStep::SetAdminFee { fee } => {
                pool.set_admin_fee(*fee)?;
                Vec::new()
            }
            ScenarioStep::WithdrawAdminFees => pool.withdraw_admin_fees(),
        };
        Ok(output)
    }
}

/// Run every configured step against freshly built pools
pub fn simulate(config: &SimulatorConfig) -> Result<SimulationReport> {
    Simulator::new(config)?.run(&config.steps)
}
