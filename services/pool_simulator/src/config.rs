//! Scenario file format
//!
//! Amounts are decimal strings (underscores allowed) because pool balances
//! routinely exceed TOML's 64-bit integers.

use anyhow::{bail, Context, Result};
use driftswap_config::{load_config, PoolConfig};
use driftswap_types::{parse_amount, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete simulation input
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Unix time of the first step
    pub start_time: u64,

    /// Drift rate at start, RAY-scaled
    #[serde(default = "default_rate")]
    pub initial_rate: String,

    /// Nested plain pool
    pub base: PoolConfig,

    /// Deposits made into the base pool before the meta pool exists
    #[serde(default)]
    pub base_deposits: Vec<Vec<String>>,

    /// Drifting meta pool; its last token is the base pool share
    pub meta: PoolConfig,

    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

fn default_rate() -> String {
    "1_000_000_000_000_000_000_000_000_000".to_string()
}

/// One scripted action against the meta pool
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    SetRate { rate: String },
    Advance { secs: u64 },
    AddLiquidity { amounts: Vec<String> },
    Swap { from: usize, to: usize, dx: String },
    SwapUnderlying { from: usize, to: usize, dx: String },
    RemoveLiquidity { amount: String },
    RemoveLiquidityImbalance { amounts: Vec<String>, max_burn: String },
    RemoveLiquidityOneToken { amount: String, token_index: usize },
    RampA { future_a: u64, duration_secs: u64 },
    StopRampA,
    SetSwapFee { fee: u64 },
    SetAdminFee { fee: u64 },
    WithdrawAdminFees,
}

impl ScenarioStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetRate { .. } => "set_rate",
            Self::Advance { .. } => "advance",
            Self::AddLiquidity { .. } => "add_liquidity",
            Self::Swap { .. } => "swap",
            Self::SwapUnderlying { .. } => "swap_underlying",
            Self::RemoveLiquidity { .. } => "remove_liquidity",
            Self::RemoveLiquidityImbalance { .. } => "remove_liquidity_imbalance",
            Self::RemoveLiquidityOneToken { .. } => "remove_liquidity_one_token",
            Self::RampA { .. } => "ramp_a",
            Self::StopRampA => "stop_ramp_a",
            Self::SetSwapFee { .. } => "set_swap_fee",
            Self::SetAdminFee { .. } => "set_admin_fee",
            Self::WithdrawAdminFees => "withdraw_admin_fees",
        }
    }
}

impl SimulatorConfig {
    pub fn load(path: &Path, environment: Option<&str>) -> Result<Self> {
        let config: Self = load_config(path, environment)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.base.validate().context("Invalid base pool")?;
        self.meta.validate().context("Invalid meta pool")?;
        if self.base.drift_index.is_some() {
            bail!("Base pool '{}' cannot carry a drift index", self.base.name);
        }
        if self.base_deposits.is_empty() {
            bail!("Base pool needs at least one deposit before the meta pool can price its share");
        }
        parse_amount(&self.initial_rate).context("Invalid initial rate")?;
        Ok(())
    }

    pub fn initial_rate(&self) -> Result<U256> {
        amount(&self.initial_rate)
    }
}

/// Parse one decimal amount with context
pub fn amount(input: &str) -> Result<U256> {
    parse_amount(input).with_context(|| format!("Invalid amount '{}'", input))
}

pub fn amounts(inputs: &[String]) -> Result<Vec<U256>> {
    inputs.iter().map(|s| amount(s)).collect()
}
