//! Pool Configuration Module
//!
//! Provides configuration loading for pool definitions. Supports loading
//! from TOML files with environment-specific overrides and `DRIFTSWAP__*`
//! environment variables.

use crate::constants::{amplification, base_pool, fees};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use driftswap_types::POOL_PRECISION_DECIMALS;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Static definition of one pool
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PoolConfig {
    /// Human readable pool name
    pub name: String,

    /// Initial amplification coefficient (unscaled)
    pub a: u64,

    /// Swap fee over [`fees::FEE_DENOMINATOR`]
    pub swap_fee: u64,

    /// Admin share of the swap fee over [`fees::FEE_DENOMINATOR`]
    #[serde(default)]
    pub admin_fee: u64,

    /// Index of the asset rescaled by the drift rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_index: Option<usize>,

    /// Pooled tokens in index order
    pub tokens: Vec<TokenConfig>,

    /// Engine limits, defaulting to the protocol constants
    #[serde(default)]
    pub limits: EngineLimits,
}

/// One pooled token
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub symbol: String,
    pub decimals: u8,
}

/// Tunable engine limits
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct EngineLimits {
    pub ramp: RampLimits,

    /// Base-pool virtual price cache lifetime in seconds
    pub base_cache_expire_secs: u64,
}

/// Amplification ramp limits
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RampLimits {
    pub max_a: u64,
    pub max_a_change: u64,
    pub min_ramp_time_secs: u64,
    pub ramp_cooldown_secs: u64,
}

impl Default for RampLimits {
    fn default() -> Self {
        Self {
            max_a: amplification::MAX_A,
            max_a_change: amplification::MAX_A_CHANGE,
            min_ramp_time_secs: amplification::MIN_RAMP_TIME_SECS,
            ramp_cooldown_secs: amplification::RAMP_COOLDOWN_SECS,
        }
    }
}

impl RampLimits {
    /// Check the limits can describe a reachable, non-overflowing ramp
    pub fn validate(&self) -> Result<()> {
        let ceiling = u64::MAX / amplification::A_PRECISION;
        if self.max_a == 0 || self.max_a > ceiling {
            bail!("max_a = {} must be in (0, {}]", self.max_a, ceiling);
        }
        if self.max_a_change == 0 {
            bail!("max_a_change must be at least 1");
        }
        Ok(())
    }
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            ramp: RampLimits::default(),
            base_cache_expire_secs: base_pool::BASE_CACHE_EXPIRE_SECS,
        }
    }
}

impl PoolConfig {
    /// Load a pool configuration from `path` with environment overrides
    pub fn load(path: &Path, environment: Option<&str>) -> Result<Self> {
        let config: Self = load_config(path, environment)?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural limits before any pool is built from this config
    pub fn validate(&self) -> Result<()> {
        self.limits
            .ramp
            .validate()
            .with_context(|| format!("Invalid ramp limits for pool '{}'", self.name))?;
        if self.tokens.len() < 2 {
            bail!(
                "Pool '{}' needs at least 2 tokens, got {}",
                self.name,
                self.tokens.len()
            );
        }
        for token in &self.tokens {
            if token.decimals > POOL_PRECISION_DECIMALS {
                bail!(
                    "Token {} has {} decimals, max is {}",
                    token.symbol,
                    token.decimals,
                    POOL_PRECISION_DECIMALS
                );
            }
        }
        if self.a == 0 || self.a >= self.limits.ramp.max_a {
            bail!("A = {} must be in (0, {})", self.a, self.limits.ramp.max_a);
        }
        if self.swap_fee > fees::MAX_SWAP_FEE {
            bail!("Swap fee {} exceeds {}", self.swap_fee, fees::MAX_SWAP_FEE);
        }
        if self.admin_fee > fees::MAX_ADMIN_FEE {
            bail!("Admin fee {} exceeds {}", self.admin_fee, fees::MAX_ADMIN_FEE);
        }
        if let Some(index) = self.drift_index {
            if index >= self.tokens.len() {
                bail!(
                    "Drift index {} out of range for {} tokens",
                    index,
                    self.tokens.len()
                );
            }
        }
        debug!(pool = %self.name, tokens = self.tokens.len(), "Pool config validated");
        Ok(())
    }

    /// Token decimals in index order
    pub fn decimals(&self) -> Vec<u8> {
        self.tokens.iter().map(|t| t.decimals).collect()
    }

    /// Render as TOML, used to write config templates
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize pool config")
    }
}

/// Load any configuration document from a TOML file with overrides
///
/// Layering order: `base_path`, then `environments/<environment>.toml` next
/// to it when present, then `DRIFTSWAP__*` environment variables (`__`
/// separates nesting levels so field names may contain underscores).
pub fn load_config<T: DeserializeOwned>(base_path: &Path, environment: Option<&str>) -> Result<T> {
    let mut builder = Config::builder().add_source(File::from(base_path).required(true));

    if let Some(env) = environment {
        let env_file = base_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join("environments")
            .join(format!("{}.toml", env));

        if env_file.exists() {
            info!("Loading environment config: {:?}", env_file);
            builder = builder.add_source(File::from(env_file));
        } else {
            warn!("Environment config not found: {:?}", env_file);
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("DRIFTSWAP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build().context("Failed to build configuration")?;

    config
        .try_deserialize()
        .with_context(|| format!("Failed to deserialize configuration from {:?}", base_path))
}
