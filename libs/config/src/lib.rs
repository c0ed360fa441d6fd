//! # Driftswap Configuration
//!
//! Protocol constants and pool definitions for the driftswap engine.
//!
//! ## Features
//!
//! - **Protocol Constants**: fee denominators, amplification limits, solver caps
//! - **Pool Configuration**: TOML pool definitions with environment overrides
//! - **Engine Limits**: ramp and cache limits defaulting to the protocol constants
//!
//! ## Usage
//!
//! ```rust,no_run
//! use driftswap_config::{fees, PoolConfig};
//! use std::path::Path;
//!
//! let pool = PoolConfig::load(Path::new("config/pool.toml"), Some("staging"))?;
//! assert!(pool.swap_fee <= fees::MAX_SWAP_FEE);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod constants;
pub mod pool_config;

// Re-export commonly used types
pub use constants::*;
pub use pool_config::{load_config, EngineLimits, PoolConfig, RampLimits, TokenConfig};
