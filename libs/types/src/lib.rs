//! # Driftswap Types Library
//!
//! Numeric foundation for the driftswap stableswap engine.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: all balances are 256-bit unsigned integers
//! - **Checked Everywhere**: overflow, underflow and division by zero are typed errors
//! - **Deterministic**: truncating integer division only, no floating point
//! - **Clear Boundaries**: native token decimals are lifted to pool units in one place
//!
//! ## Quick Start
//!
//! ```rust
//! use driftswap_types::{mul_div, CheckedMath, TokenPrecision, RAY, U256, WAD};
//!
//! let usdc = TokenPrecision::new(6).unwrap();
//! let pool_units = usdc.to_pool_units(U256::from(5_000_000u64)).unwrap();
//! assert_eq!(pool_units, WAD * 5);
//!
//! // scale by a drift rate of 1.5
//! let rate = RAY * 3 / 2;
//! let drifted = mul_div(pool_units, rate, RAY).unwrap();
//! assert_eq!(drifted, WAD.safe_mul(U256::from(15u64)).unwrap() / 2);
//! ```

pub mod common;
pub mod precision;

pub use common::errors::FixedPointError;
pub use common::fixed_point::{
    abs_diff, mul_div, parse_amount, within_one, CheckedMath, RAY, U256, WAD,
};
pub use precision::{PrecisionError, TokenPrecision, POOL_PRECISION_DECIMALS};
