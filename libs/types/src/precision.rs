//! Token Precision Handling
//!
//! Pool math runs in a single 18-decimal unit. Each token keeps its native
//! decimal count for custody and is lifted into pool units by a precision
//! multiplier of `10^(18 - decimals)`.
//!
//! ## Precision by Token
//!
//! - **DAI / RAI**: 18 decimals, multiplier 1
//! - **USDC / USDT**: 6 decimals, multiplier 1e12
//! - **WBTC**: 8 decimals, multiplier 1e10
//!
//! ## Critical Rules
//!
//! 1. **NO FLOATING POINT**: amounts are unsigned integers end to end
//! 2. **Multiply up, divide down**: lifting never loses precision, lowering truncates
//! 3. **Decimals above 18 are rejected** at pool construction

use crate::common::errors::FixedPointError;
use crate::common::fixed_point::{CheckedMath, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal count of the common pool unit
pub const POOL_PRECISION_DECIMALS: u8 = 18;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrecisionError {
    #[error("Token decimals {decimals} exceed pool precision {max}")]
    DecimalsTooHigh { decimals: u8, max: u8 },
}

pub type Result<T> = std::result::Result<T, PrecisionError>;

/// Native decimal count of a token and the multiplier that lifts it to pool units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPrecision {
    decimals: u8,
    multiplier: U256,
}

impl TokenPrecision {
    /// Build the precision record for a token with `decimals` native decimals
    pub fn new(decimals: u8) -> Result<Self> {
        if decimals > POOL_PRECISION_DECIMALS {
            return Err(PrecisionError::DecimalsTooHigh {
                decimals,
                max: POOL_PRECISION_DECIMALS,
            });
        }
        Ok(Self {
            decimals,
            multiplier: U256::exp10((POOL_PRECISION_DECIMALS - decimals) as usize),
        })
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// `10^(18 - decimals)`
    pub fn multiplier(&self) -> U256 {
        self.multiplier
    }

    /// Lift a native amount into pool units
    pub fn to_pool_units(&self, raw: U256) -> std::result::Result<U256, FixedPointError> {
        raw.safe_mul(self.multiplier)
    }

    /// Lower a pool-unit amount to native decimals, truncating
    pub fn from_pool_units(&self, normalized: U256) -> U256 {
        // multiplier is at least 1
        normalized / self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_by_decimals() {
        assert_eq!(TokenPrecision::new(18).unwrap().multiplier(), U256::one());
        assert_eq!(
            TokenPrecision::new(6).unwrap().multiplier(),
            U256::exp10(12)
        );
        assert_eq!(TokenPrecision::new(0).unwrap().multiplier(), U256::exp10(18));
    }

    #[test]
    fn test_rejects_decimals_above_pool_precision() {
        assert_eq!(
            TokenPrecision::new(19),
            Err(PrecisionError::DecimalsTooHigh {
                decimals: 19,
                max: 18
            })
        );
    }

    #[test]
    fn test_lift_and_lower() {
        let usdc = TokenPrecision::new(6).unwrap();
        let one_usdc = U256::from(1_000_000u64);
        let lifted = usdc.to_pool_units(one_usdc).unwrap();
        assert_eq!(lifted, U256::exp10(18));
        assert_eq!(usdc.from_pool_units(lifted), one_usdc);

        // sub-unit dust truncates away
        assert_eq!(usdc.from_pool_units(U256::exp10(12) - 1), U256::zero());
    }
}
