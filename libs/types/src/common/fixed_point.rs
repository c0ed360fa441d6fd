//! Fixed-point arithmetic on 256-bit unsigned integers
//!
//! Pool math runs entirely on unsigned integers scaled to a common unit.
//! Nothing here touches floating point: every operation is checked and
//! every division truncates toward zero, so a fixed sequence of operations
//! is reproducible bit-for-bit.
//!
//! ## Units
//!
//! - **WAD** (1e18): pool precision, virtual prices, base-pool share prices
//! - **RAY** (1e27): drift exchange-rate snapshots

use crate::common::errors::FixedPointError;

pub use ethereum_types::U256;

/// 1e18, the pool's common fixed-point unit
pub const WAD: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// 1e27, the unit drift rates are expressed in
pub const RAY: U256 = U256([11_515_845_246_265_065_472, 54_210_108, 0, 0]);

/// Checked arithmetic that reports which operation failed
///
/// Mirrors the checked_* family on [`U256`] but returns a typed error
/// instead of `None`, so formulas can be written with `?`.
pub trait CheckedMath: Sized {
    fn safe_add(self, rhs: Self) -> Result<Self, FixedPointError>;
    fn safe_sub(self, rhs: Self) -> Result<Self, FixedPointError>;
    fn safe_mul(self, rhs: Self) -> Result<Self, FixedPointError>;
    fn safe_div(self, rhs: Self) -> Result<Self, FixedPointError>;
}

impl CheckedMath for U256 {
    #[inline]
    fn safe_add(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.checked_add(rhs)
            .ok_or(FixedPointError::Overflow { op: "add" })
    }

    #[inline]
    fn safe_sub(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.checked_sub(rhs)
            .ok_or(FixedPointError::Underflow { op: "sub" })
    }

    #[inline]
    fn safe_mul(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.checked_mul(rhs)
            .ok_or(FixedPointError::Overflow { op: "mul" })
    }

    #[inline]
    fn safe_div(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.checked_div(rhs)
            .ok_or(FixedPointError::DivisionByZero { op: "div" })
    }
}

/// Compute `a * b / denominator`, multiplying first
///
/// # Arguments
/// * `a`, `b` - Factors, multiplied with overflow checking
/// * `denominator` - Divisor, must be non-zero
///
/// # Returns
/// The truncated quotient
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, FixedPointError> {
    if denominator.is_zero() {
        return Err(FixedPointError::DivisionByZero { op: "mul_div" });
    }
    let product = a
        .checked_mul(b)
        .ok_or(FixedPointError::Overflow { op: "mul_div" })?;
    Ok(product / denominator)
}

/// Absolute difference of two unsigned values
#[inline]
pub fn abs_diff(a: U256, b: U256) -> U256 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// True when `a` and `b` differ by at most one unit
#[inline]
pub fn within_one(a: U256, b: U256) -> bool {
    abs_diff(a, b) <= U256::one()
}

/// Parse an unsigned decimal integer string such as `"1000000000000000000"`
///
/// This is the PRIMARY method for reading amounts from configuration files
/// and command-line input.
pub fn parse_amount(input: &str) -> Result<U256, FixedPointError> {
    let trimmed = input.trim().replace('_', "");
    U256::from_dec_str(&trimmed).map_err(|_| FixedPointError::InvalidDecimal {
        input: input.to_string(),
    })
}
