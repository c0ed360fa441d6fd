//! Pool error taxonomy
//!
//! Variants are grouped the way callers are expected to react to them:
//! validation failures are caller bugs, economic limits are surfaced
//! verbatim, numerical failures abort the whole operation, temporal
//! failures depend on the single timestamp read for the call.

use driftswap_types::{FixedPointError, PrecisionError, U256};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PoolError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    // Validation
    /// Amount vector length does not match the pool's token count
    #[error("Expected {expected} amounts, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// Token index outside the pool
    #[error("Token index {index} out of range for {len} tokens")]
    IndexOutOfRange { index: usize, len: usize },

    /// Swap from a token into itself
    #[error("Cannot swap token {index} for itself")]
    SameToken { index: usize },

    #[error("Pool needs at least 2 tokens, got {count}")]
    TooFewTokens { count: usize },

    #[error(transparent)]
    Precision(#[from] PrecisionError),

    /// Swap or admin fee above its ceiling
    #[error("Fee is too high: {fee} > {max}")]
    FeeTooHigh { fee: u64, max: u64 },

    /// Amplification outside `(0, max)`
    #[error("A = {a} must be > 0 and < {max}")]
    AOutOfBounds { a: u64, max: u64 },

    /// Drift rate snapshot of zero
    #[error("Drift rate must be positive")]
    InvalidRate,

    /// Drift index missing from the pool or pointing at the base-pool share
    #[error("Invalid drift index {index}")]
    InvalidDriftIndex { index: usize },

    // Economic limits
    #[error("Slippage limit exceeded: got {actual}, limit {limit}")]
    SlippageExceeded { actual: U256, limit: U256 },

    /// Withdrawal larger than the pool balance of a token
    #[error("Cannot withdraw more than available of token {index}")]
    ExceedsAvailable { index: usize },

    /// Share value exceeds the drift-adjusted balance of the requested token
    #[error("Withdraw exceeds available drift-adjusted balance of token {index}")]
    WithdrawExceedsAvailable { index: usize },

    #[error("Cannot exceed total supply: {amount} > {supply}")]
    ExceedsTotalSupply { amount: U256, supply: U256 },

    #[error("Burn of {requested} exceeds owned shares {owned}")]
    InsufficientShares { requested: U256, owned: U256 },

    #[error("Cannot spend {required}, caller holds {available}")]
    InsufficientBalance { required: U256, available: U256 },

    /// First deposit left a token empty
    #[error("Must supply all tokens in pool, token {index} is zero")]
    MustSupplyAllTokens { index: usize },

    #[error("D should increase")]
    InvariantDidNotIncrease,

    #[error("Burnt amount cannot be zero")]
    ZeroBurn,

    // Numerical
    #[error("{solver} did not converge within {iterations} iterations")]
    DidNotConverge {
        solver: &'static str,
        iterations: usize,
    },

    #[error(transparent)]
    Math(#[from] FixedPointError),

    // Temporal
    #[error("Deadline {deadline} passed at {now}")]
    DeadlinePassed { deadline: u64, now: u64 },

    #[error("Wait until {earliest} before starting a new ramp")]
    RampTooSoon { earliest: u64 },

    #[error("Insufficient ramp time: ends {future_time}, earliest allowed {earliest}")]
    RampTooShort { future_time: u64, earliest: u64 },

    #[error("futureA is too small: {requested} vs current {current}")]
    AChangeTooSmall { current: u64, requested: u64 },

    #[error("futureA is too large: {requested} vs current {current}")]
    AChangeTooLarge { current: u64, requested: u64 },

    #[error("Ramp is already stopped")]
    AlreadyStopped,
}

impl PoolError {
    /// Fail with [`PoolError::DeadlinePassed`] once `now` is past `deadline`
    pub fn check_deadline(deadline: u64, now: u64) -> Result<()> {
        if now > deadline {
            return Err(PoolError::DeadlinePassed { deadline, now });
        }
        Ok(())
    }

    /// Fail with [`PoolError::IndexOutOfRange`] unless `index < len`
    pub fn check_index(index: usize, len: usize) -> Result<()> {
        if index >= len {
            return Err(PoolError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    /// Fail with [`PoolError::ArityMismatch`] unless `actual == expected`
    pub fn check_arity(expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(PoolError::ArityMismatch { expected, actual });
        }
        Ok(())
    }
}
