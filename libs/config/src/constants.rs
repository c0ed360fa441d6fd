//! Protocol constants for the stableswap engine
//!
//! Fee values share one denominator. Amplification values are stored
//! multiplied by [`amplification::A_PRECISION`].

/// Trade and admin fee limits
pub mod fees {
    /// Denominator for swap and admin fee fractions (1e10)
    pub const FEE_DENOMINATOR: u64 = 10_000_000_000;

    /// Maximum swap fee (1e8 = 1%)
    pub const MAX_SWAP_FEE: u64 = 100_000_000;

    /// Maximum admin fee, expressed as a share of the swap fee (100%)
    pub const MAX_ADMIN_FEE: u64 = FEE_DENOMINATOR;
}

/// Amplification coefficient and ramp limits
pub mod amplification {
    /// Multiplier applied to A for interpolation precision
    pub const A_PRECISION: u64 = 100;

    /// Exclusive upper bound on A (unscaled)
    pub const MAX_A: u64 = 1_000_000;

    /// Maximum multiplicative change of A in one ramp, either direction
    pub const MAX_A_CHANGE: u64 = 2;

    /// Minimum ramp duration (14 days)
    pub const MIN_RAMP_TIME_SECS: u64 = 14 * 24 * 60 * 60;

    /// Minimum delay between two ramp starts (1 day)
    pub const RAMP_COOLDOWN_SECS: u64 = 24 * 60 * 60;
}

/// Newton solver limits
pub mod solver {
    /// Iteration cap for both invariant solvers
    pub const MAX_LOOP_LIMIT: usize = 256;
}

/// Nested base pool settings
pub mod base_pool {
    /// Age after which a cached base-pool virtual price is refetched (10 minutes)
    pub const BASE_CACHE_EXPIRE_SECS: u64 = 10 * 60;
}
