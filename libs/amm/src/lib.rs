//! # Driftswap AMM - Drifting Stableswap Invariant Engine
//!
//! ## Purpose
//!
//! Exact integer math for stableswap pools whose amplification ramps over
//! time and whose drift token is rescaled by an external exchange-rate
//! snapshot. Covers the invariant solver, swaps, all deposit and
//! withdrawal flows, fee accounting, virtual price, and swaps routed
//! through a nested base pool.
//!
//! ## Integration Points
//!
//! - **Rate input**: [`RateSource`] supplies one RAY-scaled rate per call
//! - **Base pool**: [`BasePool`] is the narrow seam to the nested pool;
//!   [`StableSwapPool`] implements it
//! - **Custody**: callers pass their holdings on each request; the engine
//!   refuses to overspend but never moves tokens itself
//! - **Time**: every call takes `now` explicitly; nothing reads a clock
//!
//! ## Architecture Role
//!
//! ```text
//! RateSource ─┐
//! BasePool ───┼─> Normalizer ─> PoolView ─> SwapEngine / LiquidityEngine ─> PoolState
//! AmplificationState ─────────────┘               └─> InvariantSolver
//! ```
//!
//! Each operation builds one [`Normalizer`] and one [`PoolView`], computes a
//! complete quote, checks every limit, then commits. A failed call leaves
//! the pool untouched.
//!
//! ## Examples
//!
//! ```rust
//! use driftswap_amm::{AddLiquidityRequest, PoolState, StableSwapPool};
//! use driftswap_config::RampLimits;
//! use driftswap_types::U256;
//!
//! let state = PoolState::new(&[18, 6], 100, 4_000_000, 0, RampLimits::default())?;
//! let mut pool = StableSwapPool::new(state);
//! let now = 1_700_000_000;
//!
//! let deposit = vec![U256::exp10(18), U256::exp10(6)];
//! pool.execute_add_liquidity(&AddLiquidityRequest::new(deposit, U256::zero(), now), now)?;
//! assert_eq!(pool.get_virtual_price(now)?, U256::exp10(18));
//! # Ok::<(), driftswap_amm::PoolError>(())
//! ```

pub mod amplification;
pub mod bridge;
pub mod error;
pub mod fees;
pub mod invariant;
pub mod liquidity;
pub mod meta;
pub mod normalizer;
pub mod pool;
pub mod pool_traits;
pub mod requests;
pub mod swap;
pub mod virtual_price;

pub use amplification::AmplificationState;
pub use bridge::UnderlyingRoute;
pub use error::{PoolError, Result};
pub use fees::FeeSchedule;
pub use invariant::{Convergence, InvariantSolver};
pub use liquidity::{AddLiquidityQuote, LiquidityEngine, RemoveImbalanceQuote, RemoveOneQuote};
pub use meta::{BaseVirtualPriceCache, DriftingMetaPool};
pub use normalizer::Normalizer;
pub use pool::{PoolState, PoolView, PooledAsset, StableSwapPool};
pub use pool_traits::{BasePool, RateSource, SnapshotRate};
pub use requests::{
    AddLiquidityRequest, RemoveImbalanceRequest, RemoveLiquidityRequest, RemoveOneTokenRequest,
    SwapRequest,
};
pub use swap::{NormalizedSwap, SwapEngine, SwapQuote};
pub use virtual_price::VirtualPriceCalculator;
