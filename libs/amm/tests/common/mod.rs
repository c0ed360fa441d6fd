//! Shared fixtures: a DAI/USDC/USDT base pool and a RAI/base-share meta pool

#![allow(dead_code)]

use driftswap_amm::{
    AddLiquidityRequest, DriftingMetaPool, PoolState, SnapshotRate, StableSwapPool,
};
use driftswap_config::RampLimits;
use driftswap_types::{U256, RAY, WAD};

pub const T0: u64 = 1_700_000_000;
pub const DAY: u64 = 86_400;

pub type MetaPool = DriftingMetaPool<SnapshotRate, StableSwapPool>;

pub fn wad() -> U256 {
    WAD
}

/// 1.5 RAY
pub fn high_rate() -> U256 {
    RAY * 15 / 10
}

/// 0.5 RAY
pub fn low_rate() -> U256 {
    RAY * 5 / 10
}

pub fn u(value: u128) -> U256 {
    U256::from(value)
}

/// A = 200, 0.04% fee, three balanced deposits of 100 of each token
pub fn base_pool() -> StableSwapPool {
    let state = PoolState::new(&[18, 6, 6], 200, 4_000_000, 0, RampLimits::default())
        .expect("base pool state");
    let mut pool = StableSwapPool::new(state);
    let deposit = vec![wad() * 100, u(100_000_000), u(100_000_000)];
    for _ in 0..3 {
        pool.execute_add_liquidity(&AddLiquidityRequest::new(deposit.clone(), U256::zero(), T0), T0)
            .expect("base deposit");
    }
    pool
}

/// A = 50, 0.1% fee, drift on token 0, seeded with one of each token at
/// the unit rate, then moved to `rate`
pub fn meta_pool(rate: U256) -> MetaPool {
    let state = PoolState::new(&[18, 18], 50, 10_000_000, 0, RampLimits::default())
        .expect("meta pool state");
    let mut pool = DriftingMetaPool::new(state, Some(0), SnapshotRate::default(), base_pool(), 600, T0)
        .expect("meta pool");
    add(&mut pool, [wad(), wad()]);
    pool.rate_source_mut().set_rate(rate);
    pool
}

pub fn add(pool: &mut MetaPool, amounts: [U256; 2]) -> U256 {
    pool.execute_add_liquidity(
        &AddLiquidityRequest::new(amounts.to_vec(), U256::zero(), T0),
        T0,
    )
    .expect("deposit")
}

pub fn swap(pool: &mut MetaPool, from: usize, to: usize, dx: U256) -> U256 {
    pool.execute_swap(
        &driftswap_amm::SwapRequest::new(from, to, dx, U256::zero(), T0),
        T0,
    )
    .expect("swap")
}
