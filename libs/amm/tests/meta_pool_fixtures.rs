//! Drifting Meta Pool Regression Tests
//!
//! Exact values for a RAI/base-share pool seeded with one of each token at
//! the unit rate, then observed at 1.5 and 0.5 RAY.

mod common;

use common::*;
use driftswap_amm::{
    AddLiquidityRequest, PoolError, RemoveImbalanceRequest, RemoveLiquidityRequest, RemoveOneTokenRequest, SwapRequest,
};
use driftswap_types::{U256, RAY};

/// Virtual price follows the drift rate with no other operation
#[test]
fn test_virtual_price_tracks_rate() {
    assert_eq!(meta_pool(RAY).get_virtual_price(T0).unwrap(), wad());
    assert_eq!(
        meta_pool(high_rate()).get_virtual_price(T0).unwrap(),
        u(1_249_489_997_713_579_157)
    );
    assert_eq!(
        meta_pool(low_rate()).get_virtual_price(T0).unwrap(),
        u(749_084_212_234_759_883)
    );
}

#[test]
fn test_calculate_swap() {
    let dx = wad() / 10;
    assert_eq!(
        meta_pool(high_rate()).quote_swap(0, 1, dx, T0).unwrap(),
        u(148_100_769_371_293_393)
    );
    assert_eq!(
        meta_pool(low_rate()).quote_swap(0, 1, dx, T0).unwrap(),
        u(50_661_237_372_326_538)
    );
}

#[test]
fn test_add_liquidity_at_each_rate() {
    let amounts = [wad() * 2, wad() / 100];
    assert_eq!(
        meta_pool(high_rate()).quote_add_liquidity(&amounts, T0).unwrap(),
        u(2_380_413_123_715_248_198)
    );
    assert_eq!(
        meta_pool(low_rate()).quote_add_liquidity(&amounts, T0).unwrap(),
        u(1_348_571_688_270_068_450)
    );
    assert_eq!(
        meta_pool(RAY).quote_add_liquidity(&amounts, T0).unwrap(),
        u(1_996_275_270_169_644_725)
    );

    assert_eq!(
        meta_pool(high_rate())
            .quote_add_liquidity(&[wad() / 10, U256::zero()], T0)
            .unwrap(),
        u(119_488_639_743_016_353)
    );
    assert_eq!(
        meta_pool(RAY)
            .quote_add_liquidity(&[wad(), wad() * 3], T0)
            .unwrap(),
        u(3_991_672_211_258_372_957)
    );
}

/// Per unit of drift-adjusted value, the drift token mints fewer shares
/// above the unit rate and more below it
#[test]
fn test_drift_asymmetry() {
    let dx = wad() / 10;

    let high = meta_pool(high_rate());
    let drift_side = high.quote_add_liquidity(&[dx, U256::zero()], T0).unwrap();
    let base_side = high.quote_add_liquidity(&[U256::zero(), dx], T0).unwrap();
    assert!(drift_side * RAY / high_rate() < base_side);

    let low = meta_pool(low_rate());
    let drift_side = low.quote_add_liquidity(&[dx, U256::zero()], T0).unwrap();
    let base_side = low.quote_add_liquidity(&[U256::zero(), dx], T0).unwrap();
    assert!(drift_side * RAY / low_rate() > base_side);
}

#[test]
fn test_virtual_price_after_single_sided_deposit() {
    let mut pool = meta_pool(high_rate());
    add(&mut pool, [wad(), U256::zero()]);
    assert_eq!(
        pool.get_virtual_price(T0).unwrap(),
        u(1_249_679_383_882_433_617)
    );
}

#[test]
fn test_balanced_removal_after_deposit() {
    let mut pool = meta_pool(high_rate());
    let minted = add(&mut pool, [wad() * 2, wad() / 100]);
    assert_eq!(
        pool.quote_remove_liquidity(minted).unwrap(),
        vec![u(1_630_266_180_256_738_228), u(548_856_280_686_435_203)]
    );

    let request = RemoveLiquidityRequest::new(minted, vec![U256::zero(); 2], T0);
    let amounts = pool.execute_remove_liquidity(&request, T0).unwrap();
    assert_eq!(amounts[0], u(1_630_266_180_256_738_228));
}

#[test]
fn test_balanced_round_trip_keeps_virtual_price() {
    let mut pool = meta_pool(RAY);
    let minted = add(&mut pool, [wad(), wad()]);
    let request = RemoveLiquidityRequest::new(minted, vec![U256::zero(); 2], T0);
    assert_eq!(
        pool.execute_remove_liquidity(&request, T0).unwrap(),
        vec![wad(), wad()]
    );
    assert_eq!(pool.get_virtual_price(T0).unwrap(), wad());
}

#[test]
fn test_virtual_price_rises_with_swaps() {
    let mut pool = meta_pool(high_rate());
    swap(&mut pool, 0, 1, wad() / 10);
    assert_eq!(
        pool.get_virtual_price(T0).unwrap(),
        u(1_249_564_793_276_303_253)
    );
    swap(&mut pool, 1, 0, wad() / 10);
    assert_eq!(
        pool.get_virtual_price(T0).unwrap(),
        u(1_249_615_206_856_672_664)
    );
}

#[test]
fn test_remove_imbalance_across_rates() {
    let mut pool = meta_pool(RAY);
    add(&mut pool, [wad(), wad()]);
    add(&mut pool, [wad(), wad()]);
    assert_eq!(pool.get_virtual_price(T0).unwrap(), wad());

    let max_burn = pool.state().total_supply;
    pool.rate_source_mut().set_rate(high_rate());
    pool.execute_remove_liquidity_imbalance(
        &RemoveImbalanceRequest::new(vec![wad(), U256::zero()], max_burn, T0),
        T0,
    )
    .unwrap();
    assert_eq!(
        pool.get_virtual_price(T0).unwrap(),
        u(1_249_615_010_219_932_918)
    );

    let max_burn = pool.state().total_supply;
    pool.rate_source_mut().set_rate(low_rate());
    pool.execute_remove_liquidity_imbalance(
        &RemoveImbalanceRequest::new(vec![U256::zero(), wad()], max_burn, T0),
        T0,
    )
    .unwrap();
    assert_eq!(
        pool.get_virtual_price(T0).unwrap(),
        u(830_450_101_837_688_234)
    );
}

#[test]
fn test_deposits_across_rates() {
    let mut pool = meta_pool(RAY);
    add(&mut pool, [wad(), wad()]);
    assert_eq!(pool.get_virtual_price(T0).unwrap(), wad());

    add(&mut pool, [wad() * 2, U256::zero()]);
    assert_eq!(
        pool.get_virtual_price(T0).unwrap(),
        u(1_000_167_146_429_977_312)
    );

    pool.rate_source_mut().set_rate(low_rate());
    assert_eq!(
        pool.get_virtual_price(T0).unwrap(),
        u(667_593_262_609_390_758)
    );
    add(&mut pool, [wad() * 2, wad()]);
    assert_eq!(
        pool.get_virtual_price(T0).unwrap(),
        u(667_593_262_609_390_758)
    );
}

#[test]
fn test_remove_one_token() {
    assert_eq!(
        meta_pool(RAY)
            .quote_remove_liquidity_one_token(wad(), 0, T0)
            .unwrap(),
        u(954_404_308_901_884_931)
    );

    let mut pool = meta_pool(high_rate());
    let request = RemoveOneTokenRequest::new(wad(), 0, U256::zero(), T0);
    assert_eq!(
        pool.execute_remove_liquidity_one_token(&request, T0).unwrap(),
        u(828_982_515_014_366_590)
    );
    assert_eq!(pool.state().total_supply, wad());
}

#[test]
fn test_remove_one_token_exceeds_drift_adjusted_balance() {
    let pool = meta_pool(low_rate());
    // 0.5 RAY leaves token 0 worth half a share
    assert_eq!(
        pool.quote_remove_liquidity_one_token(wad() * 3 / 4, 0, T0),
        Err(PoolError::WithdrawExceedsAvailable { index: 0 })
    );
}

#[test]
fn test_admin_fees_accrue_on_swaps() {
    let mut pool = meta_pool(high_rate());
    pool.set_admin_fee(100_000_000).unwrap();

    swap(&mut pool, 0, 1, wad() / 10);
    assert_eq!(pool.get_admin_balance(1).unwrap(), u(1_482_490_183_896));
    swap(&mut pool, 1, 0, wad() / 10);
    assert_eq!(pool.get_admin_balance(0).unwrap(), u(675_276_327_691));

    let drained = pool.withdraw_admin_fees();
    assert_eq!(drained, vec![u(675_276_327_691), u(1_482_490_183_896)]);
    assert_eq!(pool.get_admin_balance(0).unwrap(), U256::zero());
}

#[test]
fn test_admin_fees_follow_rate_changes() {
    let mut pool = meta_pool(high_rate());
    pool.set_admin_fee(100_000_000).unwrap();
    swap(&mut pool, 0, 1, wad() / 10);
    pool.rate_source_mut().set_rate(low_rate());
    swap(&mut pool, 1, 0, wad() / 10);
    assert_eq!(pool.get_admin_balance(0).unwrap(), u(1_973_400_179_918));
}

#[test]
fn test_admin_fees_leave_lp_value_consistent() {
    let mut pool = meta_pool(high_rate());
    pool.set_admin_fee(100_000_000).unwrap();
    let minted = add(&mut pool, [wad(), wad()]);
    for _ in 0..10 {
        swap(&mut pool, 0, 1, wad() / 10);
        swap(&mut pool, 1, 0, u(148_500_000_000_000_000));
    }
    assert_eq!(
        pool.quote_remove_liquidity(minted).unwrap(),
        vec![u(1_000_508_971_050_812_103), u(1_000_715_719_181_667_297)]
    );
}

#[test]
fn test_slippage_and_deadline_leave_state() {
    let mut pool = meta_pool(high_rate());
    let before = pool.state().clone();

    let greedy = SwapRequest::new(0, 1, wad() / 10, wad(), T0);
    assert!(matches!(
        pool.execute_swap(&greedy, T0),
        Err(PoolError::SlippageExceeded { .. })
    ));
    let late = SwapRequest::new(0, 1, wad() / 10, U256::zero(), T0 - 1);
    assert!(matches!(
        pool.execute_swap(&late, T0),
        Err(PoolError::DeadlinePassed { .. })
    ));
    let burn_too_much = RemoveImbalanceRequest::new(vec![wad() / 2, U256::zero()], wad(), T0)
        .with_caller_shares(wad() / 2);
    assert!(matches!(
        pool.execute_remove_liquidity_imbalance(&burn_too_much, T0),
        Err(PoolError::InsufficientShares { .. })
    ));

    assert_eq!(pool.state(), &before);
}

#[test]
fn test_custody_limits_leave_state() {
    let mut pool = meta_pool(high_rate());
    let before = pool.state().clone();

    let overdrawn = AddLiquidityRequest::new(vec![wad(), U256::zero()], U256::zero(), T0)
        .with_caller_balances(vec![wad() / 2, wad()]);
    assert_eq!(
        pool.execute_add_liquidity(&overdrawn, T0),
        Err(PoolError::InsufficientBalance {
            required: wad(),
            available: wad() / 2
        })
    );
    let short_balances = AddLiquidityRequest::new(vec![wad(), U256::zero()], U256::zero(), T0)
        .with_caller_balances(vec![wad()]);
    assert_eq!(
        pool.execute_add_liquidity(&short_balances, T0),
        Err(PoolError::ArityMismatch {
            expected: 2,
            actual: 1
        })
    );

    let burn_too_much = RemoveOneTokenRequest::new(wad() / 2, 0, U256::zero(), T0)
        .with_caller_shares(wad() / 4);
    assert_eq!(
        pool.execute_remove_liquidity_one_token(&burn_too_much, T0),
        Err(PoolError::InsufficientShares {
            requested: wad() / 2,
            owned: wad() / 4
        })
    );

    assert_eq!(pool.state(), &before);

    let funded = AddLiquidityRequest::new(vec![wad(), U256::zero()], U256::zero(), T0)
        .with_caller_balances(vec![wad(), U256::zero()]);
    assert!(pool.execute_add_liquidity(&funded, T0).is_ok());
}
