//! Deposit and withdrawal math
//!
//! All four flows are expressed as invariant deltas. Imbalanced deposits and
//! withdrawals pay `fee_per_token` on each token's distance from its ideal
//! proportional balance; the admin share of that fee stays out of the
//! stored balance and accrues to the admin fee ledger.

use crate::error::{PoolError, Result};
use crate::invariant::InvariantSolver;
use crate::normalizer::Normalizer;
use crate::pool::{PoolState, PoolView};
use crate::requests::{
    check_burn, AddLiquidityRequest, RemoveImbalanceRequest, RemoveLiquidityRequest,
    RemoveOneTokenRequest,
};
use driftswap_config::fees::FEE_DENOMINATOR;
use driftswap_types::{mul_div, CheckedMath, U256};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityQuote {
    pub minted: U256,
    /// Balances to store after the deposit
    pub new_balances: Vec<U256>,
    /// Imbalance fee charged per token
    pub fees: Vec<U256>,
    pub admin_fees: Vec<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveImbalanceQuote {
    /// Shares to burn, rounded up by one unit
    pub burn: U256,
    pub amounts: Vec<U256>,
    pub new_balances: Vec<U256>,
    pub fees: Vec<U256>,
    pub admin_fees: Vec<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOneQuote {
    pub token_index: usize,
    pub amount: U256,
    /// Tokens paid out in native decimals
    pub dy: U256,
    /// Fee retained by the pool in native decimals
    pub swap_fee: U256,
    pub admin_fee: U256,
}

/// Imbalance-fee pass shared by deposits and imbalanced withdrawals
///
/// Returns `(stored, fee_adjusted, fees, admin_fees)`.
fn charge_imbalance(
    view: &PoolView<'_>,
    old_balances: &[U256],
    new_balances: &[U256],
    d0: U256,
    d1: U256,
) -> Result<(Vec<U256>, Vec<U256>, Vec<U256>, Vec<U256>)> {
    let n = view.num_tokens();
    let mut stored = Vec::with_capacity(n);
    let mut adjusted = Vec::with_capacity(n);
    let mut fees = Vec::with_capacity(n);
    let mut admin_fees = Vec::with_capacity(n);

    for (old, new) in old_balances.iter().zip(new_balances) {
        let ideal = mul_div(d1, *old, d0)?;
        let fee = view.state.fees.imbalance_fee(n, ideal, *new)?;
        let admin = view.state.fees.admin_share(fee)?;
        stored.push(new.safe_sub(admin)?);
        adjusted.push(new.safe_sub(fee)?);
        fees.push(fee);
        admin_fees.push(admin);
    }
    Ok((stored, adjusted, fees, admin_fees))
}

pub struct LiquidityEngine;

impl LiquidityEngine {
    /// Shares minted for depositing `amounts`, imbalance fees included
    pub fn quote_add(view: &PoolView<'_>, amounts: &[U256]) -> Result<AddLiquidityQuote> {
        let n = view.num_tokens();
        PoolError::check_arity(n, amounts.len())?;

        let supply = view.state.total_supply;
        let balances = view.state.balances();
        let d0 = if supply.is_zero() {
            U256::zero()
        } else {
            view.d_of(&balances)?
        };

        let mut new_balances = Vec::with_capacity(n);
        for (i, (balance, amount)) in balances.iter().zip(amounts).enumerate() {
            if supply.is_zero() && amount.is_zero() {
                return Err(PoolError::MustSupplyAllTokens { index: i });
            }
            new_balances.push(balance.safe_add(*amount)?);
        }

        let d1 = view.d_of(&new_balances)?;
        if d1 <= d0 {
            return Err(PoolError::InvariantDidNotIncrease);
        }

        if supply.is_zero() {
            return Ok(AddLiquidityQuote {
                minted: d1,
                new_balances,
                fees: vec![U256::zero(); n],
                admin_fees: vec![U256::zero(); n],
            });
        }

        let (stored, adjusted, fees, admin_fees) =
            charge_imbalance(view, &balances, &new_balances, d0, d1)?;
        let d2 = view.d_of(&adjusted)?;
        let minted = mul_div(d2.safe_sub(d0)?, supply, d0)?;

        debug!(%d0, %d1, %d2, %minted, "Deposit quoted");
        Ok(AddLiquidityQuote {
            minted,
            new_balances: stored,
            fees,
            admin_fees,
        })
    }

    /// Fee-free share delta of a deposit or withdrawal of `amounts`
    pub fn calculate_token_amount(
        view: &PoolView<'_>,
        amounts: &[U256],
        deposit: bool,
    ) -> Result<U256> {
        PoolError::check_arity(view.num_tokens(), amounts.len())?;
        let balances = view.state.balances();
        let d0 = view.d_of(&balances)?;

        let mut moved = Vec::with_capacity(balances.len());
        for (i, (balance, amount)) in balances.iter().zip(amounts).enumerate() {
            moved.push(if deposit {
                balance.safe_add(*amount)?
            } else {
                balance
                    .checked_sub(*amount)
                    .ok_or(PoolError::ExceedsAvailable { index: i })?
            });
        }
        let d1 = view.d_of(&moved)?;

        let diff = if deposit {
            d1.safe_sub(d0)?
        } else {
            d0.safe_sub(d1)?
        };
        Ok(mul_div(diff, view.state.total_supply, d0)?)
    }

    /// Balanced payout for burning `amount` shares, no fee
    pub fn quote_remove(state: &PoolState, amount: U256) -> Result<Vec<U256>> {
        let supply = state.total_supply;
        if amount > supply {
            return Err(PoolError::ExceedsTotalSupply { amount, supply });
        }
        state
            .balances()
            .iter()
            .map(|b| Ok(mul_div(*b, amount, supply)?))
            .collect()
    }

    /// Shares burned for withdrawing exactly `amounts`
    pub fn quote_remove_imbalance(
        view: &PoolView<'_>,
        amounts: &[U256],
    ) -> Result<RemoveImbalanceQuote> {
        let n = view.num_tokens();
        PoolError::check_arity(n, amounts.len())?;

        let supply = view.state.total_supply;
        let balances = view.state.balances();
        let d0 = view.d_of(&balances)?;

        let mut remaining = Vec::with_capacity(n);
        for (i, (balance, amount)) in balances.iter().zip(amounts).enumerate() {
            remaining.push(
                balance
                    .checked_sub(*amount)
                    .ok_or(PoolError::ExceedsAvailable { index: i })?,
            );
        }
        let d1 = view.d_of(&remaining)?;

        let (stored, adjusted, fees, admin_fees) =
            charge_imbalance(view, &balances, &remaining, d0, d1)?;
        let d2 = view.d_of(&adjusted)?;

        let burn = mul_div(d0.safe_sub(d2)?, supply, d0)?;
        if burn.is_zero() {
            return Err(PoolError::ZeroBurn);
        }
        let burn = burn.safe_add(U256::one())?;

        debug!(%d0, %d1, %d2, %burn, "Imbalanced withdrawal quoted");
        Ok(RemoveImbalanceQuote {
            burn,
            amounts: amounts.to_vec(),
            new_balances: stored,
            fees,
            admin_fees,
        })
    }

    /// Single-token payout for burning `amount` shares
    pub fn quote_remove_one(
        view: &PoolView<'_>,
        amount: U256,
        token_index: usize,
    ) -> Result<RemoveOneQuote> {
        let n = view.num_tokens();
        PoolError::check_index(token_index, n)?;
        let supply = view.state.total_supply;
        if amount > supply {
            return Err(PoolError::ExceedsTotalSupply { amount, supply });
        }

        let xp = view.xp()?;
        let d0 = view.solver.solve_d(&xp, view.a_precise)?;
        if amount > xp[token_index] {
            warn!(token_index, %amount, available = %xp[token_index], "Withdraw exceeds available");
            return Err(PoolError::WithdrawExceedsAvailable { index: token_index });
        }

        let d1 = d0.safe_sub(mul_div(amount, d0, supply)?)?;
        let new_y = view
            .solver
            .solve_y_d(view.a_precise, token_index, &xp, d1)?;

        let fee_per_token = view.state.fees.fee_per_token(n);
        let fee_denominator = U256::from(FEE_DENOMINATOR);
        let mut reduced = Vec::with_capacity(n);
        for (i, x) in xp.iter().enumerate() {
            let proportional = mul_div(*x, d1, d0)?;
            let expected = if i == token_index {
                proportional.safe_sub(new_y)?
            } else {
                x.safe_sub(proportional)?
            };
            reduced.push(x.safe_sub(mul_div(expected, fee_per_token, fee_denominator)?)?);
        }

        let solved = view
            .solver
            .solve_y_d(view.a_precise, token_index, &reduced, d1)?;
        let dy_normalized = reduced[token_index].safe_sub(solved)?;

        let normalizer = &view.normalizer;
        let precision = normalizer.precision(token_index)?;
        let dy = precision.from_pool_units(
            normalizer
                .descale(token_index, dy_normalized)?
                .safe_sub(U256::one())?,
        );

        let current_y = normalizer.descale(token_index, xp[token_index])?;
        let new_y = normalizer.descale(token_index, new_y)?;
        let swap_fee = precision
            .from_pool_units(current_y.safe_sub(new_y)?)
            .safe_sub(dy)?;
        let admin_fee = view.state.fees.admin_share(swap_fee)?;

        debug!(token_index, %amount, %dy, %swap_fee, "Single-token withdrawal quoted");
        Ok(RemoveOneQuote {
            token_index,
            amount,
            dy,
            swap_fee,
            admin_fee,
        })
    }
}

fn add_admin_fees(state: &PoolState, admin_fees: &[U256]) -> Result<Vec<U256>> {
    state
        .admin_fee_balances
        .iter()
        .zip(admin_fees)
        .map(|(held, fee)| Ok(held.safe_add(*fee)?))
        .collect()
}

impl PoolState {
    pub fn execute_add_liquidity(
        &mut self,
        normalizer: Normalizer,
        now: u64,
        solver: InvariantSolver,
        request: &AddLiquidityRequest,
    ) -> Result<AddLiquidityQuote> {
        PoolError::check_deadline(request.deadline, now)?;
        request.check_caller_balances()?;

        let quote = LiquidityEngine::quote_add(&self.view(normalizer, now, solver), &request.amounts)?;
        if quote.minted < request.min_to_mint {
            return Err(PoolError::SlippageExceeded {
                actual: quote.minted,
                limit: request.min_to_mint,
            });
        }

        let admin_balances = add_admin_fees(self, &quote.admin_fees)?;
        let supply = self.total_supply.safe_add(quote.minted)?;

        self.set_balances(&quote.new_balances);
        self.admin_fee_balances = admin_balances;
        self.total_supply = supply;

        info!(minted = %quote.minted, supply = %supply, "Liquidity added");
        Ok(quote)
    }

    pub fn execute_remove_liquidity(
        &mut self,
        now: u64,
        request: &RemoveLiquidityRequest,
    ) -> Result<Vec<U256>> {
        PoolError::check_deadline(request.deadline, now)?;
        check_burn(request.amount, request.caller_shares)?;
        PoolError::check_arity(self.num_tokens(), request.min_amounts.len())?;

        let amounts = LiquidityEngine::quote_remove(self, request.amount)?;
        for (amount, min) in amounts.iter().zip(&request.min_amounts) {
            if amount < min {
                return Err(PoolError::SlippageExceeded {
                    actual: *amount,
                    limit: *min,
                });
            }
        }

        let balances = self
            .balances()
            .iter()
            .zip(&amounts)
            .map(|(b, a)| Ok(b.safe_sub(*a)?))
            .collect::<Result<Vec<_>>>()?;
        let supply = self.total_supply.safe_sub(request.amount)?;

        self.set_balances(&balances);
        self.total_supply = supply;

        info!(burned = %request.amount, amounts = ?amounts, "Liquidity removed");
        Ok(amounts)
    }

    pub fn execute_remove_liquidity_imbalance(
        &mut self,
        normalizer: Normalizer,
        now: u64,
        solver: InvariantSolver,
        request: &RemoveImbalanceRequest,
    ) -> Result<RemoveImbalanceQuote> {
        PoolError::check_deadline(request.deadline, now)?;
        if request.max_burn.is_zero() {
            return Err(PoolError::ZeroBurn);
        }
        check_burn(request.max_burn, request.caller_shares)?;

        let quote = LiquidityEngine::quote_remove_imbalance(
            &self.view(normalizer, now, solver),
            &request.amounts,
        )?;
        if quote.burn > request.max_burn {
            return Err(PoolError::SlippageExceeded {
                actual: quote.burn,
                limit: request.max_burn,
            });
        }

        let admin_balances = add_admin_fees(self, &quote.admin_fees)?;
        let supply = self.total_supply.safe_sub(quote.burn)?;

        self.set_balances(&quote.new_balances);
        self.admin_fee_balances = admin_balances;
        self.total_supply = supply;

        info!(burned = %quote.burn, amounts = ?quote.amounts, "Imbalanced liquidity removed");
        Ok(quote)
    }

    pub fn execute_remove_liquidity_one_token(
        &mut self,
        normalizer: Normalizer,
        now: u64,
        solver: InvariantSolver,
        request: &RemoveOneTokenRequest,
    ) -> Result<RemoveOneQuote> {
        PoolError::check_deadline(request.deadline, now)?;
        check_burn(request.amount, request.caller_shares)?;

        let quote = LiquidityEngine::quote_remove_one(
            &self.view(normalizer, now, solver),
            request.amount,
            request.token_index,
        )?;
        if quote.dy < request.min_amount {
            return Err(PoolError::SlippageExceeded {
                actual: quote.dy,
                limit: request.min_amount,
            });
        }

        let index = quote.token_index;
        let balance = self.assets[index]
            .balance
            .safe_sub(quote.dy.safe_add(quote.admin_fee)?)?;
        let admin_balance = self.admin_fee_balances[index].safe_add(quote.admin_fee)?;
        let supply = self.total_supply.safe_sub(quote.amount)?;

        self.assets[index].balance = balance;
        self.admin_fee_balances[index] = admin_balance;
        self.total_supply = supply;

        info!(token_index = index, burned = %quote.amount, dy = %quote.dy, "Single-token liquidity removed");
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftswap_config::RampLimits;

    const T0: u64 = 1_700_000_000;

    fn wad() -> U256 {
        U256::exp10(18)
    }

    fn empty() -> PoolState {
        PoolState::new(&[18, 18], 50, 10_000_000, 0, RampLimits::default()).unwrap()
    }

    fn plain(state: &PoolState) -> Normalizer {
        Normalizer::for_assets(&state.assets)
    }

    fn add(state: &mut PoolState, amounts: [U256; 2]) -> Result<U256> {
        let normalizer = plain(state);
        let request = AddLiquidityRequest::new(amounts.to_vec(), U256::zero(), T0);
        state
            .execute_add_liquidity(normalizer, T0, InvariantSolver::default(), &request)
            .map(|q| q.minted)
    }

    fn seeded() -> PoolState {
        let mut state = empty();
        add(&mut state, [wad(), wad()]).unwrap();
        state
    }

    #[test]
    fn test_first_deposit_mints_d() {
        let mut state = empty();
        assert_eq!(add(&mut state, [wad(), wad()]).unwrap(), wad() * 2);
        assert_eq!(state.total_supply, wad() * 2);
    }

    #[test]
    fn test_first_deposit_requires_all_tokens() {
        let mut state = empty();
        assert_eq!(
            add(&mut state, [wad(), U256::zero()]),
            Err(PoolError::MustSupplyAllTokens { index: 1 })
        );
        assert_eq!(state, empty());
    }

    #[test]
    fn test_zero_deposit_does_not_increase_d() {
        let mut state = seeded();
        assert_eq!(
            add(&mut state, [U256::zero(), U256::zero()]),
            Err(PoolError::InvariantDidNotIncrease)
        );
    }

    #[test]
    fn test_imbalanced_deposit_pays_fee() {
        let mut state = seeded();
        let minted = add(&mut state, [wad(), wad() * 3]).unwrap();
        assert_eq!(minted, U256::from(3_991_672_211_258_372_957u128));

        let fee_free = {
            let mut fresh = seeded();
            fresh.fees.set_swap_fee(0).unwrap();
            add(&mut fresh, [wad(), wad() * 3]).unwrap()
        };
        assert!(fee_free > minted);
    }

    #[test]
    fn test_arity_mismatch() {
        let state = seeded();
        let view = state.view(plain(&state), T0, InvariantSolver::default());
        assert_eq!(
            LiquidityEngine::quote_add(&view, &[wad()]),
            Err(PoolError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            LiquidityEngine::quote_remove_imbalance(&view, &[wad(); 3]),
            Err(PoolError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_calculate_token_amount() {
        let state = seeded();
        let view = state.view(plain(&state), T0, InvariantSolver::default());
        let deposit = LiquidityEngine::calculate_token_amount(&view, &[wad(), wad()], true).unwrap();
        assert_eq!(deposit, wad() * 2);

        let withdraw =
            LiquidityEngine::calculate_token_amount(&view, &[wad() / 2, wad() / 2], false).unwrap();
        assert_eq!(withdraw, wad());

        assert_eq!(
            LiquidityEngine::calculate_token_amount(&view, &[wad() * 2, U256::zero()], false),
            Err(PoolError::ExceedsAvailable { index: 0 })
        );
    }

    #[test]
    fn test_balanced_remove() {
        let mut state = seeded();
        let amounts = LiquidityEngine::quote_remove(&state, wad()).unwrap();
        assert_eq!(amounts, vec![wad() / 2, wad() / 2]);

        assert!(matches!(
            LiquidityEngine::quote_remove(&state, wad() * 3),
            Err(PoolError::ExceedsTotalSupply { .. })
        ));

        let greedy = RemoveLiquidityRequest::new(wad(), vec![wad(), U256::zero()], T0);
        assert!(matches!(
            state.execute_remove_liquidity(T0, &greedy),
            Err(PoolError::SlippageExceeded { .. })
        ));

        let over = RemoveLiquidityRequest::new(wad(), vec![U256::zero(); 2], T0)
            .with_caller_shares(wad() / 2);
        assert!(matches!(
            state.execute_remove_liquidity(T0, &over),
            Err(PoolError::InsufficientShares { .. })
        ));

        let ok = RemoveLiquidityRequest::new(wad(), vec![U256::zero(); 2], T0);
        state.execute_remove_liquidity(T0, &ok).unwrap();
        assert_eq!(state.total_supply, wad());
        assert_eq!(state.balances(), vec![wad() / 2, wad() / 2]);
    }

    #[test]
    fn test_remove_imbalance_limits() {
        let mut state = seeded();
        let solver = InvariantSolver::default();

        let zero = RemoveImbalanceRequest::new(vec![wad() / 2, U256::zero()], U256::zero(), T0);
        assert_eq!(
            state.execute_remove_liquidity_imbalance(plain(&state), T0, solver, &zero),
            Err(PoolError::ZeroBurn)
        );

        let too_much = RemoveImbalanceRequest::new(vec![wad() * 2, U256::zero()], wad(), T0);
        assert_eq!(
            state.execute_remove_liquidity_imbalance(plain(&state), T0, solver, &too_much),
            Err(PoolError::ExceedsAvailable { index: 0 })
        );

        let tight = RemoveImbalanceRequest::new(vec![wad() / 2, U256::zero()], wad() / 2, T0);
        assert!(matches!(
            state.execute_remove_liquidity_imbalance(plain(&state), T0, solver, &tight),
            Err(PoolError::SlippageExceeded { .. })
        ));

        let ok = RemoveImbalanceRequest::new(vec![wad() / 2, U256::zero()], wad(), T0);
        let quote = state
            .execute_remove_liquidity_imbalance(plain(&state), T0, solver, &ok)
            .unwrap();
        assert!(quote.burn > wad() / 2);
        assert_eq!(state.total_supply, wad() * 2 - quote.burn);
        assert_eq!(state.assets[0].balance, wad() / 2);
    }

    #[test]
    fn test_remove_one_token() {
        let state = seeded();
        let view = state.view(plain(&state), T0, InvariantSolver::default());
        let quote = LiquidityEngine::quote_remove_one(&view, wad(), 0).unwrap();
        assert_eq!(quote.dy, U256::from(954_404_308_901_884_931u128));
        assert!(quote.swap_fee > U256::zero());
        assert_eq!(quote.admin_fee, U256::zero());

        assert_eq!(
            LiquidityEngine::quote_remove_one(&view, wad(), 2),
            Err(PoolError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(matches!(
            LiquidityEngine::quote_remove_one(&view, wad() * 3, 0),
            Err(PoolError::ExceedsTotalSupply { .. })
        ));
    }

    #[test]
    fn test_remove_one_token_commit() {
        let mut state = seeded();
        state.fees.set_admin_fee(5_000_000_000).unwrap();
        let request = RemoveOneTokenRequest::new(wad() / 2, 1, U256::zero(), T0);
        let quote = state
            .execute_remove_liquidity_one_token(plain(&state), T0, InvariantSolver::default(), &request)
            .unwrap();

        assert!(quote.admin_fee > U256::zero());
        assert_eq!(state.assets[1].balance, wad() - quote.dy - quote.admin_fee);
        assert_eq!(state.admin_fee_balances[1], quote.admin_fee);
        assert_eq!(state.total_supply, wad() * 3 / 2);
    }
}
