//! Two-asset exchange math
//!
//! The trade fee is taken in normalized units; the output and the admin
//! share are each lowered to the output token's native decimals afterwards.

use crate::error::{PoolError, Result};
use crate::invariant::InvariantSolver;
use crate::normalizer::Normalizer;
use crate::pool::{PoolState, PoolView};
use crate::requests::SwapRequest;
use driftswap_types::{CheckedMath, U256};
use tracing::{debug, info};

/// Fully computed swap, ready to commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuote {
    pub from: usize,
    pub to: usize,
    pub dx: U256,
    /// Output in native decimals of `to`, after the trade fee
    pub dy: U256,
    /// Admin share of the trade fee in native decimals of `to`
    pub admin_fee: U256,
}

/// Swap output in normalized units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedSwap {
    /// Output after the trade fee
    pub dy: U256,
    pub fee: U256,
}

pub struct SwapEngine;

impl SwapEngine {
    /// Output of `to` when `from`'s normalized balance becomes `x`
    ///
    /// # Arguments
    /// * `view` - pinned pool view
    /// * `xp` - normalized balances from the same view
    /// * `x` - new normalized balance of `from`
    pub fn swap_normalized(
        view: &PoolView<'_>,
        xp: &[U256],
        from: usize,
        to: usize,
        x: U256,
    ) -> Result<NormalizedSwap> {
        let y = view.solver.solve_y(view.a_precise, from, to, x, xp)?;
        let dy = xp[to].safe_sub(y)?.safe_sub(U256::one())?;
        let fee = view.state.fees.trade_fee(dy)?;
        Ok(NormalizedSwap {
            dy: dy.safe_sub(fee)?,
            fee,
        })
    }

    /// Quote swapping `dx` of token `from` for token `to`
    pub fn quote(view: &PoolView<'_>, from: usize, to: usize, dx: U256) -> Result<SwapQuote> {
        let n = view.num_tokens();
        PoolError::check_index(from, n)?;
        PoolError::check_index(to, n)?;
        if from == to {
            return Err(PoolError::SameToken { index: from });
        }

        let xp = view.xp()?;
        let x = xp[from].safe_add(view.normalizer.normalize(from, dx)?)?;
        let out = Self::swap_normalized(view, &xp, from, to, x)?;
        Self::finalize(view, from, to, dx, out)
    }

    /// Lower a normalized swap result to native units of `to`
    pub fn finalize(
        view: &PoolView<'_>,
        from: usize,
        to: usize,
        dx: U256,
        out: NormalizedSwap,
    ) -> Result<SwapQuote> {
        let dy = view.normalizer.denormalize(to, out.dy)?;
        let admin_fee = view
            .normalizer
            .denormalize(to, view.state.fees.admin_share(out.fee)?)?;

        debug!(from, to, %dx, %dy, %admin_fee, "Swap quoted");
        Ok(SwapQuote {
            from,
            to,
            dx,
            dy,
            admin_fee,
        })
    }

    /// Commit a quote: all new values are computed before any is written
    pub fn apply(state: &mut PoolState, quote: &SwapQuote) -> Result<()> {
        let from_balance = state.token_balance(quote.from)?.safe_add(quote.dx)?;
        let to_balance = state
            .token_balance(quote.to)?
            .safe_sub(quote.dy.safe_add(quote.admin_fee)?)?;
        let admin_balance = state.admin_balance(quote.to)?.safe_add(quote.admin_fee)?;

        state.assets[quote.from].balance = from_balance;
        state.assets[quote.to].balance = to_balance;
        state.admin_fee_balances[quote.to] = admin_balance;
        Ok(())
    }
}

impl PoolState {
    /// Check, quote and commit a swap against this state
    pub fn execute_swap(
        &mut self,
        normalizer: Normalizer,
        now: u64,
        solver: InvariantSolver,
        request: &SwapRequest,
    ) -> Result<SwapQuote> {
        PoolError::check_deadline(request.deadline, now)?;
        request.check_caller_balance()?;

        let quote = SwapEngine::quote(
            &self.view(normalizer, now, solver),
            request.from,
            request.to,
            request.dx,
        )?;
        if quote.dy < request.min_dy {
            return Err(PoolError::SlippageExceeded {
                actual: quote.dy,
                limit: request.min_dy,
            });
        }

        SwapEngine::apply(self, &quote)?;
        info!(
            from = quote.from,
            to = quote.to,
            dx = %quote.dx,
            dy = %quote.dy,
            admin_fee = %quote.admin_fee,
            "Swap executed"
        );
        Ok(quote)
    }
}
