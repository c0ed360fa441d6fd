//! Swaps between underlying tokens of a meta pool
//!
//! The underlying index space lists the meta pool's own tokens except the
//! base share, then the base pool's tokens. A route touching a base token
//! converts through the base share: deposits into the base pool on the way
//! in, single-token withdrawal on the way out.

use crate::error::{PoolError, Result};
use crate::meta::{DriftingMetaPool, Snapshot};
use crate::pool_traits::{BasePool, RateSource};
use crate::requests::SwapRequest;
use crate::swap::{SwapEngine, SwapQuote};
use driftswap_types::{CheckedMath, U256};
use tracing::{info, warn};

/// Resolved pair of underlying indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderlyingRoute {
    /// Both tokens held by the meta pool directly
    Meta { from: usize, to: usize },
    /// Base token in, meta token out
    BaseToMeta { base_from: usize, to: usize },
    /// Meta token in, base token out
    MetaToBase { from: usize, base_to: usize },
    /// Both tokens live in the base pool
    Base { base_from: usize, base_to: usize },
}

impl UnderlyingRoute {
    /// Map underlying indices onto a pool of `meta_tokens` whose last token
    /// is the share of a base pool with `base_tokens`
    pub fn resolve(meta_tokens: usize, base_tokens: usize, from: usize, to: usize) -> Result<Self> {
        if meta_tokens < 2 {
            return Err(PoolError::TooFewTokens { count: meta_tokens });
        }
        let base_index = meta_tokens - 1;
        let len = base_index + base_tokens;
        PoolError::check_index(from, len)?;
        PoolError::check_index(to, len)?;
        if from == to {
            return Err(PoolError::SameToken { index: from });
        }

        Ok(match (from < base_index, to < base_index) {
            (true, true) => Self::Meta { from, to },
            (false, true) => Self::BaseToMeta {
                base_from: from - base_index,
                to,
            },
            (true, false) => Self::MetaToBase {
                from,
                base_to: to - base_index,
            },
            (false, false) => Self::Base {
                base_from: from - base_index,
                base_to: to - base_index,
            },
        })
    }
}

impl<R: RateSource, B: BasePool> DriftingMetaPool<R, B> {
    pub fn num_underlying_tokens(&self) -> usize {
        self.base_index() + self.base_pool().num_tokens()
    }

    pub fn route(&self, from: usize, to: usize) -> Result<UnderlyingRoute> {
        UnderlyingRoute::resolve(
            self.state().num_tokens(),
            self.base_pool().num_tokens(),
            from,
            to,
        )
    }

    /// Quote an underlying swap without touching either pool
    pub fn calculate_swap_underlying(&self, from: usize, to: usize, dx: U256, now: u64) -> Result<U256> {
        let route = self.route(from, to)?;
        let snapshot = self.snapshot(now)?;
        let view = self.view(&snapshot, now);
        let base_index = self.base_index();

        match route {
            UnderlyingRoute::Meta { from, to } => Ok(SwapEngine::quote(&view, from, to, dx)?.dy),
            UnderlyingRoute::BaseToMeta { base_from, to } => {
                let mut amounts = vec![U256::zero(); self.base_pool.num_tokens()];
                amounts[base_from] = dx;
                let shares = self.base_pool.calculate_token_amount(&amounts, true, now)?;

                let xp = view.xp()?;
                let x = xp[base_index].safe_add(view.normalizer.normalize(base_index, shares)?)?;
                let out = SwapEngine::swap_normalized(&view, &xp, base_index, to, x)?;
                view.normalizer.denormalize(to, out.dy)
            }
            UnderlyingRoute::MetaToBase { from, base_to } => {
                let shares = SwapEngine::quote(&view, from, base_index, dx)?.dy;
                self.base_pool
                    .calculate_remove_liquidity_one_token(shares, base_to, now)
            }
            UnderlyingRoute::Base { base_from, base_to } => {
                self.base_pool.calculate_swap(base_from, base_to, dx, now)
            }
        }
    }
}

impl<R: RateSource, B: BasePool + Clone> DriftingMetaPool<R, B> {
    /// Execute an underlying swap across both pools
    ///
    /// Base pool deposits and withdrawals run with no slippage bound of
    /// their own; `min_dy` applies to the final output. Nothing in either
    /// pool changes unless the whole route succeeds.
    pub fn swap_underlying(&mut self, request: &SwapRequest, now: u64) -> Result<U256> {
        PoolError::check_deadline(request.deadline, now)?;
        request.check_caller_balance()?;

        let route = self.route(request.from, request.to)?;
        let snapshot = self.snapshot(now)?;
        let backup = self.base_pool.clone();

        match self.route_through_base(route, request, &snapshot, now) {
            Ok((quote, dy)) => {
                self.commit_snapshot(&snapshot, now);
                info!(
                    from = request.from,
                    to = request.to,
                    dx = %request.dx,
                    dy = %dy,
                    admin_fee = %quote.map(|q| q.admin_fee).unwrap_or_default(),
                    "Underlying swap executed"
                );
                Ok(dy)
            }
            Err(e) => {
                warn!(error = %e, from = request.from, to = request.to, "Underlying swap reverted");
                self.base_pool = backup;
                Err(e)
            }
        }
    }

    /// Run both legs of `route`, committing the meta leg last
    fn route_through_base(
        &mut self,
        route: UnderlyingRoute,
        request: &SwapRequest,
        snapshot: &Snapshot,
        now: u64,
    ) -> Result<(Option<SwapQuote>, U256)> {
        let base_index = self.base_index();
        let (quote, dy) = match route {
            UnderlyingRoute::Meta { from, to } => {
                let quote = SwapEngine::quote(&self.view(snapshot, now), from, to, request.dx)?;
                (Some(quote.clone()), quote.dy)
            }
            UnderlyingRoute::BaseToMeta { base_from, to } => {
                let mut amounts = vec![U256::zero(); self.base_pool.num_tokens()];
                amounts[base_from] = request.dx;
                let shares =
                    self.base_pool
                        .add_liquidity(&amounts, U256::zero(), request.deadline, now)?;
                let quote = SwapEngine::quote(&self.view(snapshot, now), base_index, to, shares)?;
                (Some(quote.clone()), quote.dy)
            }
            UnderlyingRoute::MetaToBase { from, base_to } => {
                let quote =
                    SwapEngine::quote(&self.view(snapshot, now), from, base_index, request.dx)?;
                let dy = self.base_pool.remove_liquidity_one_token(
                    quote.dy,
                    base_to,
                    U256::zero(),
                    request.deadline,
                    now,
                )?;
                (Some(quote), dy)
            }
            UnderlyingRoute::Base { base_from, base_to } => {
                let dy = self.base_pool.swap(
                    base_from,
                    base_to,
                    request.dx,
                    request.min_dy,
                    request.deadline,
                    now,
                )?;
                (None, dy)
            }
        };

        if dy < request.min_dy {
            return Err(PoolError::SlippageExceeded {
                actual: dy,
                limit: request.min_dy,
            });
        }
        if let Some(quote) = &quote {
            SwapEngine::apply(&mut self.state, quote)?;
        }
        Ok((quote, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_resolution() {
        // meta [RAI, baseLP] over base [DAI, USDC, USDT]
        assert_eq!(
            UnderlyingRoute::resolve(2, 3, 0, 1).unwrap(),
            UnderlyingRoute::MetaToBase { from: 0, base_to: 0 }
        );
        assert_eq!(
            UnderlyingRoute::resolve(2, 3, 2, 0).unwrap(),
            UnderlyingRoute::BaseToMeta { base_from: 1, to: 0 }
        );
        assert_eq!(
            UnderlyingRoute::resolve(2, 3, 1, 3).unwrap(),
            UnderlyingRoute::Base {
                base_from: 0,
                base_to: 2
            }
        );
        assert_eq!(
            UnderlyingRoute::resolve(3, 3, 0, 1).unwrap(),
            UnderlyingRoute::Meta { from: 0, to: 1 }
        );
    }

    #[test]
    fn test_route_validation() {
        assert_eq!(
            UnderlyingRoute::resolve(2, 3, 0, 4),
            Err(PoolError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(
            UnderlyingRoute::resolve(2, 3, 2, 2),
            Err(PoolError::SameToken { index: 2 })
        );
        assert_eq!(
            UnderlyingRoute::resolve(0, 3, 0, 1),
            Err(PoolError::TooFewTokens { count: 0 })
        );
        assert_eq!(
            UnderlyingRoute::resolve(1, 3, 0, 1),
            Err(PoolError::TooFewTokens { count: 1 })
        );
    }
}
