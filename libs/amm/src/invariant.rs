//! Stableswap invariant solver
//!
//! Newton iteration for the invariant `D` of a set of normalized balances
//! and for the single balance `y` that restores a given `D`. Both solvers are
//! pure and bounded: they return a [`Convergence`] tagged result after at most
//! `max_iterations` steps and never loop unbounded.
//!
//! `a` is always the A-precision value (`A * A_PRECISION`) and `nA = a * n`.
//!
//! Forward:
//! ```text
//! D_P = D^(n+1) / (n^n * prod(x_i))                  (accumulated per balance)
//! D   = (nA*S/AP + D_P*n) * D / ((nA - AP)*D/AP + (n + 1)*D_P)
//! ```
//! Inverse:
//! ```text
//! c = D^(n+1) * AP / (n^n * prod(x_i, i != j) * nA * n)
//! b = S' + D*AP/nA
//! y = (y^2 + c) / (2y + b - D)
//! ```

use crate::error::{PoolError, Result};
use driftswap_config::amplification::A_PRECISION;
use driftswap_config::solver::MAX_LOOP_LIMIT;
use driftswap_types::{within_one, CheckedMath, U256};
use tracing::{debug, error};

/// Outcome of a bounded Newton iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    Converged { value: U256, iterations: usize },
    DidNotConverge { last: U256, iterations: usize },
}

impl Convergence {
    /// Unwrap a converged value, mapping the cap case to [`PoolError::DidNotConverge`]
    pub fn into_result(self, solver: &'static str) -> Result<U256> {
        match self {
            Convergence::Converged { value, iterations } => {
                debug!(solver, iterations, "Solver converged");
                Ok(value)
            }
            Convergence::DidNotConverge { iterations, .. } => {
                error!(solver, iterations, "Solver hit iteration cap");
                Err(PoolError::DidNotConverge { solver, iterations })
            }
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            Convergence::Converged { iterations, .. } => *iterations,
            Convergence::DidNotConverge { iterations, .. } => *iterations,
        }
    }
}

/// Invariant solver with a hard iteration cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvariantSolver {
    max_iterations: usize,
}

impl Default for InvariantSolver {
    fn default() -> Self {
        Self {
            max_iterations: MAX_LOOP_LIMIT,
        }
    }
}

impl InvariantSolver {
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Iterate for D given normalized balances `xp` and precise `a`
    ///
    /// An all-zero pool has `D = 0` with no iterations.
    pub fn try_solve_d(&self, xp: &[U256], a: u64) -> Result<Convergence> {
        let n = U256::from(xp.len());
        let ap = U256::from(A_PRECISION);
        let mut s = U256::zero();
        for x in xp {
            s = s.safe_add(*x)?;
        }
        if s.is_zero() {
            return Ok(Convergence::Converged {
                value: U256::zero(),
                iterations: 0,
            });
        }

        let na = U256::from(a).safe_mul(n)?;
        let mut d = s;
        for i in 0..self.max_iterations {
            let mut d_p = d;
            for x in xp {
                d_p = d_p.safe_mul(d)?.safe_div(x.safe_mul(n)?)?;
            }
            let prev = d;

            let numerator = na
                .safe_mul(s)?
                .safe_div(ap)?
                .safe_add(d_p.safe_mul(n)?)?
                .safe_mul(d)?;
            let denominator = na
                .safe_sub(ap)?
                .safe_mul(d)?
                .safe_div(ap)?
                .safe_add(n.safe_add(U256::one())?.safe_mul(d_p)?)?;
            d = numerator.safe_div(denominator)?;

            if within_one(d, prev) {
                return Ok(Convergence::Converged {
                    value: d,
                    iterations: i + 1,
                });
            }
        }
        Ok(Convergence::DidNotConverge {
            last: d,
            iterations: self.max_iterations,
        })
    }

    pub fn solve_d(&self, xp: &[U256], a: u64) -> Result<U256> {
        self.try_solve_d(xp, a)?.into_result("get_d")
    }

    /// Iterate for the balance of `index` that makes `xp` hit invariant `d`
    ///
    /// `xp[index]` is ignored.
    pub fn try_solve_y_d(&self, a: u64, index: usize, xp: &[U256], d: U256) -> Result<Convergence> {
        PoolError::check_index(index, xp.len())?;
        let n = U256::from(xp.len());
        let ap = U256::from(A_PRECISION);
        let na = U256::from(a).safe_mul(n)?;

        let mut c = d;
        let mut s = U256::zero();
        for (i, x) in xp.iter().enumerate() {
            if i == index {
                continue;
            }
            s = s.safe_add(*x)?;
            c = c.safe_mul(d)?.safe_div(x.safe_mul(n)?)?;
        }
        c = c.safe_mul(d)?.safe_mul(ap)?.safe_div(na.safe_mul(n)?)?;
        let b = s.safe_add(d.safe_mul(ap)?.safe_div(na)?)?;

        let mut y = d;
        for i in 0..self.max_iterations {
            let prev = y;
            let numerator = y.safe_mul(y)?.safe_add(c)?;
            let denominator = y.safe_mul(U256::from(2u8))?.safe_add(b)?.safe_sub(d)?;
            y = numerator.safe_div(denominator)?;
            if within_one(y, prev) {
                return Ok(Convergence::Converged {
                    value: y,
                    iterations: i + 1,
                });
            }
        }
        Ok(Convergence::DidNotConverge {
            last: y,
            iterations: self.max_iterations,
        })
    }

    pub fn solve_y_d(&self, a: u64, index: usize, xp: &[U256], d: U256) -> Result<U256> {
        self.try_solve_y_d(a, index, xp, d)?.into_result("get_y_d")
    }

    /// New balance of `to` after `from`'s balance becomes `x`, holding D fixed
    ///
    /// # Arguments
    /// * `a` - precise amplification
    /// * `from`, `to` - distinct token indexes
    /// * `x` - new normalized balance of `from`
    /// * `xp` - current normalized balances
    pub fn solve_y(&self, a: u64, from: usize, to: usize, x: U256, xp: &[U256]) -> Result<U256> {
        if from == to {
            return Err(PoolError::SameToken { index: from });
        }
        PoolError::check_index(from, xp.len())?;
        PoolError::check_index(to, xp.len())?;

        let d = self.solve_d(xp, a)?;
        let mut moved = xp.to_vec();
        moved[from] = x;
        self.solve_y_d(a, to, &moved, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    #[test]
    fn test_balanced_pool_d_is_sum() {
        let solver = InvariantSolver::default();
        let d = solver.solve_d(&[wad(1), wad(1)], 5000).unwrap();
        assert_eq!(d, wad(2));

        let d3 = solver.solve_d(&[wad(100), wad(100), wad(100)], 20_000).unwrap();
        assert_eq!(d3, wad(300));
    }

    #[test]
    fn test_empty_pool_d_is_zero() {
        let solver = InvariantSolver::default();
        let result = solver.try_solve_d(&[U256::zero(), U256::zero()], 5000).unwrap();
        assert_eq!(
            result,
            Convergence::Converged {
                value: U256::zero(),
                iterations: 0
            }
        );
    }

    #[test]
    fn test_imbalanced_d_below_sum() {
        let solver = InvariantSolver::default();
        let xp = [wad(3), wad(1)];
        let d = solver.solve_d(&xp, 5000).unwrap();
        assert!(d < wad(4));
        assert!(d > wad(3));
    }

    #[test]
    fn test_higher_a_raises_imbalanced_d() {
        let solver = InvariantSolver::default();
        let xp = [wad(5), wad(1)];
        let low = solver.solve_d(&xp, 1_000).unwrap();
        let high = solver.solve_d(&xp, 100_000).unwrap();
        assert!(high > low);
    }

    #[test]
    fn test_solve_y_d_recovers_balance() {
        let solver = InvariantSolver::default();
        let xp = [wad(3), wad(2), U256::from(1_500_000_000_000_000_000u64)];
        let d = solver.solve_d(&xp, 20_000).unwrap();
        for j in 0..xp.len() {
            let y = solver.solve_y_d(20_000, j, &xp, d).unwrap();
            assert!(within_one(y, xp[j]), "index {j}");
        }
    }

    #[test]
    fn test_solve_y_moves_opposite() {
        let solver = InvariantSolver::default();
        let xp = [wad(1), wad(1)];
        let y = solver.solve_y(5000, 0, 1, wad(1) + wad(1) / 10, &xp).unwrap();
        assert!(y < wad(1));
        // near balance the curve is close to constant sum
        assert!(wad(1) - y > wad(1) / 10 - wad(1) / 1000);
    }

    #[test]
    fn test_solve_y_validation() {
        let solver = InvariantSolver::default();
        let xp = [wad(1), wad(1)];
        assert_eq!(
            solver.solve_y(5000, 1, 1, wad(1), &xp),
            Err(PoolError::SameToken { index: 1 })
        );
        assert_eq!(
            solver.solve_y(5000, 0, 2, wad(1), &xp),
            Err(PoolError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_iteration_cap_is_reported() {
        let solver = InvariantSolver::with_max_iterations(1);
        let xp = [wad(1000), wad(1)];
        let result = solver.try_solve_d(&xp, 5000).unwrap();
        assert!(matches!(
            result,
            Convergence::DidNotConverge { iterations: 1, .. }
        ));
        assert_eq!(
            solver.solve_d(&xp, 5000),
            Err(PoolError::DidNotConverge {
                solver: "get_d",
                iterations: 1
            })
        );
    }

    #[test]
    fn test_zero_balance_is_math_error() {
        let solver = InvariantSolver::default();
        let result = solver.solve_d(&[wad(1), U256::zero()], 5000);
        assert!(matches!(result, Err(PoolError::Math(_))));
    }
}
