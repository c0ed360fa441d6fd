//! Precision normalization with drift and base-share scaling
//!
//! A [`Normalizer`] is built once per operation from the pool's token
//! precisions plus whatever external scalars that operation captured: the
//! drift rate for the drift-adjusted asset, and the base pool's virtual
//! price for the base-share asset of a meta pool. Stored balances are never
//! rewritten; the solver only ever sees the scaled copy.
//!
//! Lifting: `raw * multiplier`, then `* rate / RAY` (drift asset) or
//! `* virtual_price / WAD` (base share). Lowering undoes the scale first and
//! divides by the multiplier last.

use crate::error::{PoolError, Result};
use crate::pool::PooledAsset;
use driftswap_types::{mul_div, TokenPrecision, RAY, U256, WAD};

/// Ratio applied to one asset on top of its precision multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scale {
    index: usize,
    numerator: U256,
    denominator: U256,
}

impl Scale {
    fn apply(&self, value: U256) -> Result<U256> {
        Ok(mul_div(value, self.numerator, self.denominator)?)
    }

    fn invert(&self, value: U256) -> Result<U256> {
        Ok(mul_div(value, self.denominator, self.numerator)?)
    }
}

/// Per-operation snapshot converting raw balances to pool units and back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    precisions: Vec<TokenPrecision>,
    drift: Option<Scale>,
    base_share: Option<Scale>,
}

impl Normalizer {
    /// Plain normalizer from token precisions
    pub fn new(precisions: Vec<TokenPrecision>) -> Self {
        Self {
            precisions,
            drift: None,
            base_share: None,
        }
    }

    pub fn for_assets(assets: &[PooledAsset]) -> Self {
        Self::new(assets.iter().map(|a| a.precision).collect())
    }

    /// Scale asset `index` by `rate / RAY`
    ///
    /// Fails with [`PoolError::InvalidRate`] for a zero rate.
    pub fn with_drift(mut self, index: usize, rate: U256) -> Result<Self> {
        PoolError::check_index(index, self.precisions.len())?;
        if rate.is_zero() {
            return Err(PoolError::InvalidRate);
        }
        self.drift = Some(Scale {
            index,
            numerator: rate,
            denominator: RAY,
        });
        Ok(self)
    }

    /// Scale asset `index` by `virtual_price / WAD`
    pub fn with_base_share(mut self, index: usize, virtual_price: U256) -> Result<Self> {
        PoolError::check_index(index, self.precisions.len())?;
        if virtual_price.is_zero() {
            return Err(PoolError::InvalidRate);
        }
        self.base_share = Some(Scale {
            index,
            numerator: virtual_price,
            denominator: WAD,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.precisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precisions.is_empty()
    }

    pub fn precision(&self, index: usize) -> Result<TokenPrecision> {
        self.precisions
            .get(index)
            .copied()
            .ok_or(PoolError::IndexOutOfRange {
                index,
                len: self.precisions.len(),
            })
    }

    fn scales(&self) -> impl Iterator<Item = &Scale> {
        self.drift.iter().chain(self.base_share.iter())
    }

    /// Apply drift or base-share scaling to an amount already in pool units
    pub fn scale(&self, index: usize, value: U256) -> Result<U256> {
        let mut scaled = value;
        for s in self.scales().filter(|s| s.index == index) {
            scaled = s.apply(scaled)?;
        }
        Ok(scaled)
    }

    /// Undo [`Normalizer::scale`], leaving the amount in pool units
    pub fn descale(&self, index: usize, value: U256) -> Result<U256> {
        let mut unscaled = value;
        for s in self.scales().filter(|s| s.index == index) {
            unscaled = s.invert(unscaled)?;
        }
        Ok(unscaled)
    }

    /// Lift a raw amount of asset `index` into scaled pool units
    pub fn normalize(&self, index: usize, raw: U256) -> Result<U256> {
        let lifted = self.precision(index)?.to_pool_units(raw)?;
        self.scale(index, lifted)
    }

    /// Lift a full balance vector
    pub fn normalize_all(&self, raw: &[U256]) -> Result<Vec<U256>> {
        PoolError::check_arity(self.len(), raw.len())?;
        raw.iter()
            .enumerate()
            .map(|(i, amount)| self.normalize(i, *amount))
            .collect()
    }

    /// Lower a scaled pool-unit amount back to asset `index`'s native decimals
    pub fn denormalize(&self, index: usize, normalized: U256) -> Result<U256> {
        let precision = self.precision(index)?;
        Ok(precision.from_pool_units(self.descale(index, normalized)?))
    }
}
