//! Share value in pool units

use crate::error::Result;
use crate::pool::PoolView;
use driftswap_types::{mul_div, U256, WAD};

pub struct VirtualPriceCalculator;

impl VirtualPriceCalculator {
    /// `D * WAD / total_supply`, or zero for an empty pool
    pub fn virtual_price(view: &PoolView<'_>) -> Result<U256> {
        let supply = view.state.total_supply;
        if supply.is_zero() {
            return Ok(U256::zero());
        }
        Ok(mul_div(view.d()?, WAD, supply)?)
    }
}
