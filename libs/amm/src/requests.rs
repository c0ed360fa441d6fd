//! Execute-call parameters
//!
//! Each request carries its own deadline and slippage bound. The optional
//! caller holdings are supplied by the custody layer; when present the
//! engine refuses to spend or burn more than the caller has.

use crate::error::{PoolError, Result};
use driftswap_types::U256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub from: usize,
    pub to: usize,
    pub dx: U256,
    pub min_dy: U256,
    pub deadline: u64,
    pub caller_balance: Option<U256>,
}

impl SwapRequest {
    pub fn new(from: usize, to: usize, dx: U256, min_dy: U256, deadline: u64) -> Self {
        Self {
            from,
            to,
            dx,
            min_dy,
            deadline,
            caller_balance: None,
        }
    }

    pub fn with_caller_balance(mut self, balance: U256) -> Self {
        self.caller_balance = Some(balance);
        self
    }

    pub(crate) fn check_caller_balance(&self) -> Result<()> {
        check_spend(self.dx, self.caller_balance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityRequest {
    pub amounts: Vec<U256>,
    pub min_to_mint: U256,
    pub deadline: u64,
    pub caller_balances: Option<Vec<U256>>,
}

impl AddLiquidityRequest {
    pub fn new(amounts: Vec<U256>, min_to_mint: U256, deadline: u64) -> Self {
        Self {
            amounts,
            min_to_mint,
            deadline,
            caller_balances: None,
        }
    }

    pub fn with_caller_balances(mut self, balances: Vec<U256>) -> Self {
        self.caller_balances = Some(balances);
        self
    }

    pub(crate) fn check_caller_balances(&self) -> Result<()> {
        if let Some(balances) = &self.caller_balances {
            PoolError::check_arity(self.amounts.len(), balances.len())?;
            for (amount, balance) in self.amounts.iter().zip(balances) {
                check_spend(*amount, Some(*balance))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityRequest {
    pub amount: U256,
    pub min_amounts: Vec<U256>,
    pub deadline: u64,
    pub caller_shares: Option<U256>,
}

impl RemoveLiquidityRequest {
    pub fn new(amount: U256, min_amounts: Vec<U256>, deadline: u64) -> Self {
        Self {
            amount,
            min_amounts,
            deadline,
            caller_shares: None,
        }
    }

    pub fn with_caller_shares(mut self, shares: U256) -> Self {
        self.caller_shares = Some(shares);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveImbalanceRequest {
    pub amounts: Vec<U256>,
    pub max_burn: U256,
    pub deadline: u64,
    pub caller_shares: Option<U256>,
}

impl RemoveImbalanceRequest {
    pub fn new(amounts: Vec<U256>, max_burn: U256, deadline: u64) -> Self {
        Self {
            amounts,
            max_burn,
            deadline,
            caller_shares: None,
        }
    }

    pub fn with_caller_shares(mut self, shares: U256) -> Self {
        self.caller_shares = Some(shares);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOneTokenRequest {
    pub amount: U256,
    pub token_index: usize,
    pub min_amount: U256,
    pub deadline: u64,
    pub caller_shares: Option<U256>,
}

impl RemoveOneTokenRequest {
    pub fn new(amount: U256, token_index: usize, min_amount: U256, deadline: u64) -> Self {
        Self {
            amount,
            token_index,
            min_amount,
            deadline,
            caller_shares: None,
        }
    }

    pub fn with_caller_shares(mut self, shares: U256) -> Self {
        self.caller_shares = Some(shares);
        self
    }
}

fn check_spend(required: U256, available: Option<U256>) -> Result<()> {
    match available {
        Some(available) if required > available => Err(PoolError::InsufficientBalance {
            required,
            available,
        }),
        _ => Ok(()),
    }
}

/// Fail with [`PoolError::InsufficientShares`] when burning more than owned
pub(crate) fn check_burn(requested: U256, owned: Option<U256>) -> Result<()> {
    match owned {
        Some(owned) if requested > owned => Err(PoolError::InsufficientShares { requested, owned }),
        _ => Ok(()),
    }
}
