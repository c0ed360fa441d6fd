//! Error types for fixed-point arithmetic
//!
//! Every arithmetic step in the pool math is checked; these errors carry the
//! operation that failed so a numerical failure can be traced back to the
//! formula that produced it.

use thiserror::Error;

/// Errors that can occur during 256-bit fixed-point arithmetic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    /// Result exceeds the 256-bit range
    #[error("Overflow in {op}")]
    Overflow { op: &'static str },

    /// Subtraction would go below zero
    #[error("Underflow in {op}")]
    Underflow { op: &'static str },

    /// Division by zero in fixed-point arithmetic
    #[error("Division by zero in {op}")]
    DivisionByZero { op: &'static str },

    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected unsigned integer")]
    InvalidDecimal { input: String },
}
