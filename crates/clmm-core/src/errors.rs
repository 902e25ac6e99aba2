//! Error definitions for the concentrated liquidity core.
//!
//! Every fallible operation in the crate surfaces one of these codes.
//! The set is deliberately small: each variant maps to a distinct class
//! of caller mistake or arithmetic limit, so a harness can assert on the
//! exact failure mode.

use thiserror::Error;

/// Core error codes for pool, position and math operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A tick index or sqrt price falls outside the supported global range.
    #[error("tick or sqrt price is out of bounds")]
    OutOfBounds,

    /// Position boundaries are inverted, equal, or not aligned to the
    /// pool's tick spacing.
    #[error("the provided tick range is invalid")]
    InvalidTickRange,

    /// Tick spacing must be non-zero when creating a pool.
    #[error("invalid tick spacing")]
    InvalidTickSpacing,

    /// A burn exceeds the position's liquidity, or an update would drive
    /// tracked liquidity below zero.
    #[error("insufficient liquidity available")]
    InsufficientLiquidity,

    /// A zero liquidity delta or zero swap input.
    #[error("amount must be non-zero")]
    InvalidAmount,

    /// The sqrt price limit is on the wrong side of the current price for
    /// the requested swap direction.
    #[error("invalid sqrt price limit")]
    InvalidPriceLimit,

    /// A fixed-point operation would overflow its intermediate width.
    #[error("operation would result in math overflow")]
    MathOverflow,
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, ErrorCode>;
