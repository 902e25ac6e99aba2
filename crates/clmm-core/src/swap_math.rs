//! Single-step swap computation.
//!
//! A swap is executed as a sequence of steps, each confined to one
//! constant-liquidity price segment. This module computes one such step:
//! given the current price, a target price (the nearer of the next
//! initialized tick boundary and the caller's limit) and the remaining
//! input, it determines how far the price moves and the amounts exchanged.

use primitive_types::U256;

use crate::errors::Result;
use crate::math;

/// Outcome of a single swap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    /// The sqrt price after the step.
    pub next_sqrt_price_x96: U256,
    /// Input consumed by this step, in the sold token.
    pub amount_in: u128,
    /// Output produced by this step, in the bought token.
    pub amount_out: u128,
}

/// Computes one constant-liquidity swap step with exact input.
///
/// Input amounts round up and output amounts round down. When the
/// remaining input is enough to reach `sqrt_price_target_x96`, the step
/// stops exactly there; otherwise the final price follows from the input
/// formula, clamped so it can never pass the target. A step through a
/// zero-liquidity segment moves the price to the target and exchanges
/// nothing.
///
/// # Arguments
///
/// * `sqrt_price_current_x96` - Price at the start of the step.
/// * `sqrt_price_target_x96` - Boundary the step must not pass. Below the
///   current price when `zero_for_one`, above otherwise.
/// * `liquidity` - Active liquidity in this segment.
/// * `amount_remaining` - Unconsumed exact input.
/// * `zero_for_one` - True when selling token0 (price moves down).
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    amount_remaining: u128,
    zero_for_one: bool,
) -> Result<SwapStep> {
    if liquidity == 0 {
        return Ok(SwapStep {
            next_sqrt_price_x96: sqrt_price_target_x96,
            amount_in: 0,
            amount_out: 0,
        });
    }

    let amount_in_to_target = if zero_for_one {
        math::get_amount0_delta(
            sqrt_price_target_x96,
            sqrt_price_current_x96,
            liquidity,
            true,
        )?
    } else {
        math::get_amount1_delta(
            sqrt_price_current_x96,
            sqrt_price_target_x96,
            liquidity,
            true,
        )?
    };

    let (next_sqrt_price_x96, amount_in) = if amount_remaining >= amount_in_to_target {
        (sqrt_price_target_x96, amount_in_to_target)
    } else {
        let computed = if zero_for_one {
            math::get_next_sqrt_price_from_amount0_in(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining,
            )?
        } else {
            math::get_next_sqrt_price_from_amount1_in(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining,
            )?
        };
        // Structural clamp: a partial step must never pass the target.
        let clamped = if zero_for_one {
            computed.max(sqrt_price_target_x96)
        } else {
            computed.min(sqrt_price_target_x96)
        };
        (clamped, amount_remaining)
    };

    let amount_out = if zero_for_one {
        math::get_amount1_delta(next_sqrt_price_x96, sqrt_price_current_x96, liquidity, false)?
    } else {
        math::get_amount0_delta(sqrt_price_current_x96, next_sqrt_price_x96, liquidity, false)?
    };

    Ok(SwapStep {
        next_sqrt_price_x96,
        amount_in,
        amount_out,
    })
}
