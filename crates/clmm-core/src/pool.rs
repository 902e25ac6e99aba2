//! Pool state and the step-wise swap engine.
//!
//! A pool tracks one price (as a Q64.96 sqrt price plus its tick), the
//! liquidity active at that price, and the tick ledger. Liquidity changes
//! and swaps both follow a compute-then-commit discipline: working values
//! are validated in full before any field of the pool is written, so a
//! failing operation can never leave the ledger and the active liquidity
//! out of step.

use log::{debug, trace};
use primitive_types::U256;

use crate::constants::{MAX_SQRT_PRICE, MIN_SQRT_PRICE, MIN_TICK};
use crate::errors::{ErrorCode, Result};
use crate::math;
use crate::swap_math;
use crate::tick_ledger::TickLedger;
use crate::token::{Owner, TokenLedger};

/// Concentrated liquidity pool state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    tick_spacing: u16,
    sqrt_price_x96: U256,
    current_tick: i32,
    liquidity: u128,
    ledger: TickLedger,
}

/// Result of a completed swap.
///
/// `amount0`/`amount1` are signed from the pool's perspective (positive
/// means paid into the pool); `amount_in`/`amount_out` are the same
/// quantities as the unsigned input-consumed and output-produced pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub amount0: i128,
    pub amount1: i128,
    pub amount_in: u128,
    pub amount_out: u128,
}

impl Pool {
    /// Creates a pool at an initial price.
    ///
    /// # Arguments
    ///
    /// * `initial_sqrt_price_x96` - Starting sqrt price, inside the global
    ///   bounds.
    /// * `tick_spacing` - Distance between usable ticks, non-zero.
    pub fn new(initial_sqrt_price_x96: U256, tick_spacing: u16) -> Result<Self> {
        if initial_sqrt_price_x96 < MIN_SQRT_PRICE || initial_sqrt_price_x96 > MAX_SQRT_PRICE {
            return Err(ErrorCode::OutOfBounds);
        }
        Ok(Self {
            tick_spacing,
            sqrt_price_x96: initial_sqrt_price_x96,
            current_tick: math::sqrt_price_x96_to_tick(initial_sqrt_price_x96)?,
            liquidity: 0,
            ledger: TickLedger::new(tick_spacing)?,
        })
    }

    pub fn tick_spacing(&self) -> u16 {
        self.tick_spacing
    }

    pub fn sqrt_price_x96(&self) -> U256 {
        self.sqrt_price_x96
    }

    pub fn current_tick(&self) -> i32 {
        self.current_tick
    }

    /// Liquidity active at the current price.
    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    pub fn ledger(&self) -> &TickLedger {
        &self.ledger
    }

    /// Applies a signed liquidity delta over `[tick_lower, tick_upper)`.
    ///
    /// Updates both boundary ticks and, when the current tick lies inside
    /// the range, the pool's active liquidity. All three updates are
    /// validated before any is committed.
    ///
    /// # Arguments
    ///
    /// * `tick_lower` / `tick_upper` - Range boundaries, spacing-aligned,
    ///   `tick_lower < tick_upper`.
    /// * `liquidity_delta` - Positive for a mint, negative for a burn.
    pub fn modify_liquidity(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
    ) -> Result<()> {
        if liquidity_delta == 0 {
            return Err(ErrorCode::InvalidAmount);
        }
        if tick_lower >= tick_upper
            || !math::is_valid_tick(tick_lower, self.tick_spacing)
            || !math::is_valid_tick(tick_upper, self.tick_spacing)
        {
            return Err(ErrorCode::InvalidTickRange);
        }

        let in_range = tick_lower <= self.current_tick && self.current_tick < tick_upper;
        let new_active_liquidity = if in_range {
            math::add_liquidity_delta(self.liquidity, liquidity_delta)?
        } else {
            self.liquidity
        };

        // The ledger validates both boundary updates before writing.
        self.ledger
            .apply_range_delta(tick_lower, tick_upper, liquidity_delta)?;
        self.liquidity = new_active_liquidity;

        debug!(
            "liquidity modified: range [{}, {}) delta {} active {}",
            tick_lower, tick_upper, liquidity_delta, self.liquidity
        );
        Ok(())
    }

    /// Swaps an exact input amount against the pool.
    ///
    /// The price walks segment by segment toward `sqrt_price_limit_x96`.
    /// Within a segment the constant-liquidity step math applies; when the
    /// price reaches an initialized tick boundary, that tick's net
    /// liquidity is folded into active liquidity in the same step. The
    /// swap stops when the input is consumed or the limit is reached,
    /// whichever comes first.
    ///
    /// Limits beyond the global price bounds are clamped to the bound. A
    /// limit already at or past the current price in the swap direction is
    /// rejected with `InvalidPriceLimit`.
    ///
    /// # Arguments
    ///
    /// * `zero_for_one` - True to sell token0 (price moves down).
    /// * `amount_specified` - Exact input in the sold token, non-zero.
    /// * `sqrt_price_limit_x96` - Price past which the swap must not move.
    pub fn swap(
        &mut self,
        zero_for_one: bool,
        amount_specified: u128,
        sqrt_price_limit_x96: U256,
    ) -> Result<SwapOutcome> {
        if amount_specified == 0 {
            return Err(ErrorCode::InvalidAmount);
        }
        let limit = if zero_for_one {
            sqrt_price_limit_x96.max(MIN_SQRT_PRICE)
        } else {
            sqrt_price_limit_x96.min(MAX_SQRT_PRICE)
        };
        let limit_valid = if zero_for_one {
            limit < self.sqrt_price_x96
        } else {
            limit > self.sqrt_price_x96
        };
        if !limit_valid {
            return Err(ErrorCode::InvalidPriceLimit);
        }

        // Working copies; the pool is written only after the whole swap
        // succeeds.
        let mut sqrt_price = self.sqrt_price_x96;
        let mut tick = self.current_tick;
        let mut liquidity = self.liquidity;
        let mut amount_remaining = amount_specified;
        let mut amount_in_total: u128 = 0;
        let mut amount_out_total: u128 = 0;

        while amount_remaining > 0 && sqrt_price != limit {
            let next_tick = self.ledger.next_initialized_tick(tick, zero_for_one);
            let boundary_price = match next_tick {
                Some(t) => Some(math::tick_to_sqrt_price_x96(t)?),
                None => None,
            };
            let target = match boundary_price {
                Some(boundary) => {
                    if zero_for_one {
                        boundary.max(limit)
                    } else {
                        boundary.min(limit)
                    }
                }
                None => limit,
            };

            let step = swap_math::compute_swap_step(
                sqrt_price,
                target,
                liquidity,
                amount_remaining,
                zero_for_one,
            )?;
            trace!(
                "swap step: price {} -> {} in {} out {}",
                sqrt_price,
                step.next_sqrt_price_x96,
                step.amount_in,
                step.amount_out
            );

            amount_in_total = amount_in_total
                .checked_add(step.amount_in)
                .ok_or(ErrorCode::MathOverflow)?;
            amount_out_total = amount_out_total
                .checked_add(step.amount_out)
                .ok_or(ErrorCode::MathOverflow)?;
            amount_remaining -= step.amount_in;
            sqrt_price = step.next_sqrt_price_x96;

            if let (Some(next), Some(boundary)) = (next_tick, boundary_price) {
                let reached = if zero_for_one {
                    sqrt_price <= boundary
                } else {
                    sqrt_price >= boundary
                };
                if reached && target == boundary {
                    if zero_for_one && next <= MIN_TICK {
                        // The absolute floor; nothing lies below this
                        // boundary, so the tick stays on it uncrossed.
                        tick = next;
                        continue;
                    }
                    // Crossing and the net-liquidity update are one
                    // atomic transition.
                    let net = self.ledger.liquidity_net(next);
                    let applied = if zero_for_one {
                        net.checked_neg().ok_or(ErrorCode::MathOverflow)?
                    } else {
                        net
                    };
                    liquidity = math::add_liquidity_delta(liquidity, applied)?;
                    tick = if zero_for_one { next - 1 } else { next };
                    debug!(
                        "crossed tick {} ({}): net {} active {}",
                        next,
                        if zero_for_one { "down" } else { "up" },
                        net,
                        liquidity
                    );
                    continue;
                }
            }
            // No boundary reached this step: resynchronize the tick from
            // the price.
            tick = math::sqrt_price_x96_to_tick(sqrt_price)?;
        }

        self.sqrt_price_x96 = sqrt_price;
        self.current_tick = tick;
        self.liquidity = liquidity;

        let amount_in_signed = i128::try_from(amount_in_total).map_err(|_| ErrorCode::MathOverflow)?;
        let amount_out_signed =
            i128::try_from(amount_out_total).map_err(|_| ErrorCode::MathOverflow)?;
        let (amount0, amount1) = if zero_for_one {
            (amount_in_signed, -amount_out_signed)
        } else {
            (-amount_out_signed, amount_in_signed)
        };

        Ok(SwapOutcome {
            amount0,
            amount1,
            amount_in: amount_in_total,
            amount_out: amount_out_total,
        })
    }
}

/// Runs a swap and settles the resulting amounts through the token
/// ledgers: the sold token moves from `owner` into the pool, the bought
/// token moves out to `owner`.
///
/// The swap runs on a working copy of the pool; settlement is checked
/// against the owner's balance and the pool's reserve and executed
/// first, and the price move commits only once both transfers have
/// gone through. An owner who cannot fund the input, or a reserve that
/// cannot pay the output, fails with `InsufficientLiquidity` and leaves
/// the pool untouched.
pub fn execute_swap<'a>(
    pool: &mut Pool,
    token0: &'a mut dyn TokenLedger,
    token1: &'a mut dyn TokenLedger,
    owner: Owner,
    zero_for_one: bool,
    amount_specified: u128,
    sqrt_price_limit_x96: U256,
) -> Result<SwapOutcome> {
    let mut updated = pool.clone();
    let outcome = updated.swap(zero_for_one, amount_specified, sqrt_price_limit_x96)?;

    let (token_in, token_out) = if zero_for_one {
        (token0, token1)
    } else {
        (token1, token0)
    };
    if token_in.balance_of(owner) < outcome.amount_in || token_out.reserve() < outcome.amount_out {
        return Err(ErrorCode::InsufficientLiquidity);
    }
    token_in.transfer_in(owner, outcome.amount_in)?;
    token_out.transfer_out(owner, outcome.amount_out)?;

    *pool = updated;
    Ok(outcome)
}
