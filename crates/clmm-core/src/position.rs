//! Position bookkeeping over tick ranges.
//!
//! A position is an owner's liquidity over a half-open tick range
//! `[tick_lower, tick_upper)`. Minting and burning route the liquidity
//! delta through the pool (which updates both boundary ticks and, when
//! the range brackets the current price, active liquidity) and settle the
//! corresponding token amounts through the token ledgers.

use primitive_types::U256;

use crate::errors::{ErrorCode, Result};
use crate::math;
use crate::pool::Pool;
use crate::token::{Owner, TokenLedger};
use std::collections::HashMap;

/// Identity of a position: owner plus range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub owner: Owner,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// Per-position state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PositionData {
    pub liquidity: u128,
}

/// Book of all open positions.
#[derive(Debug, Default, Clone)]
pub struct PositionManager {
    positions: HashMap<PositionKey, PositionData>,
}

impl PositionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Liquidity currently held by a position, zero when none exists.
    pub fn liquidity_of(&self, key: &PositionKey) -> u128 {
        self.positions.get(key).map_or(0, |p| p.liquidity)
    }

    /// Open positions in arbitrary order.
    pub fn positions(&self) -> impl Iterator<Item = (&PositionKey, &PositionData)> {
        self.positions.iter()
    }

    /// Adds liquidity to a position, creating it if needed.
    ///
    /// Token amounts are computed for the range at the pool's current
    /// price, rounded up, pulled from `owner` through the ledgers, and
    /// returned as `(amount0, amount1)`.
    pub fn mint(
        &mut self,
        pool: &mut Pool,
        owner: Owner,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
        token0: &mut dyn TokenLedger,
        token1: &mut dyn TokenLedger,
    ) -> Result<(u128, u128)> {
        if liquidity == 0 {
            return Err(ErrorCode::InvalidAmount);
        }
        let delta = i128::try_from(liquidity).map_err(|_| ErrorCode::MathOverflow)?;

        let key = PositionKey {
            owner,
            tick_lower,
            tick_upper,
        };
        let new_position_liquidity = self
            .liquidity_of(&key)
            .checked_add(liquidity)
            .ok_or(ErrorCode::MathOverflow)?;

        // Everything fallible happens before any state is written: the
        // amounts, the funding check, the pool update on a working copy,
        // then settlement. The pool and position book commit last.
        let (amount0, amount1) =
            token_amounts_for_range(pool, tick_lower, tick_upper, liquidity, true)?;
        if token0.balance_of(owner) < amount0 || token1.balance_of(owner) < amount1 {
            return Err(ErrorCode::InsufficientLiquidity);
        }

        // Validates the range and updates ticks plus active liquidity.
        let mut updated = pool.clone();
        updated.modify_liquidity(tick_lower, tick_upper, delta)?;
        token0.transfer_in(owner, amount0)?;
        token1.transfer_in(owner, amount1)?;

        *pool = updated;
        self.positions.insert(
            key,
            PositionData {
                liquidity: new_position_liquidity,
            },
        );
        Ok((amount0, amount1))
    }

    /// Removes liquidity from a position.
    ///
    /// Token amounts are computed for the range at the pool's current
    /// price, rounded down, paid out to `owner` through the ledgers, and
    /// returned as `(amount0, amount1)`. A burn for more than the
    /// position holds, or for more than the reserves can pay out, fails
    /// with `InsufficientLiquidity` and changes nothing.
    pub fn burn(
        &mut self,
        pool: &mut Pool,
        owner: Owner,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
        token0: &mut dyn TokenLedger,
        token1: &mut dyn TokenLedger,
    ) -> Result<(u128, u128)> {
        if liquidity == 0 {
            return Err(ErrorCode::InvalidAmount);
        }
        let delta = i128::try_from(liquidity).map_err(|_| ErrorCode::MathOverflow)?;

        let key = PositionKey {
            owner,
            tick_lower,
            tick_upper,
        };
        let remaining = self
            .liquidity_of(&key)
            .checked_sub(liquidity)
            .ok_or(ErrorCode::InsufficientLiquidity)?;
        // The payout must be covered before anything is written.
        let (amount0, amount1) =
            token_amounts_for_range(pool, tick_lower, tick_upper, liquidity, false)?;
        if token0.reserve() < amount0 || token1.reserve() < amount1 {
            return Err(ErrorCode::InsufficientLiquidity);
        }

        let mut updated = pool.clone();
        updated.modify_liquidity(tick_lower, tick_upper, -delta)?;
        token0.transfer_out(owner, amount0)?;
        token1.transfer_out(owner, amount1)?;

        *pool = updated;
        if remaining == 0 {
            self.positions.remove(&key);
        } else {
            self.positions.insert(
                key,
                PositionData {
                    liquidity: remaining,
                },
            );
        }
        Ok((amount0, amount1))
    }
}

/// Token amounts represented by `liquidity` over `[tick_lower, tick_upper)`
/// at the pool's current price.
///
/// Below the range the liquidity is all token0, above it all token1, and
/// inside it the split follows the current price.
pub fn token_amounts_for_range(
    pool: &Pool,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    round_up: bool,
) -> Result<(u128, u128)> {
    let sqrt_price_lower = math::tick_to_sqrt_price_x96(tick_lower)?;
    let sqrt_price_upper = math::tick_to_sqrt_price_x96(tick_upper)?;
    let sqrt_price_current: U256 = pool.sqrt_price_x96();

    if sqrt_price_current <= sqrt_price_lower {
        let amount0 =
            math::get_amount0_delta(sqrt_price_lower, sqrt_price_upper, liquidity, round_up)?;
        Ok((amount0, 0))
    } else if sqrt_price_current < sqrt_price_upper {
        let amount0 =
            math::get_amount0_delta(sqrt_price_current, sqrt_price_upper, liquidity, round_up)?;
        let amount1 =
            math::get_amount1_delta(sqrt_price_lower, sqrt_price_current, liquidity, round_up)?;
        Ok((amount0, amount1))
    } else {
        let amount1 =
            math::get_amount1_delta(sqrt_price_lower, sqrt_price_upper, liquidity, round_up)?;
        Ok((0, amount1))
    }
}
