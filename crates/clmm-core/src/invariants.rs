//! Read-only invariant checks over pool state.
//!
//! Each check inspects state through the `ConcentratedLiquiditySource`
//! capability and reports a typed violation, so an external harness can
//! run them between arbitrary operation sequences and assert on the exact
//! property that broke. Nothing in this module mutates anything.

use primitive_types::U256;
use thiserror::Error;

use crate::constants::{MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK};
use crate::math;
use crate::pool::Pool;

/// Read access to the state the invariant checks need.
///
/// `Pool` implements this; so can any external model a harness wants to
/// cross-check against the same properties.
pub trait ConcentratedLiquiditySource {
    fn current_tick(&self) -> i32;
    fn current_liquidity(&self) -> u128;
    fn sqrt_price_x96(&self) -> U256;
    fn tick_spacing(&self) -> u16;
    fn liquidity_net_at(&self, tick: i32) -> i128;
    fn liquidity_gross_at(&self, tick: i32) -> u128;
    /// Initialized ticks in ascending order.
    fn initialized_ticks(&self) -> Vec<i32>;
}

impl ConcentratedLiquiditySource for Pool {
    fn current_tick(&self) -> i32 {
        self.current_tick()
    }

    fn current_liquidity(&self) -> u128 {
        self.liquidity()
    }

    fn sqrt_price_x96(&self) -> U256 {
        self.sqrt_price_x96()
    }

    fn tick_spacing(&self) -> u16 {
        self.tick_spacing()
    }

    fn liquidity_net_at(&self, tick: i32) -> i128 {
        self.ledger().liquidity_net(tick)
    }

    fn liquidity_gross_at(&self, tick: i32) -> u128 {
        self.ledger().get(tick).liquidity_gross
    }

    fn initialized_ticks(&self) -> Vec<i32> {
        self.ledger().initialized_ticks().map(|(t, _)| t).collect()
    }
}

/// A broken pool property, with enough context to diagnose it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("net liquidity across all ticks sums to {sum}, expected 0")]
    NetLiquidityNotConserved { sum: i128 },

    #[error("active liquidity is {actual} but ticks at or below the current tick sum to {expected}")]
    ActiveLiquidityMismatch { expected: i128, actual: u128 },

    #[error("initialized tick {tick} is not aligned to spacing {spacing}")]
    TickNotOnSpacing { tick: i32, spacing: u16 },

    #[error("tick {tick} has zero gross liquidity but net {net}")]
    DanglingNetLiquidity { tick: i32, net: i128 },

    #[error("tick {tick} has |net| {net} exceeding gross {gross}")]
    NetExceedsGross { tick: i32, net: i128, gross: u128 },

    #[error("sqrt price is outside the global bounds")]
    PriceOutOfBounds,

    #[error("current tick {tick} is outside the global bounds")]
    TickOutOfBounds { tick: i32 },

    #[error("current tick {tick} is out of sync with the price (floor tick {computed})")]
    PriceTickDesync { tick: i32, computed: i32 },

    #[error("swap moved the price in the wrong direction")]
    WrongSwapDirection,

    #[error("swap moved the price past its limit")]
    SwapLimitExceeded,

    #[error("swap settled both amounts in the same direction")]
    SwapAmountsSameSign,
}

/// Snapshot pair a harness records around a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRecord {
    pub zero_for_one: bool,
    pub sqrt_price_before: U256,
    pub sqrt_price_after: U256,
    pub sqrt_price_limit: U256,
    pub amount0: i128,
    pub amount1: i128,
}

/// Net liquidity over all initialized ticks must cancel: every position
/// contributes `+L` at its lower boundary and `-L` at its upper.
pub fn check_net_liquidity_conservation(
    source: &impl ConcentratedLiquiditySource,
) -> Result<(), InvariantViolation> {
    let sum: i128 = source
        .initialized_ticks()
        .iter()
        .map(|&tick| source.liquidity_net_at(tick))
        .sum();
    if sum != 0 {
        return Err(InvariantViolation::NetLiquidityNotConserved { sum });
    }
    Ok(())
}

/// Active liquidity must equal the sum of net liquidity over every
/// initialized tick at or below the current tick.
pub fn check_active_liquidity(
    source: &impl ConcentratedLiquiditySource,
) -> Result<(), InvariantViolation> {
    let current = source.current_tick();
    let expected: i128 = source
        .initialized_ticks()
        .iter()
        .filter(|&&tick| tick <= current)
        .map(|&tick| source.liquidity_net_at(tick))
        .sum();
    let actual = source.current_liquidity();
    if expected < 0 || expected as u128 != actual {
        return Err(InvariantViolation::ActiveLiquidityMismatch { expected, actual });
    }
    Ok(())
}

/// Every initialized tick must be aligned to the pool's spacing.
pub fn check_tick_spacing(
    source: &impl ConcentratedLiquiditySource,
) -> Result<(), InvariantViolation> {
    let spacing = source.tick_spacing();
    for tick in source.initialized_ticks() {
        if spacing == 0 || tick % i32::from(spacing) != 0 {
            return Err(InvariantViolation::TickNotOnSpacing { tick, spacing });
        }
    }
    Ok(())
}

/// Per-tick sanity: gross bounds net, and a record with zero gross must
/// not carry net liquidity.
pub fn check_gross_net_consistency(
    source: &impl ConcentratedLiquiditySource,
) -> Result<(), InvariantViolation> {
    for tick in source.initialized_ticks() {
        let gross = source.liquidity_gross_at(tick);
        let net = source.liquidity_net_at(tick);
        if gross == 0 && net != 0 {
            return Err(InvariantViolation::DanglingNetLiquidity { tick, net });
        }
        if net.unsigned_abs() > gross {
            return Err(InvariantViolation::NetExceedsGross { tick, net, gross });
        }
    }
    Ok(())
}

/// The sqrt price must stay inside the global bounds.
pub fn check_price_in_bounds(
    source: &impl ConcentratedLiquiditySource,
) -> Result<(), InvariantViolation> {
    let price = source.sqrt_price_x96();
    if price < MIN_SQRT_PRICE || price > MAX_SQRT_PRICE {
        return Err(InvariantViolation::PriceOutOfBounds);
    }
    Ok(())
}

/// The current tick must stay inside the global bounds.
pub fn check_tick_in_bounds(
    source: &impl ConcentratedLiquiditySource,
) -> Result<(), InvariantViolation> {
    let tick = source.current_tick();
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(InvariantViolation::TickOutOfBounds { tick });
    }
    Ok(())
}

/// The current tick must be the floor tick of the current price.
///
/// One exception: a downward swap that stops exactly on a boundary it
/// crossed leaves the tick one below the floor while the price sits
/// exactly on the floor tick's own price.
pub fn check_price_tick_sync(
    source: &impl ConcentratedLiquiditySource,
) -> Result<(), InvariantViolation> {
    let price = source.sqrt_price_x96();
    let tick = source.current_tick();
    let computed = match math::sqrt_price_x96_to_tick(price) {
        Ok(t) => t,
        Err(_) => return Err(InvariantViolation::PriceOutOfBounds),
    };
    if tick == computed {
        return Ok(());
    }
    let on_boundary = matches!(math::tick_to_sqrt_price_x96(computed), Ok(p) if p == price);
    if tick == computed - 1 && on_boundary {
        return Ok(());
    }
    Err(InvariantViolation::PriceTickDesync { tick, computed })
}

/// Runs every state check.
pub fn check_all(source: &impl ConcentratedLiquiditySource) -> Result<(), InvariantViolation> {
    check_price_in_bounds(source)?;
    check_tick_in_bounds(source)?;
    check_price_tick_sync(source)?;
    check_tick_spacing(source)?;
    check_gross_net_consistency(source)?;
    check_net_liquidity_conservation(source)?;
    check_active_liquidity(source)?;
    Ok(())
}

/// Selling token0 must never raise the price; selling token1 must never
/// lower it.
pub fn check_swap_direction(record: &SwapRecord) -> Result<(), InvariantViolation> {
    let ok = if record.zero_for_one {
        record.sqrt_price_after <= record.sqrt_price_before
    } else {
        record.sqrt_price_after >= record.sqrt_price_before
    };
    if ok {
        Ok(())
    } else {
        Err(InvariantViolation::WrongSwapDirection)
    }
}

/// The final price must respect the caller's limit.
pub fn check_swap_respects_limit(record: &SwapRecord) -> Result<(), InvariantViolation> {
    let ok = if record.zero_for_one {
        record.sqrt_price_after >= record.sqrt_price_limit.max(MIN_SQRT_PRICE)
    } else {
        record.sqrt_price_after <= record.sqrt_price_limit.min(MAX_SQRT_PRICE)
    };
    if ok {
        Ok(())
    } else {
        Err(InvariantViolation::SwapLimitExceeded)
    }
}

/// A swap pays one token into the pool and takes the other out; the two
/// signed amounts can never share a sign.
pub fn check_swap_amounts_opposite(record: &SwapRecord) -> Result<(), InvariantViolation> {
    if record.amount0 > 0 && record.amount1 > 0 || record.amount0 < 0 && record.amount1 < 0 {
        return Err(InvariantViolation::SwapAmountsSameSign);
    }
    Ok(())
}
