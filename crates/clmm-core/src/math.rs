//! Fixed-point math for the concentrated liquidity core.
//!
//! Prices are square roots of the token1/token0 ratio in Q64.96 format
//! (96 fractional bits, stored in a `U256`). Ticks index prices in steps
//! of sqrt(1.0001): `price(t) = sqrt(1.0001)^t * 2^96`.
//!
//! All intermediate products that can exceed 256 bits run through `U512`,
//! and every rounding direction is explicit: amounts owed to the pool
//! round up, amounts paid out round down.

use primitive_types::{U256, U512};

use crate::constants::{MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK, Q96};
use crate::errors::{ErrorCode, Result};

/// Precomputed Q128.128 factors `sqrt(1.0001)^-(2^i)` for bit `i` of the
/// tick magnitude. Multiplying the subset of factors selected by the tick's
/// bits yields `sqrt(1.0001)^-|tick|` to full precision.
const MAGIC_FACTORS: [U256; 20] = [
    U256([0xaa2d162d1a594001, 0xfffcb933bd6fad37, 0x0, 0x0]),
    U256([0x59a46990580e213a, 0xfff97272373d4132, 0x0, 0x0]),
    U256([0xef12357cf3c7fdcc, 0xfff2e50f5f656932, 0x0, 0x0]),
    U256([0x1c3624eaa0941cd0, 0xffe5caca7e10e4e6, 0x0, 0x0]),
    U256([0xc9db58835c926644, 0xffcb9843d60f6159, 0x0, 0x0]),
    U256([0x472e6896dfb254c0, 0xff973b41fa98c081, 0x0, 0x0]),
    U256([0x43ec78b326b52861, 0xff2ea16466c96a38, 0x0, 0x0]),
    U256([0x11c461f1969c3053, 0xfe5dee046a99a2a8, 0x0, 0x0]),
    U256([0xdcffc83b479aa3a4, 0xfcbe86c7900a88ae, 0x0, 0x0]),
    U256([0x6f2b074cf7815e54, 0xf987a7253ac41317, 0x0, 0x0]),
    U256([0x940c7a398e4b70f3, 0xf3392b0822b70005, 0x0, 0x0]),
    U256([0x43b29c7fa6e889d9, 0xe7159475a2c29b74, 0x0, 0x0]),
    U256([0x845ad8f792aa5825, 0xd097f3bdfd2022b8, 0x0, 0x0]),
    U256([0x8a65dc1f90e061e5, 0xa9f746462d870fdf, 0x0, 0x0]),
    U256([0x90bb3df62baf32f7, 0x70d869a156d2a1b8, 0x0, 0x0]),
    U256([0x81231505542fcfa6, 0x31be135f97d08fd9, 0x0, 0x0]),
    U256([0xc677de54f3e99bc9, 0x9aa508b5b7a84e1, 0x0, 0x0]),
    U256([0x6699c329225ee604, 0x5d6af8dedb8119, 0x0, 0x0]),
    U256([0x1ea926041bedfe98, 0x2216e584f5fa, 0x0, 0x0]),
    U256([0x91f7dc42444e8fa2, 0x48a1703, 0x0, 0x0]),
];

/// 1.0 in Q128.128, the ladder's starting ratio for even tick magnitudes.
const ONE_Q128: U256 = U256([0, 0, 1, 0]);

/// `(x * y) >> 128` with a 512-bit intermediate product.
fn mul_shift_128(x: U256, y: U256) -> U256 {
    let product = x.full_mul(y) >> 128;
    let U512(limbs) = product;
    U256([limbs[0], limbs[1], limbs[2], limbs[3]])
}

fn u512_to_u256(value: U512) -> Result<U256> {
    if value.bits() > 256 {
        return Err(ErrorCode::MathOverflow);
    }
    let U512(limbs) = value;
    Ok(U256([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

fn u256_to_u128(value: U256) -> Result<u128> {
    if value.bits() > 128 {
        return Err(ErrorCode::MathOverflow);
    }
    Ok(value.low_u128())
}

/// Computes `floor(a * b / denominator)` without intermediate overflow.
pub(crate) fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(ErrorCode::MathOverflow);
    }
    u512_to_u256(a.full_mul(b) / U512::from(denominator))
}

/// Computes `ceil(a * b / denominator)` without intermediate overflow.
pub(crate) fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(ErrorCode::MathOverflow);
    }
    let (quotient, remainder) = a.full_mul(b).div_mod(U512::from(denominator));
    let quotient = u512_to_u256(quotient)?;
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        quotient
            .checked_add(U256::one())
            .ok_or(ErrorCode::MathOverflow)
    }
}

/// Computes `ceil(numerator / denominator)`.
pub(crate) fn div_rounding_up(numerator: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(ErrorCode::MathOverflow);
    }
    let (quotient, remainder) = numerator.div_mod(denominator);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        quotient
            .checked_add(U256::one())
            .ok_or(ErrorCode::MathOverflow)
    }
}

/// Converts a tick index to its Q64.96 sqrt price.
///
/// Evaluates `sqrt(1.0001)^tick * 2^96` via the binary factor ladder:
/// the Q128.128 factors for each set bit of `|tick|` are multiplied
/// together, the result inverted for positive ticks, then truncated to
/// 96 fractional bits with round-up.
///
/// # Arguments
///
/// * `tick` - The tick index, in `[MIN_TICK, MAX_TICK]`.
///
/// # Returns
///
/// The sqrt price in Q64.96, or `ErrorCode::OutOfBounds` when the tick
/// is outside the supported range.
pub fn tick_to_sqrt_price_x96(tick: i32) -> Result<U256> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(ErrorCode::OutOfBounds);
    }

    let abs_tick = tick.unsigned_abs();
    let mut ratio = if abs_tick & 1 != 0 {
        MAGIC_FACTORS[0]
    } else {
        ONE_Q128
    };
    for (i, factor) in MAGIC_FACTORS.iter().enumerate().skip(1) {
        if abs_tick & (1u32 << i) != 0 {
            ratio = mul_shift_128(ratio, *factor);
        }
    }

    // The ladder computes the negative-tick ratio; invert for positive.
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up on truncation.
    let shifted = ratio >> 32;
    if (ratio & U256::from(0xffff_ffffu64)).is_zero() {
        Ok(shifted)
    } else {
        Ok(shifted + U256::one())
    }
}

/// Converts a Q64.96 sqrt price to the greatest tick whose own sqrt price
/// does not exceed it.
///
/// Binary search over `tick_to_sqrt_price_x96`, so the floor relation
/// `price(result) <= sqrt_price_x96 < price(result + 1)` holds exactly,
/// by construction.
///
/// # Arguments
///
/// * `sqrt_price_x96` - The sqrt price, in `[MIN_SQRT_PRICE, MAX_SQRT_PRICE]`.
pub fn sqrt_price_x96_to_tick(sqrt_price_x96: U256) -> Result<i32> {
    if sqrt_price_x96 < MIN_SQRT_PRICE || sqrt_price_x96 > MAX_SQRT_PRICE {
        return Err(ErrorCode::OutOfBounds);
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    let mut answer = MIN_TICK;
    while low <= high {
        let mid = low + (high - low) / 2;
        if tick_to_sqrt_price_x96(mid)? <= sqrt_price_x96 {
            answer = mid;
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }
    Ok(answer)
}

/// Returns true when `tick` is inside the global bounds and aligned to the
/// pool's tick spacing.
pub fn is_valid_tick(tick: i32, tick_spacing: u16) -> bool {
    tick_spacing > 0
        && (MIN_TICK..=MAX_TICK).contains(&tick)
        && tick % i32::from(tick_spacing) == 0
}

/// Amount of token0 held across the price range `[lower, upper]` by
/// `liquidity`.
///
/// `amount0 = L * 2^96 * (sqrt_upper - sqrt_lower) / (sqrt_upper * sqrt_lower)`
///
/// The two price arguments may be passed in either order. `round_up`
/// selects ceiling division (amounts owed to the pool) versus floor
/// (amounts paid out).
pub fn get_amount0_delta(
    sqrt_price_a_x96: U256,
    sqrt_price_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<u128> {
    let (lower, upper) = if sqrt_price_a_x96 <= sqrt_price_b_x96 {
        (sqrt_price_a_x96, sqrt_price_b_x96)
    } else {
        (sqrt_price_b_x96, sqrt_price_a_x96)
    };
    if lower.is_zero() {
        return Err(ErrorCode::MathOverflow);
    }

    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = upper - lower;

    let amount = if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper)?, lower)?
    } else {
        mul_div(numerator1, numerator2, upper)? / lower
    };
    u256_to_u128(amount)
}

/// Amount of token1 held across the price range `[lower, upper]` by
/// `liquidity`.
///
/// `amount1 = L * (sqrt_upper - sqrt_lower) / 2^96`
pub fn get_amount1_delta(
    sqrt_price_a_x96: U256,
    sqrt_price_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<u128> {
    let (lower, upper) = if sqrt_price_a_x96 <= sqrt_price_b_x96 {
        (sqrt_price_a_x96, sqrt_price_b_x96)
    } else {
        (sqrt_price_b_x96, sqrt_price_a_x96)
    };

    let amount = if round_up {
        mul_div_rounding_up(U256::from(liquidity), upper - lower, Q96)?
    } else {
        mul_div(U256::from(liquidity), upper - lower, Q96)?
    };
    u256_to_u128(amount)
}

/// Next sqrt price after selling `amount_in` of token0 into `liquidity` at
/// `sqrt_price_x96`. Price moves down.
///
/// `sqrt_next = ceil(L * 2^96 * sqrt_p / (L * 2^96 + amount * sqrt_p))`
///
/// Rounds up, so the computed price never undershoots the true one.
pub fn get_next_sqrt_price_from_amount0_in(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: u128,
) -> Result<U256> {
    if liquidity == 0 {
        return Err(ErrorCode::InsufficientLiquidity);
    }
    if amount_in == 0 {
        return Ok(sqrt_price_x96);
    }

    let numerator = U512::from(liquidity) << 96;
    let product = U512::from(amount_in) * U512::from(sqrt_price_x96);
    let denominator = numerator
        .checked_add(product)
        .ok_or(ErrorCode::MathOverflow)?;

    let (quotient, remainder) = (numerator * U512::from(sqrt_price_x96)).div_mod(denominator);
    let next = if remainder.is_zero() {
        quotient
    } else {
        quotient + U512::one()
    };
    u512_to_u256(next)
}

/// Next sqrt price after selling `amount_in` of token1 into `liquidity` at
/// `sqrt_price_x96`. Price moves up.
///
/// `sqrt_next = sqrt_p + floor(amount * 2^96 / L)`
pub fn get_next_sqrt_price_from_amount1_in(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: u128,
) -> Result<U256> {
    if liquidity == 0 {
        return Err(ErrorCode::InsufficientLiquidity);
    }

    let quotient = mul_div(U256::from(amount_in), Q96, U256::from(liquidity))?;
    sqrt_price_x96
        .checked_add(quotient)
        .ok_or(ErrorCode::MathOverflow)
}

/// Applies a signed liquidity delta to an unsigned liquidity amount with
/// explicit overflow and underflow checks.
pub fn add_liquidity_delta(liquidity: u128, delta: i128) -> Result<u128> {
    if delta >= 0 {
        liquidity
            .checked_add(delta as u128)
            .ok_or(ErrorCode::MathOverflow)
    } else {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(ErrorCode::InsufficientLiquidity)
    }
}
