//! Protocol-wide constants for tick indexing and Q64.96 price bounds.

use primitive_types::U256;

/// The minimum tick index supported by the pool.
///
/// Corresponds to a price ratio of roughly 2^-128 between the two assets.
pub const MIN_TICK: i32 = -887272;

/// The maximum tick index supported by the pool.
pub const MAX_TICK: i32 = 887272;

/// sqrt(1.0001) ^ MIN_TICK in Q64.96 representation.
///
/// `tick_to_sqrt_price_x96(MIN_TICK)` evaluates to exactly this value.
pub const MIN_SQRT_PRICE: U256 = U256([0x1000276a3, 0, 0, 0]);

/// sqrt(1.0001) ^ MAX_TICK in Q64.96 representation
/// (1461446703485210103287273052203988822378723970342).
pub const MAX_SQRT_PRICE: U256 = U256([
    0x5d951d5263988d26,
    0xefd1fc6a50648849,
    0xfffd8963,
    0x0,
]);

/// 2^96, the Q64.96 fixed-point one. Also the sqrt price at tick 0.
pub const Q96: U256 = U256([0, 0x100000000, 0, 0]);

/// Tick spacing for a stable-pair pool.
pub const TICK_SPACING_STABLE: u16 = 1;

/// Tick spacing for a standard pool.
pub const TICK_SPACING_STANDARD: u16 = 10;

/// Tick spacing for a volatile-pair pool.
pub const TICK_SPACING_VOLATILE: u16 = 60;
