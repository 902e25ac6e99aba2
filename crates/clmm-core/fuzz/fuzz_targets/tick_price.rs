#![no_main]

use arbitrary::Arbitrary;
use clmm_core::constants::{MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK};
use clmm_core::math::{sqrt_price_x96_to_tick, tick_to_sqrt_price_x96};
use libfuzzer_sys::fuzz_target;
use primitive_types::U256;

#[derive(Arbitrary, Debug)]
struct TickPriceInput {
    tick: i32,
    price_low: u128,
    price_high: u64,
}

// Exercises the tick/price conversion pair: boundary prices must round-trip
// to their tick exactly, and arbitrary in-bounds prices must satisfy the
// floor relation.
fuzz_target!(|input: TickPriceInput| {
    let tick = input.tick.clamp(MIN_TICK, MAX_TICK);

    let price = tick_to_sqrt_price_x96(tick).unwrap();
    assert!(price >= MIN_SQRT_PRICE && price <= MAX_SQRT_PRICE);
    assert_eq!(sqrt_price_x96_to_tick(price).unwrap(), tick);

    // Build an arbitrary price inside the global bounds.
    let span = MAX_SQRT_PRICE - MIN_SQRT_PRICE;
    let raw = (U256::from(input.price_low) | (U256::from(input.price_high) << 128)) % (span + 1);
    let probe = MIN_SQRT_PRICE + raw;

    let floor_tick = sqrt_price_x96_to_tick(probe).unwrap();
    assert!(tick_to_sqrt_price_x96(floor_tick).unwrap() <= probe);
    if floor_tick < MAX_TICK {
        assert!(tick_to_sqrt_price_x96(floor_tick + 1).unwrap() > probe);
    }
});
