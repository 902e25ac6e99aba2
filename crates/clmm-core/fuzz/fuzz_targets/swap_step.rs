#![no_main]

use arbitrary::Arbitrary;
use clmm_core::math::tick_to_sqrt_price_x96;
use clmm_core::swap_math::compute_swap_step;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct SwapStepInput {
    current_tick: i32,
    target_offset: u16,
    liquidity: u128,
    amount: u128,
    zero_for_one: bool,
}

// Single-step swap math: the step price must stay between the current
// price and the target, and never consume more than the remaining input.
fuzz_target!(|input: SwapStepInput| {
    // Cap values to keep one iteration cheap and inside u128 amounts.
    let current_tick = input.current_tick.clamp(-400_000, 400_000);
    let offset = i32::from(input.target_offset.max(1));
    let liquidity = input.liquidity % (1 << 110);
    let amount = input.amount % (1 << 100);

    let target_tick = if input.zero_for_one {
        current_tick - offset
    } else {
        current_tick + offset
    };
    let current = tick_to_sqrt_price_x96(current_tick).unwrap();
    let target = match tick_to_sqrt_price_x96(target_tick) {
        Ok(p) => p,
        Err(_) => return,
    };

    let step = match compute_swap_step(current, target, liquidity, amount, input.zero_for_one) {
        Ok(step) => step,
        Err(_) => return,
    };

    assert!(step.amount_in <= amount);
    if input.zero_for_one {
        assert!(step.next_sqrt_price_x96 <= current);
        assert!(step.next_sqrt_price_x96 >= target);
    } else {
        assert!(step.next_sqrt_price_x96 >= current);
        assert!(step.next_sqrt_price_x96 <= target);
    }
    if liquidity == 0 {
        assert_eq!(step.amount_in, 0);
        assert_eq!(step.amount_out, 0);
    }
});
