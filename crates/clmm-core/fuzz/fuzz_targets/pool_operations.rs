#![no_main]

use arbitrary::Arbitrary;
use clmm_core::constants::{MAX_TICK, MIN_TICK, Q96};
use clmm_core::invariants::{self, SwapRecord};
use clmm_core::math::tick_to_sqrt_price_x96;
use clmm_core::pool::{execute_swap, Pool};
use clmm_core::position::PositionManager;
use clmm_core::token::{MockTokenLedger, Owner};

use libfuzzer_sys::fuzz_target;

const TICK_SPACING: u16 = 60;

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Mint { lower: i16, upper: i16, liquidity: u64 },
    Burn { lower: i16, upper: i16, liquidity: u64 },
    Swap { zero_for_one: bool, amount: u64, limit_offset: u16 },
}

fn align(tick: i16) -> i32 {
    i32::from(tick) / i32::from(TICK_SPACING) * i32::from(TICK_SPACING)
}

// Whole-pool state machine: arbitrary mint/burn/swap sequences with the
// full invariant suite after every operation. Operation-level errors are
// expected (bad ranges, over-burns, exhausted limits); state drift is not.
fuzz_target!(|ops: Vec<FuzzOp>| {
    let mut pool = match Pool::new(Q96, TICK_SPACING) {
        Ok(pool) => pool,
        Err(_) => return,
    };
    let mut manager = PositionManager::new();
    let owner = Owner::from_tag(9);
    let mut token0 = MockTokenLedger::new();
    let mut token1 = MockTokenLedger::new();
    token0.fund(owner, u128::MAX >> 1);
    token1.fund(owner, u128::MAX >> 1);

    for op in ops.into_iter().take(64) {
        match op {
            FuzzOp::Mint { lower, upper, liquidity } => {
                let _ = manager.mint(
                    &mut pool,
                    owner,
                    align(lower),
                    align(upper),
                    u128::from(liquidity),
                    &mut token0,
                    &mut token1,
                );
            }
            FuzzOp::Burn { lower, upper, liquidity } => {
                let _ = manager.burn(
                    &mut pool,
                    owner,
                    align(lower),
                    align(upper),
                    u128::from(liquidity),
                    &mut token0,
                    &mut token1,
                );
            }
            FuzzOp::Swap { zero_for_one, amount, limit_offset } => {
                let offset = i32::from(limit_offset) + 1;
                let limit_tick = if zero_for_one {
                    (pool.current_tick() - offset).max(MIN_TICK)
                } else {
                    (pool.current_tick() + offset).min(MAX_TICK)
                };
                let limit = match tick_to_sqrt_price_x96(limit_tick) {
                    Ok(limit) => limit,
                    Err(_) => continue,
                };
                let before = pool.sqrt_price_x96();
                let swapped = execute_swap(
                    &mut pool,
                    &mut token0,
                    &mut token1,
                    owner,
                    zero_for_one,
                    u128::from(amount),
                    limit,
                );
                if let Ok(outcome) = swapped {
                    let record = SwapRecord {
                        zero_for_one,
                        sqrt_price_before: before,
                        sqrt_price_after: pool.sqrt_price_x96(),
                        sqrt_price_limit: limit,
                        amount0: outcome.amount0,
                        amount1: outcome.amount1,
                    };
                    invariants::check_swap_direction(&record).unwrap();
                    invariants::check_swap_respects_limit(&record).unwrap();
                    invariants::check_swap_amounts_opposite(&record).unwrap();
                }
            }
        }
        invariants::check_all(&pool).unwrap();
    }
});
