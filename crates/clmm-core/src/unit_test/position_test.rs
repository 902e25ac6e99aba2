use crate::constants::{MAX_SQRT_PRICE, Q96, TICK_SPACING_VOLATILE};
use crate::errors::ErrorCode;
use crate::invariants;
use crate::pool::{execute_swap, Pool};
use crate::position::{PositionKey, PositionManager};
use crate::token::{MockTokenLedger, Owner, TokenLedger};

const LIQUIDITY: u128 = 1_000_000_000_000_000_000_000_000;
const FUNDING: u128 = 1 << 100;

fn setup() -> (Pool, PositionManager, MockTokenLedger, MockTokenLedger, Owner) {
    let pool = Pool::new(Q96, TICK_SPACING_VOLATILE).unwrap();
    let owner = Owner::from_tag(1);
    let mut token0 = MockTokenLedger::new();
    let mut token1 = MockTokenLedger::new();
    token0.fund(owner, FUNDING);
    token1.fund(owner, FUNDING);
    (pool, PositionManager::new(), token0, token1, owner)
}

#[test]
fn mint_in_range_takes_both_tokens() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    let (amount0, amount1) = manager
        .mint(&mut pool, owner, -600, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();

    assert_eq!(amount0, 29_553_010_879_137_169_680_828);
    assert_eq!(amount1, 29_553_010_879_137_169_680_828);
    assert_eq!(token0.reserve(), amount0);
    assert_eq!(token1.reserve(), amount1);
    assert_eq!(token0.balance_of(owner), FUNDING - amount0);
    assert_eq!(pool.liquidity(), LIQUIDITY);
    assert_eq!(
        manager.liquidity_of(&PositionKey {
            owner,
            tick_lower: -600,
            tick_upper: 600
        }),
        LIQUIDITY
    );
    invariants::check_all(&pool).unwrap();
}

#[test]
fn mint_below_current_price_is_all_token1() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    let (amount0, amount1) = manager
        .mint(&mut pool, owner, -600, -60, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();

    assert_eq!(amount0, 0);
    assert!(amount1 > 0);
    assert_eq!(pool.liquidity(), 0, "range does not bracket the price");
    invariants::check_all(&pool).unwrap();
}

#[test]
fn mint_above_current_price_is_all_token0() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    let (amount0, amount1) = manager
        .mint(&mut pool, owner, 60, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();

    assert!(amount0 > 0);
    assert_eq!(amount1, 0);
    assert_eq!(pool.liquidity(), 0);
    invariants::check_all(&pool).unwrap();
}

#[test]
fn burn_roundtrip_restores_everything() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    let (minted0, minted1) = manager
        .mint(&mut pool, owner, -600, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();
    let (burned0, burned1) = manager
        .burn(&mut pool, owner, -600, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();

    // Burns round down where mints round up, so the pool never pays out
    // more than it took in.
    assert_eq!(burned0, minted0 - 1);
    assert_eq!(burned1, minted1 - 1);
    assert!(token0.reserve() <= minted0);

    assert_eq!(pool.liquidity(), 0);
    assert!(!pool.ledger().is_initialized(-600));
    assert!(!pool.ledger().is_initialized(600));
    assert_eq!(
        manager.liquidity_of(&PositionKey {
            owner,
            tick_lower: -600,
            tick_upper: 600
        }),
        0
    );
    assert_eq!(manager.positions().count(), 0);
    invariants::check_all(&pool).unwrap();
}

#[test]
fn partial_burn_leaves_remainder() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    manager
        .mint(&mut pool, owner, -600, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();
    manager
        .burn(&mut pool, owner, -600, 600, LIQUIDITY / 4, &mut token0, &mut token1)
        .unwrap();

    let key = PositionKey {
        owner,
        tick_lower: -600,
        tick_upper: 600,
    };
    assert_eq!(manager.liquidity_of(&key), LIQUIDITY - LIQUIDITY / 4);
    assert_eq!(pool.liquidity(), LIQUIDITY - LIQUIDITY / 4);
    invariants::check_all(&pool).unwrap();
}

#[test]
fn zero_amounts_rejected() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    assert_eq!(
        manager.mint(&mut pool, owner, -600, 600, 0, &mut token0, &mut token1),
        Err(ErrorCode::InvalidAmount)
    );
    assert_eq!(
        manager.burn(&mut pool, owner, -600, 600, 0, &mut token0, &mut token1),
        Err(ErrorCode::InvalidAmount)
    );
}

#[test]
fn over_burn_fails_and_changes_nothing() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    manager
        .mint(&mut pool, owner, -600, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();
    let pool_before = pool.clone();
    let reserve0_before = token0.reserve();

    assert_eq!(
        manager.burn(
            &mut pool,
            owner,
            -600,
            600,
            LIQUIDITY + 1,
            &mut token0,
            &mut token1
        ),
        Err(ErrorCode::InsufficientLiquidity)
    );
    assert_eq!(pool, pool_before);
    assert_eq!(token0.reserve(), reserve0_before);
    invariants::check_all(&pool).unwrap();
}

#[test]
fn burn_after_swap_pays_out_of_the_settled_reserve() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    let (minted0, minted1) = manager
        .mint(&mut pool, owner, -600, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();

    // The swap shifts the position's value toward token1; the extra
    // token1 the burn pays out is the swap input sitting in reserve.
    let outcome = execute_swap(
        &mut pool,
        &mut token0,
        &mut token1,
        owner,
        false,
        1_000_000_000_000_000_000_000,
        MAX_SQRT_PRICE,
    )
    .unwrap();

    let (burned0, burned1) = manager
        .burn(&mut pool, owner, -600, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();

    assert!(burned1 > minted1);
    assert!(burned1 <= minted1 + outcome.amount_in);
    assert!(burned0 <= minted0 - outcome.amount_out);
    assert_eq!(pool.liquidity(), 0);
    assert_eq!(manager.positions().count(), 0);
    invariants::check_all(&pool).unwrap();
}

#[test]
fn burn_against_short_reserves_fails_cleanly() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    manager
        .mint(&mut pool, owner, -600, 600, LIQUIDITY, &mut token0, &mut token1)
        .unwrap();
    let pool_before = pool.clone();

    // Ledgers that never saw the mint cannot cover the payout.
    let mut empty0 = MockTokenLedger::new();
    let mut empty1 = MockTokenLedger::new();
    assert_eq!(
        manager.burn(&mut pool, owner, -600, 600, LIQUIDITY, &mut empty0, &mut empty1),
        Err(ErrorCode::InsufficientLiquidity)
    );
    assert_eq!(pool, pool_before);
    assert_eq!(manager.positions().count(), 1);
    invariants::check_all(&pool).unwrap();
}

#[test]
fn burn_of_unknown_position_fails() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    assert_eq!(
        manager.burn(&mut pool, owner, -600, 600, 1, &mut token0, &mut token1),
        Err(ErrorCode::InsufficientLiquidity)
    );
}

#[test]
fn invalid_range_rejected_before_any_state_change() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    assert_eq!(
        manager.mint(&mut pool, owner, -30, 600, LIQUIDITY, &mut token0, &mut token1),
        Err(ErrorCode::InvalidTickRange)
    );
    assert_eq!(token0.reserve(), 0);
    assert_eq!(manager.positions().count(), 0);
}

#[test]
fn positions_are_keyed_by_owner_and_range() {
    let (mut pool, mut manager, mut token0, mut token1, owner_a) = setup();
    let owner_b = Owner::from_tag(2);
    token0.fund(owner_b, FUNDING);
    token1.fund(owner_b, FUNDING);

    manager
        .mint(&mut pool, owner_a, -600, 600, 1_000, &mut token0, &mut token1)
        .unwrap();
    manager
        .mint(&mut pool, owner_b, -600, 600, 2_000, &mut token0, &mut token1)
        .unwrap();
    manager
        .mint(&mut pool, owner_a, -120, 120, 3_000, &mut token0, &mut token1)
        .unwrap();

    assert_eq!(
        manager.liquidity_of(&PositionKey {
            owner: owner_a,
            tick_lower: -600,
            tick_upper: 600
        }),
        1_000
    );
    assert_eq!(
        manager.liquidity_of(&PositionKey {
            owner: owner_b,
            tick_lower: -600,
            tick_upper: 600
        }),
        2_000
    );
    assert_eq!(pool.liquidity(), 6_000);
    // The shared boundaries stack gross liquidity.
    assert_eq!(pool.ledger().get(-600).liquidity_gross, 3_000);
    assert_eq!(pool.ledger().get(-600).liquidity_net, 3_000);
    invariants::check_all(&pool).unwrap();
}

#[test]
fn repeated_mint_accumulates_in_one_position() {
    let (mut pool, mut manager, mut token0, mut token1, owner) = setup();
    manager
        .mint(&mut pool, owner, -600, 600, 1_000, &mut token0, &mut token1)
        .unwrap();
    manager
        .mint(&mut pool, owner, -600, 600, 500, &mut token0, &mut token1)
        .unwrap();

    assert_eq!(manager.positions().count(), 1);
    assert_eq!(
        manager.liquidity_of(&PositionKey {
            owner,
            tick_lower: -600,
            tick_upper: 600
        }),
        1_500
    );
}
