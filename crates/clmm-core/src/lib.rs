//! Host-side model of a concentrated liquidity pool.
//!
//! The crate implements tick-indexed liquidity accounting end to end:
//! Q64.96 tick math, a sparse tick ledger with a bitmap index, position
//! mint/burn, and an exact-input swap engine that crosses initialized
//! ticks atomically. A read-only invariant layer exposes the system's
//! conservation and consistency properties as typed checks, so property
//! tests and fuzzers can drive arbitrary operation sequences and assert
//! the state machine never drifts.

pub mod constants;
pub mod errors;
pub mod invariants;
pub mod math;
pub mod pool;
pub mod position;
pub mod swap_math;
pub mod tick;
pub mod tick_bitmap;
pub mod tick_ledger;
pub mod token;

#[cfg(test)]
pub mod unit_test;

#[cfg(test)]
pub mod property_based_test;

pub use errors::{ErrorCode, Result};
pub use invariants::{check_all, ConcentratedLiquiditySource, InvariantViolation, SwapRecord};
pub use pool::{execute_swap, Pool, SwapOutcome};
pub use position::{PositionData, PositionKey, PositionManager};
pub use tick::TickInfo;
pub use tick_ledger::TickLedger;
pub use token::{MockTokenLedger, Owner, TokenLedger};
