//! Per-tick liquidity records.
//!
//! The price line is divided into discrete ticks. A tick becomes
//! initialized when some position uses it as a range boundary; the record
//! tracks how much liquidity references the tick and how active liquidity
//! changes when the price crosses it.

use crate::errors::{ErrorCode, Result};

/// State of one initialized tick boundary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Total liquidity referencing this tick from either side. Drives
    /// initialization tracking only.
    pub liquidity_gross: u128,
    /// Amount added to active liquidity when the price crosses this tick
    /// left to right (subtracted right to left).
    pub liquidity_net: i128,
}

impl TickInfo {
    /// A tick is initialized while any position still references it.
    pub fn is_initialized(&self) -> bool {
        self.liquidity_gross > 0
    }

    /// Updates the record when a position referencing this tick changes.
    ///
    /// `liquidity_gross` moves by `|liquidity_delta|` in the mint/burn
    /// direction. `liquidity_net` moves by `+liquidity_delta` at a lower
    /// boundary and `-liquidity_delta` at an upper boundary, which is what
    /// makes the net deltas across any position's two boundaries cancel.
    ///
    /// # Arguments
    ///
    /// * `liquidity_delta` - Positive when minting, negative when burning.
    /// * `is_upper_tick` - True when this tick is the position's upper
    ///   boundary.
    pub fn apply_liquidity_change(
        &mut self,
        liquidity_delta: i128,
        is_upper_tick: bool,
    ) -> Result<()> {
        let abs_delta = liquidity_delta.unsigned_abs();

        self.liquidity_gross = if liquidity_delta >= 0 {
            self.liquidity_gross
                .checked_add(abs_delta)
                .ok_or(ErrorCode::MathOverflow)?
        } else {
            self.liquidity_gross
                .checked_sub(abs_delta)
                .ok_or(ErrorCode::InsufficientLiquidity)?
        };

        self.liquidity_net = if is_upper_tick {
            self.liquidity_net.checked_sub(liquidity_delta)
        } else {
            self.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(ErrorCode::MathOverflow)?;

        Ok(())
    }
}
