//! Sparse store of initialized ticks.
//!
//! Pairs the per-tick records with the bitmap index and keeps the two in
//! lockstep: a tick's bitmap bit is set exactly while its record has
//! non-zero gross liquidity. Records return to the free pool the moment
//! the last position referencing them is burned.

use std::collections::BTreeMap;

use crate::errors::{ErrorCode, Result};
use crate::tick::TickInfo;
use crate::tick_bitmap::TickBitmap;

/// Tick records plus their bitmap index, keyed by tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickLedger {
    tick_spacing: u16,
    ticks: BTreeMap<i32, TickInfo>,
    bitmap: TickBitmap,
}

impl TickLedger {
    pub fn new(tick_spacing: u16) -> Result<Self> {
        if tick_spacing == 0 {
            return Err(ErrorCode::InvalidTickSpacing);
        }
        Ok(Self {
            tick_spacing,
            ticks: BTreeMap::new(),
            bitmap: TickBitmap::new(),
        })
    }

    pub fn tick_spacing(&self) -> u16 {
        self.tick_spacing
    }

    /// Returns the record for `tick`, or a zero record when the tick is
    /// not initialized. Never allocates.
    pub fn get(&self, tick: i32) -> TickInfo {
        self.ticks.get(&tick).copied().unwrap_or_default()
    }

    pub fn is_initialized(&self, tick: i32) -> bool {
        self.bitmap.is_initialized(tick, self.tick_spacing)
    }

    /// Applies a position's liquidity delta to both of its boundary
    /// ticks.
    ///
    /// Both updates are validated on copies before either is written, so
    /// a failing update (for example a burn that would drive a boundary's
    /// gross liquidity negative) leaves the ledger untouched. Requires
    /// `tick_lower < tick_upper`.
    pub fn apply_range_delta(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
    ) -> Result<()> {
        let mut lower = self.get(tick_lower);
        let mut upper = self.get(tick_upper);
        let lower_was_initialized = lower.is_initialized();
        let upper_was_initialized = upper.is_initialized();

        lower.apply_liquidity_change(liquidity_delta, false)?;
        upper.apply_liquidity_change(liquidity_delta, true)?;

        self.store(tick_lower, lower, lower_was_initialized)?;
        self.store(tick_upper, upper, upper_was_initialized)?;
        Ok(())
    }

    fn store(&mut self, tick: i32, info: TickInfo, was_initialized: bool) -> Result<()> {
        if info.is_initialized() {
            self.ticks.insert(tick, info);
        } else {
            self.ticks.remove(&tick);
        }
        if info.is_initialized() != was_initialized {
            self.bitmap.flip(tick, self.tick_spacing)?;
        }
        Ok(())
    }

    /// Net liquidity change when the price crosses `tick` left to right.
    pub fn liquidity_net(&self, tick: i32) -> i128 {
        self.get(tick).liquidity_net
    }

    /// Sum of `liquidity_net` over every initialized tick. Zero whenever
    /// the ledger only ever saw matched boundary pairs.
    pub fn net_liquidity_sum(&self) -> i128 {
        self.ticks.values().map(|info| info.liquidity_net).sum()
    }

    /// Initialized ticks in ascending order.
    pub fn initialized_ticks(&self) -> impl Iterator<Item = (i32, TickInfo)> + '_ {
        self.ticks.iter().map(|(&tick, &info)| (tick, info))
    }

    /// Nearest initialized tick at or below `tick` (`lte`), or strictly
    /// above it otherwise.
    pub fn next_initialized_tick(&self, tick: i32, lte: bool) -> Option<i32> {
        self.bitmap.next_initialized_tick(tick, self.tick_spacing, lte)
    }
}
