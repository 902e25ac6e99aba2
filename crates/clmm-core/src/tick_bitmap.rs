//! Space-efficient index of initialized ticks.
//!
//! Each bit of a 256-bit word marks whether one spacing-aligned tick is
//! initialized, so the swap loop can find the next boundary in its
//! direction without walking every tick. Words are stored sparsely in a
//! `BTreeMap`; ranges of empty words are skipped in one map step.

use std::collections::BTreeMap;

use primitive_types::U256;

use crate::errors::{ErrorCode, Result};

/// Number of ticks tracked per bitmap word.
pub const WORD_SIZE: i32 = 256;

/// Splits a compressed tick (tick / spacing) into its word index and bit
/// position. Euclidean division keeps negative ticks in the correct word.
fn position(compressed: i32) -> (i16, u8) {
    let word_pos = compressed.div_euclid(WORD_SIZE) as i16;
    let bit_pos = compressed.rem_euclid(WORD_SIZE) as u8;
    (word_pos, bit_pos)
}

/// Mask of all bits at positions `<= bit_pos`.
fn mask_lte(bit_pos: u8) -> U256 {
    if bit_pos == 255 {
        U256::MAX
    } else {
        (U256::one() << (bit_pos + 1)) - U256::one()
    }
}

/// Most significant set bit of a non-zero word.
fn msb(word: U256) -> u8 {
    (255 - word.leading_zeros()) as u8
}

/// Least significant set bit of a non-zero word.
fn lsb(word: U256) -> u8 {
    word.trailing_zeros() as u8
}

/// Sparse bitmap over spacing-aligned ticks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickBitmap {
    words: BTreeMap<i16, U256>,
}

impl TickBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the bit for `tick`, which must be aligned to `tick_spacing`.
    pub fn flip(&mut self, tick: i32, tick_spacing: u16) -> Result<()> {
        let spacing = i32::from(tick_spacing);
        if spacing == 0 || tick % spacing != 0 {
            return Err(ErrorCode::InvalidTickSpacing);
        }
        let (word_pos, bit_pos) = position(tick / spacing);

        let word = self.words.entry(word_pos).or_insert_with(U256::zero);
        *word = *word ^ (U256::one() << bit_pos);
        if word.is_zero() {
            self.words.remove(&word_pos);
        }
        Ok(())
    }

    /// Whether the bit for `tick` is set. Misaligned ticks are never
    /// initialized.
    pub fn is_initialized(&self, tick: i32, tick_spacing: u16) -> bool {
        let spacing = i32::from(tick_spacing);
        if spacing == 0 || tick % spacing != 0 {
            return false;
        }
        let (word_pos, bit_pos) = position(tick / spacing);
        match self.words.get(&word_pos) {
            Some(word) => !(*word & (U256::one() << bit_pos)).is_zero(),
            None => false,
        }
    }

    /// Finds the nearest initialized tick from `tick` in one direction.
    ///
    /// With `lte` set, returns the greatest initialized tick `<= tick`;
    /// otherwise the smallest initialized tick `> tick`. `tick` itself
    /// need not be aligned. Returns `None` when no initialized tick
    /// exists in that direction.
    pub fn next_initialized_tick(&self, tick: i32, tick_spacing: u16, lte: bool) -> Option<i32> {
        let spacing = i32::from(tick_spacing);
        if spacing == 0 {
            return None;
        }
        let compressed = tick.div_euclid(spacing);
        let (word_pos, bit_pos) = position(compressed);

        if lte {
            for (&pos, &word) in self.words.range(..=word_pos).rev() {
                let masked = if pos == word_pos {
                    word & mask_lte(bit_pos)
                } else {
                    word
                };
                if !masked.is_zero() {
                    let found = i32::from(pos) * WORD_SIZE + i32::from(msb(masked));
                    return Some(found * spacing);
                }
            }
        } else {
            for (&pos, &word) in self.words.range(word_pos..) {
                let masked = if pos == word_pos {
                    word & !mask_lte(bit_pos)
                } else {
                    word
                };
                if !masked.is_zero() {
                    let found = i32::from(pos) * WORD_SIZE + i32::from(lsb(masked));
                    return Some(found * spacing);
                }
            }
        }
        None
    }
}
