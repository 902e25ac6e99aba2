//! Token movement capability.
//!
//! The pool model never holds token balances itself; it computes amounts
//! and settles them through this trait. Hosts plug in whatever asset
//! backend they have. An in-memory implementation ships for tests and
//! harnesses.

use std::collections::HashMap;

use crate::errors::{ErrorCode, Result};

/// Opaque 32-byte account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Owner(pub [u8; 32]);

impl Owner {
    /// Convenience constructor for tests: an id with every byte set to
    /// `tag`.
    pub fn from_tag(tag: u8) -> Self {
        Self([tag; 32])
    }
}

/// One side of a pool's asset pair.
///
/// `transfer_in` moves funds from an owner into the pool's reserve and
/// `transfer_out` moves reserve funds to an owner. `balance_of` and
/// `reserve` let callers prove a settlement is payable before any pool
/// state is committed. Implementations decide what a balance actually is;
/// the pool only ever passes amounts it has already computed.
pub trait TokenLedger {
    fn transfer_in(&mut self, from: Owner, amount: u128) -> Result<()>;
    fn transfer_out(&mut self, to: Owner, amount: u128) -> Result<()>;
    fn balance_of(&self, owner: Owner) -> u128;
    /// Funds currently held by the pool side of this ledger.
    fn reserve(&self) -> u128;
}

/// In-memory token ledger with a single pool reserve.
#[derive(Debug, Default, Clone)]
pub struct MockTokenLedger {
    balances: HashMap<Owner, u128>,
    reserve: u128,
}

impl MockTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `owner` with spendable funds.
    pub fn fund(&mut self, owner: Owner, amount: u128) {
        *self.balances.entry(owner).or_insert(0) += amount;
    }
}

impl TokenLedger for MockTokenLedger {
    fn transfer_in(&mut self, from: Owner, amount: u128) -> Result<()> {
        let balance = self.balances.entry(from).or_insert(0);
        *balance = balance
            .checked_sub(amount)
            .ok_or(ErrorCode::InsufficientLiquidity)?;
        self.reserve = self
            .reserve
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    fn transfer_out(&mut self, to: Owner, amount: u128) -> Result<()> {
        self.reserve = self
            .reserve
            .checked_sub(amount)
            .ok_or(ErrorCode::InsufficientLiquidity)?;
        let balance = self.balances.entry(to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    fn balance_of(&self, owner: Owner) -> u128 {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    fn reserve(&self) -> u128 {
        self.reserve
    }
}
