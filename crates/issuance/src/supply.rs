// issuance/src/supply.rs

use crate::{CapKind, LedgerError, LedgerResult};
use ledger_core::safemath;
use serde::{Deserialize, Serialize};

/// Single source of truth for issued supply against a hard cap.
///
/// `total_supply` and `burned_supply` only ever increase; burning reduces
/// `circulating_supply` without un-minting, so
/// `circulating_supply = total_supply - burned_supply` at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyLedger {
    /// Immutable hard cap on units ever issued
    max_supply: u64,
    /// All units ever issued
    total_supply: u64,
    /// Issued minus burned
    circulating_supply: u64,
    /// All units ever burned
    burned_supply: u64,
}

impl SupplyLedger {
    /// Create a ledger with zero issued supply
    pub fn new(max_supply: u64) -> LedgerResult<Self> {
        if max_supply == 0 {
            return Err(LedgerError::InvalidAmount("max supply must be positive".into()));
        }
        Ok(Self {
            max_supply,
            total_supply: 0,
            circulating_supply: 0,
            burned_supply: 0,
        })
    }

    /// Validate a mint without mutating
    pub fn check_mint(&self, amount: u64) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("mint amount must be positive".into()));
        }
        let new_total = safemath::add(self.total_supply, amount)?;
        if new_total > self.max_supply {
            return Err(LedgerError::SupplyExceeded {
                cap: CapKind::MaxSupply,
                requested: amount,
                available: self.remaining_mintable(),
            });
        }
        Ok(())
    }

    /// Apply a previously validated mint. Infallible after `check_mint`.
    pub fn commit_mint(&mut self, amount: u64) {
        self.total_supply += amount;
        self.circulating_supply += amount;
        self.assert_invariant();
    }

    /// Validate-and-commit mint in one call
    pub fn mint(&mut self, amount: u64) -> LedgerResult<()> {
        self.check_mint(amount)?;
        self.commit_mint(amount);
        Ok(())
    }

    /// Validate a burn without mutating
    pub fn check_burn(&self, amount: u64) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("burn amount must be positive".into()));
        }
        if amount > self.circulating_supply {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                circulating: self.circulating_supply,
            });
        }
        Ok(())
    }

    /// Apply a previously validated burn. `total_supply` is unchanged.
    pub fn commit_burn(&mut self, amount: u64) {
        self.circulating_supply -= amount;
        self.burned_supply += amount;
        self.assert_invariant();
    }

    /// Validate-and-commit burn in one call
    pub fn burn(&mut self, amount: u64) -> LedgerResult<()> {
        self.check_burn(amount)?;
        self.commit_burn(amount);
        Ok(())
    }

    pub fn max_supply(&self) -> u64 {
        self.max_supply
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn circulating_supply(&self) -> u64 {
        self.circulating_supply
    }

    pub fn burned_supply(&self) -> u64 {
        self.burned_supply
    }

    /// Units still issuable before the hard cap
    pub fn remaining_mintable(&self) -> u64 {
        self.max_supply - self.total_supply
    }

    // A broken supply identity means the cap can no longer be trusted;
    // fail loudly rather than continue.
    fn assert_invariant(&self) {
        debug_assert!(self.total_supply <= self.max_supply);
        debug_assert_eq!(
            self.circulating_supply,
            self.total_supply - self.burned_supply
        );
    }
}
