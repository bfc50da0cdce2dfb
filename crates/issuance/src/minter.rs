// issuance/src/minter.rs

use crate::category::{CategoryAllocator, CategoryKind};
use crate::{CapKind, LedgerError, LedgerResult};
use ledger_core::{day_number, safemath, Address, Timestamp, MS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authorization record for one issuer address.
///
/// Lifecycle: authorized (active) → revoked or expired. Revocation is a
/// soft-delete; the record stays for audit. Expiry is discovered lazily on
/// the next mint attempt, so an expired-but-unused minter still reports
/// `is_active = true` until then.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minter {
    /// Issuer address
    pub address: Address,
    /// Category the minter issues under
    pub category: CategoryKind,
    /// Lifetime cap
    pub max_mint_amount: u64,
    /// Lifetime counter
    pub minted_amount: u64,
    /// Rolling daily cap
    pub daily_limit: u64,
    /// Units minted on `last_mint_day`
    pub daily_minted: u64,
    /// UTC day number of the most recent mint
    pub last_mint_day: u64,
    /// False once revoked or lazily expired
    pub is_active: bool,
    /// When the authorization was created (ms)
    pub authorized_at: Timestamp,
    /// Authorization expiry (ms), 0 = never
    pub expires_at: Timestamp,
    /// Free-form description of what this minter issues
    pub purpose: String,
}

impl Minter {
    /// Lifetime cap headroom
    pub fn remaining_lifetime(&self) -> u64 {
        self.max_mint_amount - self.minted_amount
    }
}

/// Post-state of a validated mint, computed by `prepare_mint` and applied by
/// `commit_mint` only once every other check in the request has passed.
#[derive(Debug, Clone, Copy)]
pub struct MintCharge {
    /// Category the mint is charged against
    pub category: CategoryKind,
    /// New lifetime counter
    pub minted_amount: u64,
    /// New daily counter (post logical reset)
    pub daily_minted: u64,
    /// Day the mint lands on
    pub day: u64,
}

/// Registry of authorized minters keyed by address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinterRegistry {
    minters: HashMap<Address, Minter>,
}

impl MinterRegistry {
    pub fn new() -> Self {
        Self {
            minters: HashMap::new(),
        }
    }

    /// Authorize a new minter.
    ///
    /// The lifetime cap is promised against the category here, at
    /// authorization time: the category must cover `max_mint_amount` on top
    /// of what it has already minted plus the unminted headroom of every
    /// other active minter. Minting later never re-negotiates capacity.
    #[allow(clippy::too_many_arguments)]
    pub fn authorize(
        &mut self,
        allocator: &CategoryAllocator,
        address: Address,
        category: CategoryKind,
        max_mint_amount: u64,
        daily_limit: u64,
        expires_at: Timestamp,
        purpose: impl Into<String>,
        now: Timestamp,
    ) -> LedgerResult<&Minter> {
        if self.minters.contains_key(&address) {
            // Terminal states included: re-authorization requires revoke first
            return Err(LedgerError::MinterExists(address.to_string()));
        }
        if max_mint_amount == 0 {
            return Err(LedgerError::InvalidAmount("lifetime cap must be positive".into()));
        }
        if daily_limit == 0 {
            return Err(LedgerError::InvalidAmount("daily limit must be positive".into()));
        }

        let row = allocator.get(category)?;
        let promised = safemath::add(row.current_allocation, self.outstanding_commitment(category))?;
        let with_new = safemath::add(promised, max_mint_amount)?;
        if with_new > row.max_total_allocation {
            return Err(LedgerError::SupplyExceeded {
                cap: CapKind::Category,
                requested: max_mint_amount,
                available: row.max_total_allocation.saturating_sub(promised),
            });
        }

        let expires_at = if expires_at == 0 && row.auto_expire_days > 0 {
            safemath::add(now, safemath::mul(row.auto_expire_days, MS_PER_DAY)?)?
        } else {
            expires_at
        };

        let minter = Minter {
            address,
            category,
            max_mint_amount,
            minted_amount: 0,
            daily_limit,
            daily_minted: 0,
            last_mint_day: day_number(now),
            is_active: true,
            authorized_at: now,
            expires_at,
            purpose: purpose.into(),
        };

        tracing::info!(
            minter = %address,
            %category,
            max_mint_amount,
            daily_limit,
            expires_at,
            "minter authorized"
        );

        Ok(self.minters.entry(address).or_insert(minter))
    }

    /// Revoke a minter (soft-delete). A second revoke is a no-op.
    pub fn revoke(&mut self, address: &Address) -> LedgerResult<()> {
        let minter = self
            .minters
            .get_mut(address)
            .ok_or_else(|| LedgerError::NotAuthorized(format!("unknown minter {}", address)))?;
        if minter.is_active {
            minter.is_active = false;
            tracing::info!(minter = %address, "minter revoked");
        }
        Ok(())
    }

    /// Validate a mint against the minter's lifetime and daily caps.
    ///
    /// The only mutation a failing call may make is the lazy-expiry
    /// deactivation; counters are untouched until `commit_mint`.
    pub fn prepare_mint(
        &mut self,
        address: &Address,
        amount: u64,
        now: Timestamp,
    ) -> LedgerResult<MintCharge> {
        let minter = self
            .minters
            .get_mut(address)
            .ok_or_else(|| LedgerError::NotAuthorized(format!("unknown minter {}", address)))?;

        if !minter.is_active {
            return Err(LedgerError::NotAuthorized(format!("minter {} is inactive", address)));
        }

        if minter.expires_at != 0 && now > minter.expires_at {
            minter.is_active = false;
            tracing::warn!(
                minter = %address,
                expires_at = minter.expires_at,
                now,
                "minter authorization expired, deactivating"
            );
            return Err(LedgerError::NotAuthorized(format!(
                "minter {} authorization expired",
                address
            )));
        }

        let minted_amount = safemath::add(minter.minted_amount, amount)?;
        if minted_amount > minter.max_mint_amount {
            return Err(LedgerError::SupplyExceeded {
                cap: CapKind::MinterLifetime,
                requested: amount,
                available: minter.remaining_lifetime(),
            });
        }

        // Logical reset: a later day starts the counter from zero. Applied
        // exactly once here; the stored day only advances at commit.
        let current_day = day_number(now);
        let daily_effective = if current_day > minter.last_mint_day {
            0
        } else {
            minter.daily_minted
        };
        let daily_minted = safemath::add(daily_effective, amount)?;
        if daily_minted > minter.daily_limit {
            return Err(LedgerError::SupplyExceeded {
                cap: CapKind::MinterDaily,
                requested: amount,
                available: minter.daily_limit - daily_effective,
            });
        }

        Ok(MintCharge {
            category: minter.category,
            minted_amount,
            daily_minted,
            day: current_day.max(minter.last_mint_day),
        })
    }

    /// Apply a previously prepared mint. Infallible after `prepare_mint`.
    pub fn commit_mint(&mut self, address: &Address, charge: &MintCharge) {
        let minter = self
            .minters
            .get_mut(address)
            .expect("commit_mint on unprepared minter");
        minter.minted_amount = charge.minted_amount;
        minter.daily_minted = charge.daily_minted;
        minter.last_mint_day = charge.day;
        debug_assert!(minter.minted_amount <= minter.max_mint_amount);
        debug_assert!(minter.daily_minted <= minter.daily_limit);
    }

    /// Unminted headroom promised to active minters of a category
    pub fn outstanding_commitment(&self, category: CategoryKind) -> u64 {
        self.minters
            .values()
            .filter(|m| m.category == category && m.is_active)
            .map(Minter::remaining_lifetime)
            .sum()
    }

    pub fn get(&self, address: &Address) -> Option<&Minter> {
        self.minters.get(address)
    }

    /// Iterate all records, active or not
    pub fn minters(&self) -> impl Iterator<Item = &Minter> {
        self.minters.values()
    }

    pub fn len(&self) -> usize {
        self.minters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minters.is_empty()
    }

    /// Count of records still reporting active
    pub fn active_count(&self) -> usize {
        self.minters.values().filter(|m| m.is_active).count()
    }
}
