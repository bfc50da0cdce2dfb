// issuance/src/category.rs

use crate::{CapKind, LedgerError, LedgerResult};
use ledger_core::safemath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of issuer categories.
///
/// Categories are a fixed vocabulary, not open-ended ids, so every dispatch
/// over them is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    /// Merchant-issued business tokens
    Business,
    /// Platform-operated native token issuance
    Platform,
    /// Loyalty point programs
    Loyalty,
    /// Event ticket issuance
    Ticketing,
    /// Festival token campaigns
    Festival,
}

impl CategoryKind {
    /// All categories, in registration order
    pub const ALL: [CategoryKind; 5] = [
        CategoryKind::Business,
        CategoryKind::Platform,
        CategoryKind::Loyalty,
        CategoryKind::Ticketing,
        CategoryKind::Festival,
    ];
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CategoryKind::Business => "business",
            CategoryKind::Platform => "platform",
            CategoryKind::Loyalty => "loyalty",
            CategoryKind::Ticketing => "ticketing",
            CategoryKind::Festival => "festival",
        };
        write!(f, "{}", name)
    }
}

/// Allocation ceiling and policy for one issuer category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Which category this row describes
    pub kind: CategoryKind,
    /// Human-readable name
    pub name: String,
    /// Ceiling on units minted through this category
    pub max_total_allocation: u64,
    /// Units minted through this category so far
    pub current_allocation: u64,
    /// Whether the external authority layer requires manual approval before
    /// authorizing minters here (advisory; not enforced by the core)
    pub requires_approval: bool,
    /// Default authorization lifetime in days, 0 = never expires
    pub auto_expire_days: u64,
}

impl Category {
    pub fn new(
        kind: CategoryKind,
        name: impl Into<String>,
        max_total_allocation: u64,
        requires_approval: bool,
        auto_expire_days: u64,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            max_total_allocation,
            current_allocation: 0,
            requires_approval,
            auto_expire_days,
        }
    }

    /// Ceiling headroom still unallocated
    pub fn remaining_allocation(&self) -> u64 {
        self.max_total_allocation - self.current_allocation
    }
}

/// Tracks cumulative allocation per issuer category against each ceiling.
///
/// The sum of all category ceilings may exceed the ledger's hard cap; the
/// supply ledger enforces its own limit independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAllocator {
    categories: BTreeMap<CategoryKind, Category>,
}

impl CategoryAllocator {
    /// Create an allocator over a fixed set of categories
    pub fn new(categories: Vec<Category>) -> Self {
        let categories = categories.into_iter().map(|c| (c.kind, c)).collect();
        Self { categories }
    }

    pub fn get(&self, kind: CategoryKind) -> LedgerResult<&Category> {
        self.categories
            .get(&kind)
            .ok_or_else(|| LedgerError::TokenNotFound(kind.to_string()))
    }

    /// Validate a reservation without mutating
    pub fn check_reserve(&self, kind: CategoryKind, amount: u64) -> LedgerResult<()> {
        let category = self.get(kind)?;
        let new_allocation = safemath::add(category.current_allocation, amount)?;
        if new_allocation > category.max_total_allocation {
            return Err(LedgerError::SupplyExceeded {
                cap: CapKind::Category,
                requested: amount,
                available: category.remaining_allocation(),
            });
        }
        Ok(())
    }

    /// Apply a previously validated reservation. Infallible after
    /// `check_reserve`; the caller guarantees the category exists.
    pub fn commit_reserve(&mut self, kind: CategoryKind, amount: u64) {
        let category = self
            .categories
            .get_mut(&kind)
            .expect("commit_reserve on unchecked category");
        category.current_allocation += amount;
        debug_assert!(category.current_allocation <= category.max_total_allocation);
    }

    /// Validate-and-commit reservation in one call
    pub fn reserve(&mut self, kind: CategoryKind, amount: u64) -> LedgerResult<()> {
        self.check_reserve(kind, amount)?;
        self.commit_reserve(kind, amount);
        Ok(())
    }

    /// Iterate all registered categories
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }
}
