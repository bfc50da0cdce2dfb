// issuance/src/lib.rs

//! Supply-capped, rate-limited issuance ledger
//!
//! A capped pool of fungible units issued by many independently throttled
//! minters:
//! - `SupplyLedger`: total/circulating/burned supply against a hard cap
//! - `CategoryAllocator`: per-category allocation ceilings
//! - `MinterRegistry`: per-minter lifetime caps, daily limits, lazy expiry
//! - `PricingEngine` types: volume-discount quoting and payment conversion
//! - `IssuanceService`: atomic orchestration of the above, emitting receipts
//!
//! Every mutating operation takes `now` (milliseconds since epoch) from the
//! caller, so each call is a pure transition of `(state, request, now)`.

pub mod category;
pub mod minter;
pub mod pricing;
pub mod receipt;
pub mod service;
pub mod supply;

pub use category::{Category, CategoryAllocator, CategoryKind};
pub use minter::{Minter, MinterRegistry};
pub use pricing::{quote, tokens_for_payment, PriceSchedule, Quote};
pub use receipt::{
    BatchMintReceipt, BurnReceipt, MintReceipt, PurchaseReceipt, Receipt, ReceiptId,
};
pub use service::{IssuanceConfig, IssuanceService, IssuanceStats, PurchaseOutcome};
pub use supply::SupplyLedger;

use ledger_core::MathError;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Which ceiling rejected a mint
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CapKind {
    /// The ledger-wide maximum supply
    MaxSupply,
    /// A category's total allocation ceiling
    Category,
    /// A minter's lifetime cap
    MinterLifetime,
    /// A minter's rolling daily limit
    MinterDaily,
}

/// Errors that can occur in ledger operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("arithmetic error: {0}")]
    Math(#[from] MathError),

    #[error("supply exceeded ({cap:?}): requested {requested}, available {available}")]
    SupplyExceeded {
        cap: CapKind,
        requested: u64,
        available: u64,
    },

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("minter already exists: {0}")]
    MinterExists(String),

    #[error("unknown category or schedule: {0}")]
    TokenNotFound(String),

    #[error("insufficient balance: requested {requested}, circulating {circulating}")]
    InsufficientBalance { requested: u64, circulating: u64 },

    #[error("feature not enabled: {0}")]
    FeatureNotEnabled(String),

    #[error("batch too large: {size} recipients, limit {max}")]
    BatchTooLarge { size: usize, max: usize },
}
