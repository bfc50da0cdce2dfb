// issuance/src/receipt.rs

use crate::category::CategoryKind;
use crate::pricing::Quote;
use ledger_core::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Correlation id size in bytes
pub const RECEIPT_ID_SIZE: usize = 32;

/// SHA-256 correlation id for a completed operation.
///
/// Unique per request (a per-ledger sequence number is folded in), so callers
/// can use it as an idempotency key for off-chain reconciliation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptId([u8; RECEIPT_ID_SIZE]);

impl ReceiptId {
    pub fn as_bytes(&self) -> &[u8; RECEIPT_ID_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn digest(tag: &str, sequence: u64, timestamp: Timestamp, fields: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        hasher.update(sequence.to_le_bytes());
        hasher.update(timestamp.to_le_bytes());
        for field in fields {
            hasher.update(field);
        }
        Self(hasher.finalize().into())
    }
}

impl fmt::Debug for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReceiptId({}...{})",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[28..])
        )
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// One recipient's share of a batch mint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub recipient: Address,
    pub amount: u64,
}

/// Record of a single authorized mint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintReceipt {
    pub id: ReceiptId,
    pub minter: Address,
    pub recipient: Address,
    pub amount: u64,
    pub category: CategoryKind,
    pub timestamp: Timestamp,
}

impl MintReceipt {
    pub(crate) fn new(
        sequence: u64,
        minter: Address,
        recipient: Address,
        amount: u64,
        category: CategoryKind,
        timestamp: Timestamp,
    ) -> Self {
        let id = ReceiptId::digest(
            "mint",
            sequence,
            timestamp,
            &[
                minter.as_bytes(),
                recipient.as_bytes(),
                &amount.to_le_bytes(),
            ],
        );
        Self {
            id,
            minter,
            recipient,
            amount,
            category,
            timestamp,
        }
    }
}

/// Record of an all-or-nothing batch mint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMintReceipt {
    pub id: ReceiptId,
    /// Caller-supplied correlation id for the batch
    pub batch_id: String,
    pub minter: Address,
    pub entries: Vec<BatchEntry>,
    /// Aggregate charged against the minter, category, and supply
    pub total: u64,
    pub category: CategoryKind,
    pub timestamp: Timestamp,
}

impl BatchMintReceipt {
    pub(crate) fn new(
        sequence: u64,
        batch_id: String,
        minter: Address,
        entries: Vec<BatchEntry>,
        total: u64,
        category: CategoryKind,
        timestamp: Timestamp,
    ) -> Self {
        let id = ReceiptId::digest(
            "batch_mint",
            sequence,
            timestamp,
            &[
                batch_id.as_bytes(),
                minter.as_bytes(),
                &total.to_le_bytes(),
            ],
        );
        Self {
            id,
            batch_id,
            minter,
            entries,
            total,
            category,
            timestamp,
        }
    }
}

/// Record of a public purchase, carrying the price terms in force at the
/// time of the transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub id: ReceiptId,
    pub buyer: Address,
    /// Payment handed over by the buyer
    pub payment_amount: u64,
    /// Units issued
    pub units: u64,
    /// Unit price at transaction time
    pub unit_price: u64,
    /// Cost breakdown at transaction time
    pub quote: Quote,
    /// Unspent payment owed back to the buyer
    pub change: u64,
    pub timestamp: Timestamp,
}

impl PurchaseReceipt {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        sequence: u64,
        buyer: Address,
        payment_amount: u64,
        units: u64,
        unit_price: u64,
        quote: Quote,
        change: u64,
        timestamp: Timestamp,
    ) -> Self {
        let id = ReceiptId::digest(
            "purchase",
            sequence,
            timestamp,
            &[
                buyer.as_bytes(),
                &payment_amount.to_le_bytes(),
                &units.to_le_bytes(),
            ],
        );
        Self {
            id,
            buyer,
            payment_amount,
            units,
            unit_price,
            quote,
            change,
            timestamp,
        }
    }
}

/// Record of a burn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnReceipt {
    pub id: ReceiptId,
    pub holder: Address,
    pub amount: u64,
    pub reason: String,
    pub timestamp: Timestamp,
}

impl BurnReceipt {
    pub(crate) fn new(
        sequence: u64,
        holder: Address,
        amount: u64,
        reason: String,
        timestamp: Timestamp,
    ) -> Self {
        let id = ReceiptId::digest(
            "burn",
            sequence,
            timestamp,
            &[holder.as_bytes(), &amount.to_le_bytes(), reason.as_bytes()],
        );
        Self {
            id,
            holder,
            amount,
            reason,
            timestamp,
        }
    }
}

/// Any completed operation, as appended to the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Receipt {
    Mint(MintReceipt),
    BatchMint(BatchMintReceipt),
    Purchase(PurchaseReceipt),
    Burn(BurnReceipt),
}

impl Receipt {
    pub fn id(&self) -> &ReceiptId {
        match self {
            Receipt::Mint(r) => &r.id,
            Receipt::BatchMint(r) => &r.id,
            Receipt::Purchase(r) => &r.id,
            Receipt::Burn(r) => &r.id,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Receipt::Mint(r) => r.timestamp,
            Receipt::BatchMint(r) => r.timestamp,
            Receipt::Purchase(r) => r.timestamp,
            Receipt::Burn(r) => r.timestamp,
        }
    }

    /// Timestamp rendered as UTC, for logs and exports
    pub fn timestamp_utc(&self) -> String {
        match chrono::DateTime::from_timestamp_millis(self.timestamp() as i64) {
            Some(dt) => dt.to_rfc3339(),
            None => format!("{}ms", self.timestamp()),
        }
    }
}
