// issuance/src/service.rs

use crate::category::{Category, CategoryAllocator, CategoryKind};
use crate::minter::MinterRegistry;
use crate::pricing::{quote, tokens_for_payment, PriceSchedule};
use crate::receipt::{
    BatchEntry, BatchMintReceipt, BurnReceipt, MintReceipt, PurchaseReceipt, Receipt, ReceiptId,
};
use crate::supply::SupplyLedger;
use crate::{LedgerError, LedgerResult};
use ledger_core::{safemath, Address, Timestamp};
use serde::{Deserialize, Serialize};

/// Issuance service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceConfig {
    /// Hard cap on units ever issued
    pub max_supply: u64,
    /// Maximum recipients in one batch mint
    pub max_batch_size: usize,
    /// Fixed set of issuer categories
    pub categories: Vec<Category>,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            max_supply: 1_000_000_000,
            max_batch_size: 1000,
            categories: vec![
                Category::new(CategoryKind::Business, "Business tokens", 400_000_000, true, 0),
                Category::new(CategoryKind::Platform, "Platform issuance", 300_000_000, false, 0),
                Category::new(CategoryKind::Loyalty, "Loyalty points", 200_000_000, true, 0),
                Category::new(CategoryKind::Ticketing, "Event tickets", 100_000_000, true, 90),
                Category::new(CategoryKind::Festival, "Festival tokens", 50_000_000, false, 30),
            ],
        }
    }
}

/// Result of a public purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    /// Units issued to the buyer
    pub units: u64,
    /// Unspent payment owed back to the buyer
    pub change: u64,
    pub receipt: PurchaseReceipt,
}

/// Per-category usage in a stats snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUsage {
    pub kind: CategoryKind,
    pub max_total_allocation: u64,
    pub current_allocation: u64,
}

/// Consistent read-only snapshot of ledger state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceStats {
    pub max_supply: u64,
    pub total_supply: u64,
    pub circulating_supply: u64,
    pub burned_supply: u64,
    pub remaining_mintable: u64,
    pub categories: Vec<CategoryUsage>,
    pub minter_count: usize,
    pub active_minters: usize,
    pub receipt_count: usize,
}

/// Orchestrates mint / batch-mint / purchase / burn against the supply
/// ledger, category allocator, and minter registry.
///
/// The service owns all mutable state; `&mut self` on every mutating
/// operation is the serialization point, so requests commit strictly one at
/// a time. Each request validates completely before its first counter
/// mutation (commits are infallible), so a failure at any step leaves the
/// ledger, the minter record, and the category exactly as they were.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceService {
    supply: SupplyLedger,
    categories: CategoryAllocator,
    minters: MinterRegistry,
    /// Append-only audit log
    receipts: Vec<Receipt>,
    /// Folded into every receipt id
    sequence: u64,
    max_batch_size: usize,
}

impl IssuanceService {
    pub fn new(config: IssuanceConfig) -> LedgerResult<Self> {
        Ok(Self {
            supply: SupplyLedger::new(config.max_supply)?,
            categories: CategoryAllocator::new(config.categories),
            minters: MinterRegistry::new(),
            receipts: Vec::new(),
            sequence: 0,
            max_batch_size: config.max_batch_size,
        })
    }

    /// Authorize a new minter. Privileged; the external authority layer
    /// decides who may call this.
    #[allow(clippy::too_many_arguments)]
    pub fn authorize_minter(
        &mut self,
        address: Address,
        category: CategoryKind,
        max_mint_amount: u64,
        daily_limit: u64,
        expires_at: Timestamp,
        purpose: impl Into<String>,
        now: Timestamp,
    ) -> LedgerResult<()> {
        self.minters.authorize(
            &self.categories,
            address,
            category,
            max_mint_amount,
            daily_limit,
            expires_at,
            purpose,
            now,
        )?;
        Ok(())
    }

    /// Revoke a minter. Privileged. No-op when already revoked.
    pub fn revoke_minter(&mut self, address: &Address) -> LedgerResult<()> {
        self.minters.revoke(address)
    }

    /// Mint `amount` units to `recipient` on behalf of an authorized minter
    pub fn mint(
        &mut self,
        minter: &Address,
        recipient: Address,
        amount: u64,
        now: Timestamp,
    ) -> LedgerResult<MintReceipt> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("mint amount must be positive".into()));
        }

        // Validate everything, then commit everything.
        let charge = self.minters.prepare_mint(minter, amount, now)?;
        self.categories.check_reserve(charge.category, amount)?;
        self.supply.check_mint(amount)?;

        self.minters.commit_mint(minter, &charge);
        self.categories.commit_reserve(charge.category, amount);
        self.supply.commit_mint(amount);

        let receipt = MintReceipt::new(
            self.next_sequence(),
            *minter,
            recipient,
            amount,
            charge.category,
            now,
        );
        tracing::info!(
            minter = %minter,
            recipient = %recipient,
            amount,
            category = %charge.category,
            receipt = %receipt.id,
            "mint committed"
        );
        self.receipts.push(Receipt::Mint(receipt.clone()));
        Ok(receipt)
    }

    /// Mint to many recipients as one atomic unit.
    ///
    /// The aggregate total is summed with checked adds before any other
    /// processing and charged once against the minter's lifetime and daily
    /// caps, the category, and the supply; recipients then receive their
    /// individual amounts. Either the whole batch commits or nothing does.
    pub fn batch_mint(
        &mut self,
        minter: &Address,
        recipients: &[Address],
        amounts: &[u64],
        batch_id: &str,
        now: Timestamp,
    ) -> LedgerResult<BatchMintReceipt> {
        if recipients.len() != amounts.len() {
            return Err(LedgerError::InvalidAmount(format!(
                "{} recipients but {} amounts",
                recipients.len(),
                amounts.len()
            )));
        }
        if recipients.is_empty() {
            return Err(LedgerError::InvalidAmount("empty batch".into()));
        }
        if recipients.len() > self.max_batch_size {
            return Err(LedgerError::BatchTooLarge {
                size: recipients.len(),
                max: self.max_batch_size,
            });
        }

        let mut total: u64 = 0;
        for &amount in amounts {
            if amount == 0 {
                return Err(LedgerError::InvalidAmount(
                    "batch amounts must be positive".into(),
                ));
            }
            total = safemath::add(total, amount)?;
        }

        let charge = self.minters.prepare_mint(minter, total, now)?;
        self.categories.check_reserve(charge.category, total)?;
        self.supply.check_mint(total)?;

        self.minters.commit_mint(minter, &charge);
        self.categories.commit_reserve(charge.category, total);
        self.supply.commit_mint(total);

        let entries = recipients
            .iter()
            .zip(amounts)
            .map(|(&recipient, &amount)| BatchEntry { recipient, amount })
            .collect();
        let receipt = BatchMintReceipt::new(
            self.next_sequence(),
            batch_id.to_string(),
            *minter,
            entries,
            total,
            charge.category,
            now,
        );
        tracing::info!(
            minter = %minter,
            batch_id,
            recipients = recipients.len(),
            total,
            receipt = %receipt.id,
            "batch mint committed"
        );
        self.receipts.push(Receipt::BatchMint(receipt.clone()));
        Ok(receipt)
    }

    /// Convert a verified payment into freshly issued units.
    ///
    /// Purchases are a public path bounded only by `max_supply`; they do not
    /// touch the minter registry or any category, and exhausting a minter's
    /// limits never affects them. Change (the floor-division remainder plus
    /// any discount) is reported back; payment custody is the caller's.
    pub fn purchase(
        &mut self,
        buyer: Address,
        payment_amount: u64,
        schedule: &PriceSchedule,
        now: Timestamp,
    ) -> LedgerResult<PurchaseOutcome> {
        let units = tokens_for_payment(payment_amount, schedule)?;
        if units == 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "payment {} buys no units at price {}",
                payment_amount, schedule.unit_price
            )));
        }

        self.supply.check_mint(units)?;
        let quote = quote(units, schedule)?;
        let change = safemath::sub(payment_amount, quote.final_cost)?;

        self.supply.commit_mint(units);

        let receipt = PurchaseReceipt::new(
            self.next_sequence(),
            buyer,
            payment_amount,
            units,
            schedule.unit_price,
            quote,
            change,
            now,
        );
        tracing::info!(
            buyer = %buyer,
            payment_amount,
            units,
            change,
            receipt = %receipt.id,
            "purchase committed"
        );
        self.receipts.push(Receipt::Purchase(receipt.clone()));
        Ok(PurchaseOutcome {
            units,
            change,
            receipt,
        })
    }

    /// Burn circulating units. Requires no authorization record; holders may
    /// always burn their own balance.
    pub fn burn(
        &mut self,
        holder: Address,
        amount: u64,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> LedgerResult<BurnReceipt> {
        self.supply.burn(amount)?;

        let receipt = BurnReceipt::new(self.next_sequence(), holder, amount, reason.into(), now);
        tracing::info!(
            holder = %holder,
            amount,
            receipt = %receipt.id,
            "burn committed"
        );
        self.receipts.push(Receipt::Burn(receipt.clone()));
        Ok(receipt)
    }

    /// Consistent snapshot of all counters
    pub fn stats(&self) -> IssuanceStats {
        IssuanceStats {
            max_supply: self.supply.max_supply(),
            total_supply: self.supply.total_supply(),
            circulating_supply: self.supply.circulating_supply(),
            burned_supply: self.supply.burned_supply(),
            remaining_mintable: self.supply.remaining_mintable(),
            categories: self
                .categories
                .categories()
                .map(|c| CategoryUsage {
                    kind: c.kind,
                    max_total_allocation: c.max_total_allocation,
                    current_allocation: c.current_allocation,
                })
                .collect(),
            minter_count: self.minters.len(),
            active_minters: self.minters.active_count(),
            receipt_count: self.receipts.len(),
        }
    }

    /// Look up a receipt by correlation id
    pub fn receipt(&self, id: &ReceiptId) -> Option<&Receipt> {
        self.receipts.iter().find(|r| r.id() == id)
    }

    /// The full append-only audit log
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    pub fn supply(&self) -> &SupplyLedger {
        &self.supply
    }

    pub fn categories(&self) -> &CategoryAllocator {
        &self.categories
    }

    pub fn minters(&self) -> &MinterRegistry {
        &self.minters
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address(tag: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = tag;
        Address::new(bytes)
    }

    fn small_service() -> IssuanceService {
        IssuanceService::new(IssuanceConfig {
            max_supply: 10_000,
            max_batch_size: 4,
            categories: vec![
                Category::new(CategoryKind::Business, "business", 5_000, false, 0),
                Category::new(CategoryKind::Loyalty, "loyalty", 2_000, false, 0),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_mint_updates_all_counters() {
        let mut service = small_service();
        let minter = test_address(1);
        service
            .authorize_minter(minter, CategoryKind::Business, 1000, 500, 0, "shop", 0)
            .unwrap();

        let receipt = service.mint(&minter, test_address(2), 300, 1000).unwrap();
        assert_eq!(receipt.amount, 300);
        assert_eq!(receipt.category, CategoryKind::Business);

        let stats = service.stats();
        assert_eq!(stats.total_supply, 300);
        assert_eq!(stats.circulating_supply, 300);
        assert_eq!(stats.categories[0].current_allocation, 300);
        assert_eq!(service.minters().get(&minter).unwrap().minted_amount, 300);
        assert_eq!(stats.receipt_count, 1);
    }

    #[test]
    fn test_failed_mint_changes_nothing() {
        let mut service = small_service();
        let minter = test_address(1);
        service
            .authorize_minter(minter, CategoryKind::Business, 1000, 200, 0, "shop", 0)
            .unwrap();

        // Daily limit is 200; this fails at the registry
        assert!(service.mint(&minter, test_address(2), 201, 0).is_err());

        let stats = service.stats();
        assert_eq!(stats.total_supply, 0);
        assert_eq!(stats.categories[0].current_allocation, 0);
        assert_eq!(service.minters().get(&minter).unwrap().minted_amount, 0);
        assert_eq!(stats.receipt_count, 0);
    }

    #[test]
    fn test_batch_mint_charges_aggregate_once() {
        let mut service = small_service();
        let minter = test_address(1);
        service
            .authorize_minter(minter, CategoryKind::Business, 1000, 500, 0, "shop", 0)
            .unwrap();

        let recipients = [test_address(2), test_address(3), test_address(4)];
        let amounts = [100, 150, 50];
        let receipt = service
            .batch_mint(&minter, &recipients, &amounts, "batch-1", 1000)
            .unwrap();

        assert_eq!(receipt.total, 300);
        assert_eq!(receipt.entries.len(), 3);
        assert_eq!(receipt.entries[1].amount, 150);

        let record = service.minters().get(&minter).unwrap();
        assert_eq!(record.minted_amount, 300);
        assert_eq!(record.daily_minted, 300);
    }

    #[test]
    fn test_batch_mint_atomicity() {
        let mut service = small_service();
        let minter = test_address(1);
        service
            .authorize_minter(minter, CategoryKind::Business, 1000, 250, 0, "shop", 0)
            .unwrap();

        // Aggregate 300 exceeds the 250 daily limit: nobody receives anything
        let recipients = [test_address(2), test_address(3)];
        let err = service
            .batch_mint(&minter, &recipients, &[200, 100], "batch-1", 0)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SupplyExceeded { .. }));

        let stats = service.stats();
        assert_eq!(stats.total_supply, 0);
        assert_eq!(service.minters().get(&minter).unwrap().minted_amount, 0);
        assert_eq!(service.minters().get(&minter).unwrap().daily_minted, 0);
    }

    #[test]
    fn test_batch_validation() {
        let mut service = small_service();
        let minter = test_address(1);
        service
            .authorize_minter(minter, CategoryKind::Business, 1000, 500, 0, "shop", 0)
            .unwrap();

        // Length mismatch
        assert!(matches!(
            service.batch_mint(&minter, &[test_address(2)], &[1, 2], "b", 0),
            Err(LedgerError::InvalidAmount(_))
        ));
        // Empty
        assert!(matches!(
            service.batch_mint(&minter, &[], &[], "b", 0),
            Err(LedgerError::InvalidAmount(_))
        ));
        // Zero amount
        assert!(matches!(
            service.batch_mint(&minter, &[test_address(2), test_address(3)], &[5, 0], "b", 0),
            Err(LedgerError::InvalidAmount(_))
        ));
        // Over the batch size policy
        let many: Vec<Address> = (0u8..5).map(test_address).collect();
        assert!(matches!(
            service.batch_mint(&minter, &many, &[1, 1, 1, 1, 1], "b", 0),
            Err(LedgerError::BatchTooLarge { size: 5, max: 4 })
        ));
    }

    #[test]
    fn test_purchase_bypasses_minter_limits() {
        let mut service = small_service();
        let minter = test_address(1);
        service
            .authorize_minter(minter, CategoryKind::Business, 100, 100, 0, "shop", 0)
            .unwrap();

        // Exhaust the minter's daily limit
        service.mint(&minter, test_address(2), 100, 0).unwrap();
        assert!(service.mint(&minter, test_address(2), 1, 0).is_err());

        // The public purchase path is unaffected
        let schedule = PriceSchedule::fixed(10).unwrap();
        let outcome = service
            .purchase(test_address(9), 2_505, &schedule, 0)
            .unwrap();
        assert_eq!(outcome.units, 250);
        assert_eq!(outcome.change, 5); // floor-division remainder
        assert_eq!(service.supply().total_supply(), 350);
    }

    #[test]
    fn test_purchase_change_includes_discount() {
        let mut service = small_service();
        // 10% off from 100 units; unit price 10
        let schedule = PriceSchedule::new(10, false, 100, 1000).unwrap();

        let outcome = service.purchase(test_address(9), 1000, &schedule, 0).unwrap();
        assert_eq!(outcome.units, 100);
        assert_eq!(outcome.receipt.quote.final_cost, 900);
        assert_eq!(outcome.change, 100);
    }

    #[test]
    fn test_purchase_bounded_by_max_supply() {
        let mut service = small_service();
        let schedule = PriceSchedule::fixed(1).unwrap();

        let err = service.purchase(test_address(9), 10_001, &schedule, 0).unwrap_err();
        assert!(matches!(err, LedgerError::SupplyExceeded { .. }));
        assert_eq!(service.supply().total_supply(), 0);

        // Too small a payment buys nothing
        let pricey = PriceSchedule::fixed(100).unwrap();
        assert!(matches!(
            service.purchase(test_address(9), 99, &pricey, 0),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_burn_needs_no_authorization() {
        let mut service = small_service();
        let schedule = PriceSchedule::fixed(1).unwrap();
        service.purchase(test_address(9), 500, &schedule, 0).unwrap();

        let receipt = service.burn(test_address(9), 200, "refund", 10).unwrap();
        assert_eq!(receipt.amount, 200);
        assert_eq!(service.supply().circulating_supply(), 300);
        assert_eq!(service.supply().total_supply(), 500);
    }

    #[test]
    fn test_receipt_lookup_by_id() {
        let mut service = small_service();
        let schedule = PriceSchedule::fixed(1).unwrap();
        let outcome = service.purchase(test_address(9), 100, &schedule, 0).unwrap();

        let found = service.receipt(&outcome.receipt.id).unwrap();
        assert!(matches!(found, Receipt::Purchase(r) if r.units == 100));
    }

    #[test]
    fn test_default_config() {
        let service = IssuanceService::new(IssuanceConfig::default()).unwrap();
        let stats = service.stats();
        assert_eq!(stats.max_supply, 1_000_000_000);
        assert_eq!(stats.categories.len(), 5);
    }
}
