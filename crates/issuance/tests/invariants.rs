// issuance/tests/invariants.rs

//! Property tests for the accounting invariants: the supply identity and
//! category conservation must hold after any sequence of operations, and a
//! rejected operation must change nothing.

use issuance::{
    Category, CategoryKind, IssuanceConfig, IssuanceService, PriceSchedule, SupplyLedger,
};
use ledger_core::{Address, MS_PER_DAY};
use proptest::prelude::*;

fn addr(tag: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = tag;
    Address::new(bytes)
}

#[derive(Debug, Clone)]
enum SupplyOp {
    Mint(u64),
    Burn(u64),
}

fn supply_op() -> impl Strategy<Value = SupplyOp> {
    prop_oneof![
        (0u64..2_000).prop_map(SupplyOp::Mint),
        (0u64..2_000).prop_map(SupplyOp::Burn),
    ]
}

proptest! {
    #[test]
    fn supply_identity_holds_under_any_sequence(ops in prop::collection::vec(supply_op(), 1..200)) {
        let mut ledger = SupplyLedger::new(50_000).unwrap();

        for op in ops {
            // Failures are expected; they must leave the identity intact
            let before = (ledger.total_supply(), ledger.circulating_supply(), ledger.burned_supply());
            let result = match op {
                SupplyOp::Mint(amount) => ledger.mint(amount),
                SupplyOp::Burn(amount) => ledger.burn(amount),
            };
            if result.is_err() {
                prop_assert_eq!(
                    before,
                    (ledger.total_supply(), ledger.circulating_supply(), ledger.burned_supply())
                );
            }
            prop_assert!(ledger.total_supply() <= ledger.max_supply());
            prop_assert_eq!(
                ledger.circulating_supply(),
                ledger.total_supply() - ledger.burned_supply()
            );
        }
    }

    #[test]
    fn category_conservation_under_random_mints(
        caps in prop::collection::vec((1u64..500, 1u64..500), 1..8),
        mints in prop::collection::vec((0usize..8, 1u64..100, 0u64..40), 0..100),
    ) {
        let ceiling = 1_000;
        let mut service = IssuanceService::new(IssuanceConfig {
            max_supply: 1_000_000,
            max_batch_size: 10,
            categories: vec![Category::new(CategoryKind::Loyalty, "loyalty", ceiling, false, 0)],
        }).unwrap();

        // Authorizations past the promised capacity are rejected up front
        let mut minters = Vec::new();
        for (i, (cap, daily)) in caps.iter().enumerate() {
            let address = addr(i as u8 + 1);
            if service
                .authorize_minter(address, CategoryKind::Loyalty, *cap, *daily, 0, "prop", 0)
                .is_ok()
            {
                minters.push(address);
            }
        }

        let promised: u64 = minters
            .iter()
            .map(|a| service.minters().get(a).unwrap().max_mint_amount)
            .sum();
        prop_assert!(promised <= ceiling);

        for (pick, amount, day) in mints {
            if minters.is_empty() {
                break;
            }
            let minter = minters[pick % minters.len()];
            // Outcome varies with caps and rollover; conservation must not
            let _ = service.mint(&minter, addr(200), amount, day * MS_PER_DAY);

            let minted_total: u64 = service
                .minters()
                .minters()
                .map(|m| m.minted_amount)
                .sum();
            let row = service.categories().get(CategoryKind::Loyalty).unwrap();
            prop_assert_eq!(row.current_allocation, minted_total);
            prop_assert!(row.current_allocation <= row.max_total_allocation);

            for m in service.minters().minters() {
                prop_assert!(m.minted_amount <= m.max_mint_amount);
                prop_assert!(m.daily_minted <= m.daily_limit);
            }
        }
    }

    #[test]
    fn purchases_never_exceed_max_supply(
        payments in prop::collection::vec(1u64..5_000, 1..50),
        unit_price in 1u64..50,
    ) {
        let mut service = IssuanceService::new(IssuanceConfig {
            max_supply: 20_000,
            max_batch_size: 10,
            categories: vec![],
        }).unwrap();
        let schedule = PriceSchedule::new(unit_price, false, 0, 0).unwrap();

        for payment in payments {
            let before = service.supply().total_supply();
            match service.purchase(addr(1), payment, &schedule, 0) {
                Ok(outcome) => {
                    // Units plus change always account for the full payment
                    prop_assert!(outcome.receipt.quote.final_cost + outcome.change == payment);
                    prop_assert_eq!(service.supply().total_supply(), before + outcome.units);
                }
                Err(_) => prop_assert_eq!(service.supply().total_supply(), before),
            }
            prop_assert!(service.supply().total_supply() <= service.supply().max_supply());
        }
    }
}
