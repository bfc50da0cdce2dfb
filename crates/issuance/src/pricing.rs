// issuance/src/pricing.rs

use crate::{LedgerError, LedgerResult};
use ledger_core::safemath;
use serde::{Deserialize, Serialize};

/// Basis points denominator
const BPS_DENOMINATOR: u64 = 10_000;

/// Price terms for one issued token type.
///
/// `unit_price` is payment-currency units per issued unit, fixed-point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSchedule {
    /// Payment units per issued unit
    pub unit_price: u64,
    /// Whether the authority may change `unit_price` later
    pub price_adjustable: bool,
    /// Minimum purchase size for the volume discount, 0 = no discount
    pub discount_threshold: u64,
    /// Discount in basis points (0-10000)
    pub discount_bps: u64,
}

impl PriceSchedule {
    pub fn new(
        unit_price: u64,
        price_adjustable: bool,
        discount_threshold: u64,
        discount_bps: u64,
    ) -> LedgerResult<Self> {
        if unit_price == 0 {
            return Err(LedgerError::InvalidAmount("unit price must be positive".into()));
        }
        if discount_bps > BPS_DENOMINATOR {
            return Err(LedgerError::InvalidAmount(format!(
                "discount {} bps exceeds {}",
                discount_bps, BPS_DENOMINATOR
            )));
        }
        Ok(Self {
            unit_price,
            price_adjustable,
            discount_threshold,
            discount_bps,
        })
    }

    /// A fixed, never-discounted price
    pub fn fixed(unit_price: u64) -> LedgerResult<Self> {
        Self::new(unit_price, false, 0, 0)
    }

    /// Change the unit price. Only allowed when the schedule is adjustable.
    pub fn set_unit_price(&mut self, new_price: u64) -> LedgerResult<()> {
        if !self.price_adjustable {
            return Err(LedgerError::FeatureNotEnabled(
                "price adjustment disabled for this schedule".into(),
            ));
        }
        if new_price == 0 {
            return Err(LedgerError::InvalidAmount("unit price must be positive".into()));
        }
        tracing::info!(old_price = self.unit_price, new_price, "unit price changed");
        self.unit_price = new_price;
        Ok(())
    }
}

/// Cost breakdown for a purchase of some amount of units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Cost after discount
    pub final_cost: u64,
    /// Cost before discount
    pub original_cost: u64,
    /// Discount taken off `original_cost`
    pub discount: u64,
}

/// Price `amount` units under a schedule. Pure function.
///
/// At or above the threshold the discount applies to the entire amount, not
/// just the excess (volume discount, not marginal discount).
pub fn quote(amount: u64, schedule: &PriceSchedule) -> LedgerResult<Quote> {
    let original_cost = safemath::mul(amount, schedule.unit_price)?;
    let discount = if schedule.discount_threshold > 0 && amount >= schedule.discount_threshold {
        safemath::div(
            safemath::mul(original_cost, schedule.discount_bps)?,
            BPS_DENOMINATOR,
        )?
    } else {
        0
    };
    let final_cost = safemath::sub(original_cost, discount)?;
    Ok(Quote {
        final_cost,
        original_cost,
        discount,
    })
}

/// Units purchasable with `payment_amount`, by floor division.
///
/// The fractional remainder is not refunded here; the issuance service
/// reports it back to the caller as change.
pub fn tokens_for_payment(payment_amount: u64, schedule: &PriceSchedule) -> LedgerResult<u64> {
    let units = safemath::div(payment_amount, schedule.unit_price)?;
    Ok(units)
}
