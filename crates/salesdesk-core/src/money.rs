//! # Money Module
//!
//! Scale and rounding rules for monetary values and percentages.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Documents are recomputed on every save. With floats, a total that     │
//! │  is re-derived N times can drift by N ulps.                             │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    money    → 4 fractional digits  (180.0000)                           │
//! │    percents → 2 fractional digits  (12.50)                              │
//! │    recompute(recompute(x)) == recompute(x)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use salesdesk_core::money::{percent_of, round_money};
//!
//! let gross = Decimal::from(200);
//! assert_eq!(percent_of(gross, Decimal::from(10)), Decimal::from(20));
//! assert_eq!(round_money(Decimal::new(123456789, 6)).to_string(), "123.4568");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept for monetary amounts.
pub const MONEY_SCALE: u32 = 4;

/// Fractional digits kept for percentages.
pub const PERCENT_SCALE: u32 = 2;

/// Largest magnitude accepted for a single quantity, rate or amount
/// (one trillion).
///
/// A product of two such values, summed over [`MAX_LINE_ITEMS`] lines, stays
/// well inside `Decimal`'s 96-bit range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Most line items one document may carry.
pub const MAX_LINE_ITEMS: usize = 1_000;

/// Rounds a monetary amount to [`MONEY_SCALE`] digits, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage to [`PERCENT_SCALE`] digits, half away from zero.
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * percent / 100`, rounded to money scale.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    round_money(amount * round_percent(percent) / Decimal::ONE_HUNDRED)
}

/// Treats a missing amount as zero.
#[inline]
pub fn or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

// =============================================================================
// Unit Tests
// =============================================================================
