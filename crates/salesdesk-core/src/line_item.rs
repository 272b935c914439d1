//! # Line Items
//!
//! A single priced entry within a sales document.
//!
//! ## Two Discount Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request path (LineItem::from_input)                                    │
//! │    gross  = quantity × rate                                             │
//! │    amount = gross × (1 − discountPercent / 100)                         │
//! │                                                                         │
//! │  Flat-discount path (LineItem::with_flat_discount)                      │
//! │    gross          = quantity × rate                                     │
//! │    discountAmount = gross × discount / 100                              │
//! │    amount         = gross − discountAmount                              │
//! │                                                                         │
//! │  taxPercent / taxAmount ride along untouched. They are NOT part of     │
//! │  `amount` and NOT part of the document total.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The item columns (`item_name`, `unit`, ...) are a snapshot taken when the
//! document was written. `item_id` points at the catalog by value only and is
//! never checked against it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::{percent_of, round_money, round_percent};

/// Line item as sent by a caller on create/update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemInput {
    /// Catalog item reference (not validated).
    pub item_id: Option<String>,
    pub item_name: Option<String>,
    pub item_description: Option<String>,
    pub unit: Option<String>,
    pub item_details: Option<String>,

    #[ts(as = "Option<String>")]
    pub quantity: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub rate: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub discount_percent: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub discount_amount: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub tax_percent: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub tax_amount: Option<Decimal>,

    /// Explicit position. Falls back to the index in the request list.
    pub sort_order: Option<i32>,
}

/// A line item owned by exactly one sales document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Row id (UUID v4).
    pub id: String,

    pub item_id: Option<String>,
    pub item_name: Option<String>,
    pub item_description: Option<String>,
    pub unit: Option<String>,
    pub item_details: Option<String>,

    #[ts(as = "Option<String>")]
    pub quantity: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub rate: Option<Decimal>,

    /// Legacy flat discount, in percent.
    #[ts(as = "Option<String>")]
    pub discount: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub discount_percent: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub discount_amount: Option<Decimal>,

    /// Derived. `None` while quantity or rate is missing.
    #[ts(as = "Option<String>")]
    pub amount: Option<Decimal>,

    #[ts(as = "Option<String>")]
    pub tax_percent: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub tax_amount: Option<Decimal>,

    pub sort_order: i32,
}

impl LineItem {
    fn blank(sort_order: i32) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            item_id: None,
            item_name: None,
            item_description: None,
            unit: None,
            item_details: None,
            quantity: None,
            rate: None,
            discount: None,
            discount_percent: None,
            discount_amount: None,
            amount: None,
            tax_percent: None,
            tax_amount: None,
            sort_order,
        }
    }

    /// Builds a line item from a request entry and computes its amount.
    ///
    /// `position` is used as the sort order when the input carries none.
    pub fn from_input(input: &LineItemInput, position: usize) -> Self {
        let sort_order = input
            .sort_order
            .unwrap_or_else(|| i32::try_from(position).unwrap_or(i32::MAX));

        let mut item = LineItem {
            item_id: input.item_id.clone(),
            item_name: input.item_name.clone(),
            item_description: input.item_description.clone(),
            unit: input.unit.clone(),
            item_details: input.item_details.clone(),
            quantity: input.quantity,
            rate: input.rate,
            discount_percent: input.discount_percent.map(round_percent),
            discount_amount: input.discount_amount.map(round_money),
            tax_percent: input.tax_percent.map(round_percent),
            tax_amount: input.tax_amount.map(round_money),
            ..LineItem::blank(sort_order)
        };
        item.calculate_amount();
        item
    }

    /// Simple constructor using the legacy flat `discount` percent.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use salesdesk_core::LineItem;
    ///
    /// let item = LineItem::with_flat_discount(
    ///     "Widget",
    ///     Decimal::from(4),
    ///     Decimal::from(25),
    ///     Some(Decimal::from(10)),
    /// );
    /// assert_eq!(item.discount_amount, Some(Decimal::from(10)));
    /// assert_eq!(item.amount, Some(Decimal::from(90)));
    /// ```
    pub fn with_flat_discount(
        name: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
        discount: Option<Decimal>,
    ) -> Self {
        let mut item = LineItem {
            item_name: Some(name.into()),
            quantity: Some(quantity),
            rate: Some(rate),
            discount: discount.map(round_percent),
            ..LineItem::blank(0)
        };
        item.calculate_amount();
        item
    }

    /// `quantity × rate`, or `None` if either is missing.
    pub fn gross_amount(&self) -> Option<Decimal> {
        Some(self.quantity? * self.rate?)
    }

    /// Recomputes `amount` from quantity, rate and whichever discount is set.
    ///
    /// A percent discount takes precedence over the legacy flat discount.
    /// Leaves `amount` untouched when quantity or rate is missing.
    pub fn calculate_amount(&mut self) {
        let Some(gross) = self.gross_amount() else {
            return;
        };

        if let Some(percent) = self.discount_percent {
            let factor = Decimal::ONE - round_percent(percent) / Decimal::ONE_HUNDRED;
            self.amount = Some(round_money(gross * factor));
        } else if let Some(flat) = self.discount {
            let discount_amount = percent_of(gross, flat);
            self.discount_amount = Some(discount_amount);
            self.amount = Some(round_money(gross) - discount_amount);
        } else {
            self.amount = Some(round_money(gross));
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(qty: Decimal, rate: Decimal, pct: Option<Decimal>) -> LineItemInput {
        LineItemInput {
            quantity: Some(qty),
            rate: Some(rate),
            discount_percent: pct,
            ..LineItemInput::default()
        }
    }

    #[test]
    fn test_percent_discount_path() {
        let item = LineItem::from_input(&input(dec!(2), dec!(100), Some(dec!(10))), 0);
        assert_eq!(item.amount, Some(dec!(180.00)));

        let item = LineItem::from_input(&input(dec!(1), dec!(50), Some(Decimal::ZERO)), 1);
        assert_eq!(item.amount, Some(dec!(50.00)));
        assert_eq!(item.sort_order, 1);
    }

    #[test]
    fn test_no_discount_is_gross() {
        let item = LineItem::from_input(&input(dec!(3), dec!(12.5), None), 0);
        assert_eq!(item.amount, Some(dec!(37.5)));
    }

    #[test]
    fn test_missing_quantity_leaves_amount_empty() {
        let item = LineItem::from_input(
            &LineItemInput {
                rate: Some(dec!(10)),
                ..LineItemInput::default()
            },
            0,
        );
        assert_eq!(item.amount, None);
        assert_eq!(item.gross_amount(), None);
    }

    #[test]
    fn test_flat_discount_path() {
        let item = LineItem::with_flat_discount("Widget", dec!(3), dec!(33.33), Some(dec!(5)));
        // gross 99.99, 5% = 4.9995
        assert_eq!(item.discount_amount, Some(dec!(4.9995)));
        assert_eq!(item.amount, Some(dec!(94.9905)));
    }

    #[test]
    fn test_tax_is_not_folded_into_amount() {
        let mut entry = input(dec!(1), dec!(100), None);
        entry.tax_percent = Some(dec!(18));
        entry.tax_amount = Some(dec!(18));

        let item = LineItem::from_input(&entry, 0);
        assert_eq!(item.amount, Some(dec!(100)));
        assert_eq!(item.tax_percent, Some(dec!(18)));
        assert_eq!(item.tax_amount, Some(dec!(18)));
    }

    #[test]
    fn test_recalculation_does_not_drift() {
        let mut item = LineItem::from_input(&input(dec!(7), dec!(1.1111), Some(dec!(33.33))), 0);
        let first = item.amount;
        for _ in 0..50 {
            item.calculate_amount();
        }
        assert_eq!(item.amount, first);
    }

    #[test]
    fn test_explicit_sort_order_wins() {
        let mut entry = input(dec!(1), dec!(1), None);
        entry.sort_order = Some(9);
        assert_eq!(LineItem::from_input(&entry, 2).sort_order, 9);
    }

    #[test]
    fn test_serializes_money_as_string() {
        let item = LineItem::from_input(&input(dec!(2), dec!(100), Some(dec!(10))), 0);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json["amount"].is_string());
        assert_eq!(json["sortOrder"], 0);
    }
}
