//! # Totals Engine
//!
//! The one routine that turns a document's line items and document-level
//! adjustments into `sub_total`, `total` and `balance_due`.
//!
//! ## Formulas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subTotal = Σ item.amount            (missing amounts count as zero)    │
//! │                                                                         │
//! │  Standard      Quote, SalesOrder, Invoice                               │
//! │    total = subTotal + taxTotal + adjustment − discountTotal             │
//! │                                                                         │
//! │  Reduced       DeliveryChallan                                          │
//! │    total = subTotal + adjustment                                        │
//! │                                                                         │
//! │  WithRoundOff  RecurringInvoice                                         │
//! │    total = subTotal + taxTotal + adjustment + roundOff − discountTotal  │
//! │                                                                         │
//! │  Invoice only                                                           │
//! │    balanceDue = total − amountPaid    (may go negative)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shipping charges are recorded on the document but are not in any formula,
//! and neither are line-level tax fields.

use rust_decimal::Decimal;

use crate::document::{DocumentDetails, DocumentKind, SalesDocument};
use crate::line_item::LineItem;
use crate::money::{or_zero, round_money};

/// Which total formula a document kind uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsFormula {
    Standard,
    Reduced,
    WithRoundOff,
}

impl From<DocumentKind> for TotalsFormula {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::DeliveryChallan => TotalsFormula::Reduced,
            DocumentKind::RecurringInvoice => TotalsFormula::WithRoundOff,
            DocumentKind::Quote | DocumentKind::SalesOrder | DocumentKind::Invoice => {
                TotalsFormula::Standard
            }
        }
    }
}

/// Inputs to [`compute_total`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TotalsInput {
    pub sub_total: Decimal,
    pub tax_total: Decimal,
    pub discount_total: Decimal,
    pub adjustment: Decimal,
    pub round_off: Decimal,
}

/// Sum of line amounts. Items without an amount contribute zero.
pub fn sum_line_amounts(items: &[LineItem]) -> Decimal {
    round_money(items.iter().map(|item| or_zero(item.amount)).sum())
}

/// Applies `formula` to `input`.
pub fn compute_total(formula: TotalsFormula, input: &TotalsInput) -> Decimal {
    let total = match formula {
        TotalsFormula::Standard => {
            input.sub_total + input.tax_total + input.adjustment - input.discount_total
        }
        TotalsFormula::Reduced => input.sub_total + input.adjustment,
        TotalsFormula::WithRoundOff => {
            input.sub_total + input.tax_total + input.adjustment + input.round_off
                - input.discount_total
        }
    };
    round_money(total)
}

impl SalesDocument {
    /// Refreshes every derived monetary field.
    ///
    /// Pure and idempotent: running it twice on an unchanged document gives
    /// the same numbers.
    pub fn recalculate_totals(&mut self) {
        for item in &mut self.items {
            item.calculate_amount();
        }

        let round_off = match &self.details {
            DocumentDetails::RecurringInvoice(profile) => profile.round_off,
            _ => Decimal::ZERO,
        };

        self.sub_total = sum_line_amounts(&self.items);
        self.total = compute_total(
            self.kind().into(),
            &TotalsInput {
                sub_total: self.sub_total,
                tax_total: self.tax_total,
                discount_total: self.discount_total,
                adjustment: self.adjustment,
                round_off,
            },
        );

        if let DocumentDetails::Invoice(invoice) = &mut self.details {
            invoice.balance_due = round_money(self.total - invoice.amount_paid);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
