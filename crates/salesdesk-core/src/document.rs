//! # Sales Documents
//!
//! One record shape for Quote, SalesOrder, DeliveryChallan, Invoice and
//! RecurringInvoice. The ~80% of fields every kind shares live directly on
//! [`SalesDocument`]; the rest sits in the tagged [`DocumentDetails`] enum.
//!
//! ## Conversion Chain (lineage pointers only)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Quote ──quote_id──► SalesOrder ──sales_order_id──► Invoice            │
//! │                            │                                            │
//! │                            └──────sales_order_id──► DeliveryChallan     │
//! │                                                                         │
//! │   RecurringInvoice  (profile, spawns Invoices on schedule)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! - Created in [`DocumentKind::initial_status`], totals computed, number
//!   assigned by the repository on insert and never changed afterwards.
//! - Every update replaces the whole line-item list when the request carries
//!   one and recomputes totals.
//! - Deleting only flips `active` to false.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::identity::Identity;
use crate::line_item::{LineItem, LineItemInput};
use crate::money::{or_zero, round_money};
use crate::recurrence::{RecurrenceSchedule, RepeatUnit};
use crate::status::DocumentStatus;
use crate::validation::validate_payment_amount;
use crate::DEFAULT_CURRENCY;

// =============================================================================
// Document Kind
// =============================================================================

/// The five kinds of sales document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Quote,
    SalesOrder,
    DeliveryChallan,
    Invoice,
    RecurringInvoice,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Quote,
        DocumentKind::SalesOrder,
        DocumentKind::DeliveryChallan,
        DocumentKind::Invoice,
        DocumentKind::RecurringInvoice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "QUOTE",
            DocumentKind::SalesOrder => "SALES_ORDER",
            DocumentKind::DeliveryChallan => "DELIVERY_CHALLAN",
            DocumentKind::Invoice => "INVOICE",
            DocumentKind::RecurringInvoice => "RECURRING_INVOICE",
        }
    }

    /// Fixed prefix of this kind's document numbers.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "QT-",
            DocumentKind::SalesOrder => "SO-",
            DocumentKind::DeliveryChallan => "DC-",
            DocumentKind::Invoice => "INV-",
            DocumentKind::RecurringInvoice => "RI-",
        }
    }

    /// Status a freshly created document starts in.
    pub fn initial_status(&self) -> DocumentStatus {
        match self {
            DocumentKind::RecurringInvoice => DocumentStatus::Active,
            _ => DocumentStatus::Draft,
        }
    }

    /// Statuses reported individually in this kind's statistics.
    pub fn tracked_statuses(&self) -> &'static [DocumentStatus] {
        use DocumentStatus::*;
        match self {
            DocumentKind::Quote => &[Draft, Sent, Accepted, Expired],
            DocumentKind::SalesOrder => &[Draft, Confirmed, Shipped],
            DocumentKind::DeliveryChallan => &[Draft, Delivered],
            DocumentKind::Invoice => &[Draft, Sent, Paid, Overdue],
            DocumentKind::RecurringInvoice => &[Active, Stopped],
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        DocumentKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "kind".to_string(),
                reason: format!("unknown document kind '{}'", s),
            })
    }
}

// =============================================================================
// Kind-Specific Details
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteDetails {
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrderDetails {
    /// Quote this order came from.
    pub quote_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_shipment_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    pub delivery_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryChallanDetails {
    /// Sales order being delivered.
    pub sales_order_id: Option<String>,
    /// Free text, e.g. "Job Work", "Supply on Approval".
    pub challan_type: Option<String>,
}

/// Invoice terms a caller may set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceTerms {
    pub sales_order_id: Option<String>,
    pub order_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
}

/// Stored invoice fields: the terms plus the payment ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    pub sales_order_id: Option<String>,
    pub order_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    #[ts(as = "String")]
    pub amount_paid: Decimal,
    /// Derived: `total - amount_paid`. Negative means overpaid.
    #[ts(as = "String")]
    pub balance_due: Decimal,
}

/// Recurring profile fields a caller may set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct RecurringProfileRequest {
    pub profile_name: Option<String>,
    pub repeat_every: Option<u32>,
    pub repeat_unit: Option<RepeatUnit>,
    #[ts(as = "Option<String>")]
    pub start_on: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub ends_on: Option<NaiveDate>,
    pub never_expires: Option<bool>,
    pub payment_terms: Option<String>,
    #[ts(as = "Option<String>")]
    pub round_off: Option<Decimal>,
}

/// Stored recurring profile, including the schedule cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecurringInvoiceDetails {
    pub profile_name: String,
    pub repeat_every: Option<u32>,
    pub repeat_unit: Option<RepeatUnit>,
    #[ts(as = "Option<String>")]
    pub start_on: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub ends_on: Option<NaiveDate>,
    pub never_expires: bool,
    #[ts(as = "Option<String>")]
    pub next_invoice_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub last_invoice_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    #[ts(as = "String")]
    pub round_off: Decimal,
}

impl RecurringInvoiceDetails {
    /// The schedule, if every field it needs is present.
    pub fn schedule(&self) -> Option<RecurrenceSchedule> {
        Some(RecurrenceSchedule {
            repeat_every: self.repeat_every?,
            repeat_unit: self.repeat_unit?,
            start_on: self.start_on?,
            ends_on: self.ends_on,
            never_expires: self.never_expires,
        })
    }
}

/// Kind-specific part of a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentDetails {
    Quote(QuoteDetails),
    SalesOrder(SalesOrderDetails),
    DeliveryChallan(DeliveryChallanDetails),
    Invoice(InvoiceDetails),
    RecurringInvoice(RecurringInvoiceDetails),
}

impl DocumentDetails {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentDetails::Quote(_) => DocumentKind::Quote,
            DocumentDetails::SalesOrder(_) => DocumentKind::SalesOrder,
            DocumentDetails::DeliveryChallan(_) => DocumentKind::DeliveryChallan,
            DocumentDetails::Invoice(_) => DocumentKind::Invoice,
            DocumentDetails::RecurringInvoice(_) => DocumentKind::RecurringInvoice,
        }
    }
}

/// Kind-specific part of a create/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetailsRequest {
    Quote(QuoteDetails),
    SalesOrder(SalesOrderDetails),
    DeliveryChallan(DeliveryChallanDetails),
    Invoice(InvoiceTerms),
    RecurringInvoice(RecurringProfileRequest),
}

impl DetailsRequest {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DetailsRequest::Quote(_) => DocumentKind::Quote,
            DetailsRequest::SalesOrder(_) => DocumentKind::SalesOrder,
            DetailsRequest::DeliveryChallan(_) => DocumentKind::DeliveryChallan,
            DetailsRequest::Invoice(_) => DocumentKind::Invoice,
            DetailsRequest::RecurringInvoice(_) => DocumentKind::RecurringInvoice,
        }
    }

    /// An empty request body for `kind`.
    pub fn empty(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Quote => DetailsRequest::Quote(QuoteDetails::default()),
            DocumentKind::SalesOrder => DetailsRequest::SalesOrder(SalesOrderDetails::default()),
            DocumentKind::DeliveryChallan => {
                DetailsRequest::DeliveryChallan(DeliveryChallanDetails::default())
            }
            DocumentKind::Invoice => DetailsRequest::Invoice(InvoiceTerms::default()),
            DocumentKind::RecurringInvoice => {
                DetailsRequest::RecurringInvoice(RecurringProfileRequest::default())
            }
        }
    }
}

// =============================================================================
// Request
// =============================================================================

/// Create / update payload for any document kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    /// Required. Referenced by value only.
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    /// Quote/order/challan/invoice date. Defaults to today.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub document_date: Option<NaiveDate>,
    #[serde(default)]
    pub salesperson: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,

    /// `None` on update keeps the stored items; `Some` replaces all of them.
    #[serde(default)]
    pub line_items: Option<Vec<LineItemInput>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub shipping_charges: Option<Decimal>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub adjustment: Option<Decimal>,
    #[serde(default)]
    pub adjustment_label: Option<String>,

    #[serde(default)]
    pub customer_notes: Option<String>,
    #[serde(default)]
    pub terms_and_conditions: Option<String>,
    #[serde(default)]
    pub attachment_url: Option<String>,

    pub details: DetailsRequest,
}

impl DocumentRequest {
    /// A request for `customer_id` with nothing else filled in.
    pub fn new(customer_id: impl Into<String>, details: DetailsRequest) -> Self {
        DocumentRequest {
            customer_id: Some(customer_id.into()),
            customer_name: None,
            reference_number: None,
            document_date: None,
            salesperson: None,
            subject: None,
            currency: None,
            line_items: None,
            shipping_charges: None,
            adjustment: None,
            adjustment_label: None,
            customer_notes: None,
            terms_and_conditions: None,
            attachment_url: None,
            details,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.details.kind()
    }
}

// =============================================================================
// Sales Document
// =============================================================================

/// A sales document of any kind.
///
/// ## Derived Fields
/// `sub_total`, `total` and (for invoices) `balance_due` are stored, not
/// computed on read. They are refreshed by
/// [`SalesDocument::recalculate_totals`] before every persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesDocument {
    /// Row id (UUID v4).
    pub id: String,
    /// e.g. `INV-00007`. Empty until the repository assigns it on insert.
    pub document_number: String,

    pub customer_id: String,
    pub customer_name: Option<String>,
    pub reference_number: Option<String>,
    #[ts(as = "String")]
    pub document_date: NaiveDate,
    pub salesperson: Option<String>,
    pub subject: Option<String>,
    pub currency: String,

    /// Owned items, ordered by `sort_order`.
    pub items: Vec<LineItem>,

    #[ts(as = "String")]
    pub sub_total: Decimal,
    /// Document-level discount. Nothing populates it today; defaults to zero.
    #[ts(as = "String")]
    pub discount_total: Decimal,
    /// Document-level tax. Nothing populates it today; defaults to zero.
    #[ts(as = "String")]
    pub tax_total: Decimal,
    /// Recorded but not part of `total`.
    #[ts(as = "String")]
    pub shipping_charges: Decimal,
    #[ts(as = "String")]
    pub adjustment: Decimal,
    pub adjustment_label: Option<String>,
    #[ts(as = "String")]
    pub total: Decimal,

    pub status: DocumentStatus,
    pub customer_notes: Option<String>,
    pub terms_and_conditions: Option<String>,
    pub attachment_url: Option<String>,

    /// Soft-delete flag.
    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: Option<String>,

    pub details: DocumentDetails,
}

impl SalesDocument {
    /// Builds a brand-new document from a request.
    ///
    /// The caller validates the request first. The number is left empty for
    /// the repository to assign.
    pub fn from_request(request: &DocumentRequest, identity: &Identity, now: DateTime<Utc>) -> Self {
        let kind = request.kind();

        let details = match &request.details {
            DetailsRequest::Quote(d) => DocumentDetails::Quote(d.clone()),
            DetailsRequest::SalesOrder(d) => DocumentDetails::SalesOrder(d.clone()),
            DetailsRequest::DeliveryChallan(d) => DocumentDetails::DeliveryChallan(d.clone()),
            DetailsRequest::Invoice(terms) => DocumentDetails::Invoice(InvoiceDetails {
                sales_order_id: terms.sales_order_id.clone(),
                order_number: terms.order_number.clone(),
                due_date: terms.due_date,
                payment_terms: terms.payment_terms.clone(),
                amount_paid: Decimal::ZERO,
                balance_due: Decimal::ZERO,
            }),
            DetailsRequest::RecurringInvoice(profile) => {
                DocumentDetails::RecurringInvoice(RecurringInvoiceDetails {
                    profile_name: profile.profile_name.clone().unwrap_or_default(),
                    repeat_every: profile.repeat_every,
                    repeat_unit: profile.repeat_unit,
                    start_on: profile.start_on,
                    ends_on: profile.ends_on,
                    never_expires: profile.never_expires.unwrap_or(false),
                    next_invoice_date: profile.start_on,
                    last_invoice_date: None,
                    payment_terms: profile.payment_terms.clone(),
                    round_off: round_money(or_zero(profile.round_off)),
                })
            }
        };

        let mut document = SalesDocument {
            id: Uuid::new_v4().to_string(),
            document_number: String::new(),
            customer_id: request.customer_id.clone().unwrap_or_default(),
            customer_name: None,
            reference_number: None,
            document_date: request.document_date.unwrap_or_else(|| now.date_naive()),
            salesperson: None,
            subject: None,
            currency: DEFAULT_CURRENCY.to_string(),
            items: Vec::new(),
            sub_total: Decimal::ZERO,
            discount_total: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            shipping_charges: Decimal::ZERO,
            adjustment: Decimal::ZERO,
            adjustment_label: None,
            total: Decimal::ZERO,
            status: kind.initial_status(),
            customer_notes: None,
            terms_and_conditions: None,
            attachment_url: None,
            active: true,
            created_at: now,
            updated_at: now,
            created_by: identity.display_name().to_string(),
            updated_by: None,
            details,
        };
        document.apply_common_fields(request);
        document.recalculate_totals();
        document
    }

    pub fn kind(&self) -> DocumentKind {
        self.details.kind()
    }

    /// Rewrites the caller-editable fields from an update request.
    ///
    /// Never touches the number, status, payment ledger or schedule cursor.
    pub fn apply_update(
        &mut self,
        request: &DocumentRequest,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.ensure_kind(request.kind())?;

        if let Some(customer_id) = &request.customer_id {
            self.customer_id = customer_id.clone();
        }
        if let Some(date) = request.document_date {
            self.document_date = date;
        }
        self.apply_common_fields(request);

        match (&mut self.details, &request.details) {
            (DocumentDetails::Quote(stored), DetailsRequest::Quote(d)) => *stored = d.clone(),
            (DocumentDetails::SalesOrder(stored), DetailsRequest::SalesOrder(d)) => {
                *stored = d.clone()
            }
            (DocumentDetails::DeliveryChallan(stored), DetailsRequest::DeliveryChallan(d)) => {
                *stored = d.clone()
            }
            (DocumentDetails::Invoice(stored), DetailsRequest::Invoice(terms)) => {
                stored.sales_order_id = terms.sales_order_id.clone();
                stored.order_number = terms.order_number.clone();
                stored.due_date = terms.due_date;
                stored.payment_terms = terms.payment_terms.clone();
            }
            (DocumentDetails::RecurringInvoice(stored), DetailsRequest::RecurringInvoice(p)) => {
                if let Some(name) = &p.profile_name {
                    stored.profile_name = name.clone();
                }
                stored.repeat_every = p.repeat_every;
                stored.repeat_unit = p.repeat_unit;
                stored.start_on = p.start_on;
                stored.ends_on = p.ends_on;
                stored.never_expires = p.never_expires.unwrap_or(false);
                stored.payment_terms = p.payment_terms.clone();
                stored.round_off = round_money(or_zero(p.round_off));
            }
            // ensure_kind above rules this out
            _ => {}
        }

        self.touch(identity, now);
        self.recalculate_totals();
        Ok(())
    }

    fn apply_common_fields(&mut self, request: &DocumentRequest) {
        self.customer_name = request.customer_name.clone();
        self.reference_number = request.reference_number.clone();
        self.salesperson = request.salesperson.clone();
        self.subject = request.subject.clone();
        if let Some(currency) = &request.currency {
            self.currency = currency.clone();
        }
        self.shipping_charges = round_money(or_zero(request.shipping_charges));
        self.adjustment = round_money(or_zero(request.adjustment));
        self.adjustment_label = request.adjustment_label.clone();
        self.customer_notes = request.customer_notes.clone();
        self.terms_and_conditions = request.terms_and_conditions.clone();
        self.attachment_url = request.attachment_url.clone();

        if let Some(inputs) = &request.line_items {
            self.items = inputs
                .iter()
                .enumerate()
                .map(|(position, input)| LineItem::from_input(input, position))
                .collect();
            self.items.sort_by_key(|item| item.sort_order);
        }
    }

    /// Unchecked status change: any status from any status.
    pub fn set_status(&mut self, status: DocumentStatus, identity: &Identity, now: DateTime<Utc>) {
        self.status = status;
        self.touch(identity, now);
    }

    /// Adds a payment to an invoice.
    ///
    /// `amount_paid += amount`, totals are recomputed, and the status becomes
    /// PAID once `balance_due <= 0`. A partial payment leaves the status as it
    /// was. Over-payment is accepted and shows up as a negative balance.
    pub fn record_payment(
        &mut self,
        amount: Decimal,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.ensure_kind(DocumentKind::Invoice)?;
        validate_payment_amount(amount).map_err(|e| CoreError::InvalidPaymentAmount {
            reason: format!("{}, got {}", e, amount),
        })?;

        if let DocumentDetails::Invoice(invoice) = &mut self.details {
            let paid = invoice.amount_paid.checked_add(amount).ok_or_else(|| {
                CoreError::InvalidPaymentAmount {
                    reason: format!("amount paid would overflow, got {}", amount),
                }
            })?;
            invoice.amount_paid = round_money(paid);
        }
        self.recalculate_totals();

        if self.balance_due().is_some_and(|balance| balance <= Decimal::ZERO) {
            self.status = DocumentStatus::Paid;
        }
        self.touch(identity, now);
        Ok(())
    }

    /// Recurring profiles only: forces STOPPED.
    pub fn pause(&mut self, identity: &Identity, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_kind(DocumentKind::RecurringInvoice)?;
        self.set_status(DocumentStatus::Stopped, identity, now);
        Ok(())
    }

    /// Recurring profiles only: forces ACTIVE.
    pub fn resume(&mut self, identity: &Identity, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_kind(DocumentKind::RecurringInvoice)?;
        self.set_status(DocumentStatus::Active, identity, now);
        Ok(())
    }

    /// Moves a recurring profile's cursor past the occurrence it is on.
    ///
    /// `last_invoice_date` takes the current `next_invoice_date` and the
    /// next occurrence follows the schedule. Returns the new
    /// `next_invoice_date`, which is `None` once the schedule is exhausted or
    /// incomplete.
    pub fn advance_recurrence(
        &mut self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<NaiveDate>> {
        self.ensure_kind(DocumentKind::RecurringInvoice)?;

        let next = match &mut self.details {
            DocumentDetails::RecurringInvoice(profile) => {
                let Some(current) = profile.next_invoice_date else {
                    return Ok(None);
                };
                let next = profile.schedule().and_then(|s| s.next_after(current));
                profile.last_invoice_date = Some(current);
                profile.next_invoice_date = next;
                next
            }
            _ => None,
        };

        self.touch(identity, now);
        Ok(next)
    }

    /// Marks the document inactive.
    pub fn soft_delete(&mut self, identity: &Identity, now: DateTime<Utc>) {
        self.active = false;
        self.touch(identity, now);
    }

    /// `balance_due` for invoices, `None` for every other kind.
    pub fn balance_due(&self) -> Option<Decimal> {
        match &self.details {
            DocumentDetails::Invoice(invoice) => Some(invoice.balance_due),
            _ => None,
        }
    }

    /// Schedule of a recurring profile.
    pub fn schedule(&self) -> Option<RecurrenceSchedule> {
        match &self.details {
            DocumentDetails::RecurringInvoice(profile) => profile.schedule(),
            _ => None,
        }
    }

    fn ensure_kind(&self, expected: DocumentKind) -> CoreResult<()> {
        let actual = self.kind();
        if actual == expected {
            Ok(())
        } else {
            Err(CoreError::WrongKind {
                id: self.id.clone(),
                expected,
                actual,
            })
        }
    }

    fn touch(&mut self, identity: &Identity, now: DateTime<Utc>) {
        self.updated_by = Some(identity.display_name().to_string());
        self.updated_at = now;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 30, 0).unwrap()
    }

    fn line(qty: Decimal, rate: Decimal, pct: Decimal) -> LineItemInput {
        LineItemInput {
            item_name: Some("Item".to_string()),
            quantity: Some(qty),
            rate: Some(rate),
            discount_percent: Some(pct),
            ..LineItemInput::default()
        }
    }

    fn quote_request() -> DocumentRequest {
        DocumentRequest {
            customer_name: Some("Acme Traders".to_string()),
            line_items: Some(vec![
                line(dec!(2), dec!(100), dec!(10)),
                line(dec!(1), dec!(50), dec!(0)),
            ]),
            shipping_charges: Some(dec!(40)),
            adjustment: Some(dec!(5)),
            ..DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::Quote))
        }
    }

    fn invoice_with_total(total_rate: Decimal) -> SalesDocument {
        let request = DocumentRequest {
            line_items: Some(vec![line(dec!(1), total_rate, dec!(0))]),
            ..DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::Invoice))
        };
        SalesDocument::from_request(&request, &Identity::system(), now())
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("sales-order".parse::<DocumentKind>().unwrap(), DocumentKind::SalesOrder);
        assert_eq!("INVOICE".parse::<DocumentKind>().unwrap(), DocumentKind::Invoice);
        assert!("receipt".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_quote_from_request() {
        let identity = Identity::from_principal(Some("asha"));
        let quote = SalesDocument::from_request(&quote_request(), &identity, now());

        assert_eq!(quote.kind(), DocumentKind::Quote);
        assert_eq!(quote.status, DocumentStatus::Draft);
        assert_eq!(quote.items[0].amount, Some(dec!(180.00)));
        assert_eq!(quote.items[1].amount, Some(dec!(50.00)));
        assert_eq!(quote.sub_total, dec!(230.00));
        assert_eq!(quote.total, dec!(235.00));
        assert_eq!(quote.shipping_charges, dec!(40));
        assert_eq!(quote.currency, "INR");
        assert_eq!(quote.document_date, now().date_naive());
        assert_eq!(quote.created_by, "asha");
        assert!(quote.updated_by.is_none());
        assert!(quote.active);
        assert!(quote.document_number.is_empty());
    }

    #[test]
    fn test_recurring_profile_starts_active_with_cursor_at_start() {
        let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let request = DocumentRequest::new(
            "cust-9",
            DetailsRequest::RecurringInvoice(RecurringProfileRequest {
                profile_name: Some("Monthly retainer".to_string()),
                repeat_every: Some(1),
                repeat_unit: Some(RepeatUnit::Month),
                start_on: Some(start),
                never_expires: Some(true),
                ..RecurringProfileRequest::default()
            }),
        );

        let profile = SalesDocument::from_request(&request, &Identity::system(), now());
        assert_eq!(profile.status, DocumentStatus::Active);
        match &profile.details {
            DocumentDetails::RecurringInvoice(d) => {
                assert_eq!(d.next_invoice_date, Some(start));
                assert_eq!(d.last_invoice_date, None);
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn test_update_replaces_items_and_keeps_number() {
        let mut quote = SalesDocument::from_request(&quote_request(), &Identity::system(), now());
        quote.document_number = "QT-00004".to_string();

        let update = DocumentRequest {
            line_items: Some(vec![line(dec!(3), dec!(10), dec!(0))]),
            ..DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::Quote))
        };
        quote
            .apply_update(&update, &Identity::from_principal(Some("ravi")), now())
            .unwrap();

        assert_eq!(quote.items.len(), 1);
        assert_eq!(quote.sub_total, dec!(30));
        assert_eq!(quote.total, dec!(30));
        assert_eq!(quote.document_number, "QT-00004");
        assert_eq!(quote.updated_by.as_deref(), Some("ravi"));
    }

    #[test]
    fn test_update_without_items_keeps_items() {
        let mut quote = SalesDocument::from_request(&quote_request(), &Identity::system(), now());
        let update = DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::Quote));

        quote.apply_update(&update, &Identity::system(), now()).unwrap();
        assert_eq!(quote.items.len(), 2);
        assert_eq!(quote.sub_total, dec!(230));
        // adjustment was not resent
        assert_eq!(quote.total, dec!(230));
    }

    #[test]
    fn test_update_without_date_keeps_stored_date() {
        let march = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut quote = SalesDocument::from_request(
            &DocumentRequest {
                document_date: Some(march),
                ..quote_request()
            },
            &Identity::system(),
            now(),
        );

        let update = DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::Quote));
        quote.apply_update(&update, &Identity::system(), now()).unwrap();
        assert_eq!(quote.document_date, march);

        let april = NaiveDate::from_ymd_opt(2026, 4, 20).unwrap();
        let update = DocumentRequest {
            document_date: Some(april),
            ..update
        };
        quote.apply_update(&update, &Identity::system(), now()).unwrap();
        assert_eq!(quote.document_date, april);
    }

    #[test]
    fn test_update_with_other_kind_is_rejected() {
        let mut quote = SalesDocument::from_request(&quote_request(), &Identity::system(), now());
        let update = DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::Invoice));

        let err = quote.apply_update(&update, &Identity::system(), now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::WrongKind {
                expected: DocumentKind::Invoice,
                actual: DocumentKind::Quote,
                ..
            }
        ));
    }

    #[test]
    fn test_partial_then_full_payment() {
        let mut invoice = invoice_with_total(dec!(235));
        invoice.status = DocumentStatus::Sent;

        invoice.record_payment(dec!(100), &Identity::system(), now()).unwrap();
        assert_eq!(invoice.balance_due(), Some(dec!(135)));
        assert_eq!(invoice.status, DocumentStatus::Sent);

        invoice.record_payment(dec!(135), &Identity::system(), now()).unwrap();
        assert_eq!(invoice.balance_due(), Some(dec!(0)));
        assert_eq!(invoice.status, DocumentStatus::Paid);
    }

    #[test]
    fn test_overpayment_goes_negative() {
        let mut invoice = invoice_with_total(dec!(50));
        invoice.record_payment(dec!(80), &Identity::system(), now()).unwrap();
        assert_eq!(invoice.balance_due(), Some(dec!(-30)));
        assert_eq!(invoice.status, DocumentStatus::Paid);
    }

    #[test]
    fn test_non_positive_payment_is_rejected() {
        let mut invoice = invoice_with_total(dec!(50));
        for amount in [Decimal::ZERO, dec!(-1)] {
            let err = invoice
                .record_payment(amount, &Identity::system(), now())
                .unwrap_err();
            assert!(matches!(err, CoreError::InvalidPaymentAmount { .. }));
        }
        assert_eq!(invoice.balance_due(), Some(dec!(50)));
    }

    #[test]
    fn test_payment_overflowing_the_ledger_is_rejected() {
        let mut invoice = invoice_with_total(dec!(50));
        if let DocumentDetails::Invoice(ledger) = &mut invoice.details {
            ledger.amount_paid = Decimal::MAX;
        }

        let err = invoice
            .record_payment(dec!(1), &Identity::system(), now())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPaymentAmount { .. }));
        assert_eq!(invoice.status, DocumentStatus::Draft);
    }

    #[test]
    fn test_payment_on_quote_is_wrong_kind() {
        let mut quote = SalesDocument::from_request(&quote_request(), &Identity::system(), now());
        let err = quote
            .record_payment(dec!(10), &Identity::system(), now())
            .unwrap_err();
        assert!(matches!(err, CoreError::WrongKind { .. }));
    }

    #[test]
    fn test_status_setter_is_unchecked() {
        let mut quote = SalesDocument::from_request(&quote_request(), &Identity::system(), now());
        quote.set_status(DocumentStatus::Paid, &Identity::system(), now());
        assert_eq!(quote.status, DocumentStatus::Paid);
        quote.set_status(DocumentStatus::Draft, &Identity::system(), now());
        assert_eq!(quote.status, DocumentStatus::Draft);
    }

    #[test]
    fn test_pause_resume_only_for_recurring() {
        let mut quote = SalesDocument::from_request(&quote_request(), &Identity::system(), now());
        assert!(quote.pause(&Identity::system(), now()).is_err());

        let mut profile = SalesDocument::from_request(
            &DocumentRequest::new("c", DetailsRequest::empty(DocumentKind::RecurringInvoice)),
            &Identity::system(),
            now(),
        );
        profile.pause(&Identity::system(), now()).unwrap();
        assert_eq!(profile.status, DocumentStatus::Stopped);
        profile.resume(&Identity::system(), now()).unwrap();
        assert_eq!(profile.status, DocumentStatus::Active);
    }

    #[test]
    fn test_advance_recurrence_moves_cursor() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let request = DocumentRequest::new(
            "c",
            DetailsRequest::RecurringInvoice(RecurringProfileRequest {
                profile_name: Some("Weekly".to_string()),
                repeat_every: Some(1),
                repeat_unit: Some(RepeatUnit::Week),
                start_on: Some(start),
                never_expires: Some(true),
                ..RecurringProfileRequest::default()
            }),
        );
        let mut profile = SalesDocument::from_request(&request, &Identity::system(), now());

        let next = profile.advance_recurrence(&Identity::system(), now()).unwrap();
        assert_eq!(next, NaiveDate::from_ymd_opt(2026, 1, 17));
        match &profile.details {
            DocumentDetails::RecurringInvoice(d) => assert_eq!(d.last_invoice_date, Some(start)),
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn test_soft_delete() {
        let mut quote = SalesDocument::from_request(&quote_request(), &Identity::system(), now());
        quote.soft_delete(&Identity::from_principal(None), now());
        assert!(!quote.active);
        assert_eq!(quote.updated_by.as_deref(), Some("system"));
    }

    #[test]
    fn test_details_serialize_with_kind_tag() {
        let invoice = invoice_with_total(dec!(10));
        let json = serde_json::to_value(&invoice).unwrap();
        assert_eq!(json["details"]["kind"], "INVOICE");

        let balance: Decimal = json["details"]["balanceDue"].as_str().unwrap().parse().unwrap();
        let total: Decimal = json["total"].as_str().unwrap().parse().unwrap();
        assert_eq!(balance, dec!(10));
        assert_eq!(total, dec!(10));
    }
}
