//! # Validation Module
//!
//! Request validation for SalesDesk documents.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                       │
//! │  ├── Types, enum names, decimal syntax                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Required fields, ranges, signs                                     │
//! │  └── Every failure collected, keyed by field                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  └── UNIQUE(kind, document_number)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog references (`customerId`, `itemId`) are checked for presence only,
//! never against the customer or item tables.

use rust_decimal::Decimal;

use crate::document::{DetailsRequest, DocumentRequest};
use crate::error::ValidationError;
use crate::line_item::LineItemInput;
use crate::money::{MAX_AMOUNT, MAX_LINE_ITEMS};

/// Result type for single-rule validators.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted free-text identifier (customer id, item id, ...).
pub const MAX_REFERENCE_LENGTH: usize = 64;

// =============================================================================
// Request Validation
// =============================================================================

/// Checks a create/update request, collecting every failure.
///
/// ## Rules
/// - `customerId` is required (and at most 64 characters)
/// - recurring profiles need a `profileName` and a positive `repeatEvery`
/// - line quantities, rates and amounts must not be negative
/// - percents must lie in 0..=100
/// - shipping charges must not be negative
/// - no quantity, rate or amount may exceed [`MAX_AMOUNT`] in magnitude, and
///   a document holds at most [`MAX_LINE_ITEMS`] lines
pub fn validate_request(request: &DocumentRequest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match request.customer_id.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError::Required {
            field: "customerId".to_string(),
        }),
        Some(id) => collect(&mut errors, validate_max_length("customerId", id, MAX_REFERENCE_LENGTH)),
    }

    if let Some(shipping) = request.shipping_charges {
        collect(&mut errors, validate_not_negative("shippingCharges", shipping));
        collect(&mut errors, validate_magnitude("shippingCharges", shipping));
    }
    if let Some(adjustment) = request.adjustment {
        collect(&mut errors, validate_magnitude("adjustment", adjustment));
    }

    if let DetailsRequest::RecurringInvoice(profile) = &request.details {
        if profile
            .profile_name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
        {
            errors.push(ValidationError::Required {
                field: "profileName".to_string(),
            });
        }
        if profile.repeat_every == Some(0) {
            errors.push(ValidationError::MustBePositive {
                field: "repeatEvery".to_string(),
            });
        }
        if let Some(round_off) = profile.round_off {
            collect(&mut errors, validate_magnitude("roundOff", round_off));
        }
    }

    if let Some(items) = &request.line_items {
        if items.len() > MAX_LINE_ITEMS {
            errors.push(ValidationError::OutOfRange {
                field: "lineItems".to_string(),
                min: "0".to_string(),
                max: MAX_LINE_ITEMS.to_string(),
            });
        }
        for (index, item) in items.iter().enumerate() {
            validate_line_item(index, item, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_line_item(index: usize, item: &LineItemInput, errors: &mut Vec<ValidationError>) {
    let field = |name: &str| format!("lineItems[{}].{}", index, name);

    for (name, value) in [
        ("quantity", item.quantity),
        ("rate", item.rate),
        ("discountAmount", item.discount_amount),
        ("taxAmount", item.tax_amount),
    ] {
        if let Some(value) = value {
            collect(errors, validate_not_negative(&field(name), value));
            collect(errors, validate_magnitude(&field(name), value));
        }
    }

    for (name, value) in [
        ("discountPercent", item.discount_percent),
        ("taxPercent", item.tax_percent),
    ] {
        if let Some(value) = value {
            collect(errors, validate_percent(&field(name), value));
        }
    }

    if let Some(item_id) = &item.item_id {
        collect(
            errors,
            validate_max_length(&field("itemId"), item_id, MAX_REFERENCE_LENGTH),
        );
    }
}

fn collect(errors: &mut Vec<ValidationError>, result: ValidationResult<()>) {
    if let Err(e) = result {
        errors.push(e);
    }
}

// =============================================================================
// Single-Rule Validators
// =============================================================================

/// Validates a payment amount: strictly positive and at most [`MAX_AMOUNT`].
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use salesdesk_core::validation::validate_payment_amount;
///
/// assert!(validate_payment_amount(Decimal::from(100)).is_ok());
/// assert!(validate_payment_amount(Decimal::ZERO).is_err());
/// ```
pub fn validate_payment_amount(amount: Decimal) -> ValidationResult<()> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    validate_magnitude("amount", amount)
}

/// Rejects values whose magnitude exceeds [`MAX_AMOUNT`].
pub fn validate_magnitude(field: &str, value: Decimal) -> ValidationResult<()> {
    if value.abs() > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: (-MAX_AMOUNT).to_string(),
            max: MAX_AMOUNT.to_string(),
        });
    }
    Ok(())
}

pub fn validate_not_negative(field: &str, value: Decimal) -> ValidationResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

pub fn validate_percent(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        });
    }
    Ok(())
}

pub fn validate_max_length(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
