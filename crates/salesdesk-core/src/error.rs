//! # Error Types
//!
//! Domain-specific error types for salesdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  salesdesk-core errors (this file)                                     │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - One bad field in a request                     │
//! │                                                                         │
//! │  salesdesk-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  salesdesk-api errors                                                  │
//! │  ├── ServiceError     - CoreError | DbError                            │
//! │  └── ApiError         - What the caller sees (envelope)                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::document::DocumentKind;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sales document id has no row.
    #[error("Sales document not found: {0}")]
    DocumentNotFound(String),

    /// A kind-specific operation was called on the wrong kind of document.
    ///
    /// ## When This Occurs
    /// - Recording a payment against a Quote
    /// - Pausing something that is not a recurring profile
    /// - Updating an Invoice with a SalesOrder payload
    #[error("Document {id} is a {actual}, expected a {expected}")]
    WrongKind {
        id: String,
        expected: DocumentKind,
        actual: DocumentKind,
    },

    /// A stored document number does not parse back into its sequence.
    ///
    /// The number generator refuses to skip such rows: a sequence that
    /// silently ignores them could hand out a number that already exists.
    #[error("Malformed {kind} number: '{number}'")]
    MalformedDocumentNumber { kind: DocumentKind, number: String },

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// A single validation failure.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Several validation failures collected from one request.
    #[error("Invalid request: {} problem(s)", .0.len())]
    InvalidRequest(Vec<ValidationError>),
}

impl CoreError {
    /// Field → message map for validation failures, `None` for everything else.
    pub fn field_errors(&self) -> Option<BTreeMap<String, String>> {
        match self {
            CoreError::Validation(e) => Some(field_map(std::slice::from_ref(e))),
            CoreError::InvalidRequest(errors) => Some(field_map(errors)),
            CoreError::InvalidPaymentAmount { reason } => {
                Some(BTreeMap::from([("amount".to_string(), reason.clone())]))
            }
            _ => None,
        }
    }
}

fn field_map(errors: &[ValidationError]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for err in errors {
        // first message wins when a field fails more than one rule
        map.entry(err.field().to_string())
            .or_insert_with(|| err.to_string());
    }
    map
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. unknown enum name, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// The request field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
