//! # API Error Type
//!
//! The single place where failures become what a caller sees.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in SalesDesk                              │
//! │                                                                         │
//! │  DocumentService method                                                │
//! │  Result<T, ServiceError>                                               │
//! │         │                                                               │
//! │         ├── CoreError (validation, wrong kind, bad payment) ──┐        │
//! │         │                                                      │        │
//! │         └── DbError (not found, unique, corrupt, sqlx) ────────┤        │
//! │                                                                ▼        │
//! │                                                   ApiError { code,      │
//! │                                                     message, details }  │
//! │                                                                │        │
//! │                                                                ▼        │
//! │  {"success": false, "error": "...", "details": {...},   ◄── envelope() │
//! │   "timestamp": "..."}                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Codes
//! | Code               | HTTP | Raised for                                   |
//! |--------------------|------|----------------------------------------------|
//! | `NOT_FOUND`        | 404  | missing document id / number                 |
//! | `CONFLICT`         | 409  | document number already taken                |
//! | `VALIDATION_ERROR` | 400  | bad request fields, wrong kind, bad payment  |
//! | `INTERNAL`         | 500  | anything else (logged, generic message)      |

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use salesdesk_core::CoreError;
use salesdesk_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Error returned by every service method.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    pub fn not_found(id: impl Into<String>) -> Self {
        ServiceError::Core(CoreError::DocumentNotFound(id.into()))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Error
// =============================================================================

/// What a failed call reports to its caller.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Validation failed",
///   "details": { "customerId": "customerId is required" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Field → message, for validation failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Duplicate resource (409)
    Conflict,

    /// Input validation failed (400)
    ValidationError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::ValidationError => 400,
            ErrorCode::Internal => 500,
        }
    }
}

/// Response body of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    /// Always false.
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error carrying a field → message map.
    pub fn validation(message: impl Into<String>, details: BTreeMap<String, String>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Wraps the error in the response envelope, stamped with `timestamp`.
    pub fn envelope(&self, timestamp: DateTime<Utc>) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            error: self.message.clone(),
            details: self.details.clone(),
            timestamp,
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                warn!(field = %field, value = %value, "Duplicate resource");
                ApiError::new(
                    ErrorCode::Conflict,
                    format!("{} '{}' already exists", field, value),
                )
            }
            DbError::ForeignKeyViolation { message } => {
                warn!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CorruptValue { column, value } => {
                error!(column = %column, value = %value, "Corrupt stored value");
                ApiError::internal("Stored data is inconsistent")
            }
            DbError::ConnectionFailed(e) | DbError::MigrationFailed(e) => {
                error!("Database unavailable: {}", e);
                ApiError::internal("Database unavailable")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::internal("Database busy")
            }
            DbError::QueryFailed(e) | DbError::TransactionFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                error!("Database operation failed: {}", e);
                ApiError::internal("Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let details = err.field_errors();
        match err {
            CoreError::DocumentNotFound(id) => ApiError::not_found("Sales document", &id),
            CoreError::WrongKind { .. } => {
                warn!("{}", err);
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            CoreError::MalformedDocumentNumber { .. } => {
                error!("{}", err);
                ApiError::internal("Stored data is inconsistent")
            }
            CoreError::InvalidPaymentAmount { .. } => ApiError {
                code: ErrorCode::ValidationError,
                message: err.to_string(),
                details,
            },
            CoreError::Validation(_) | CoreError::InvalidRequest(_) => {
                let details = details.unwrap_or_default();
                warn!(?details, "Validation error");
                ApiError::validation("Validation failed", details)
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(e) => e.into(),
            ServiceError::Db(e) => e.into(),
        }
    }
}

/// Unreadable request bodies.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        warn!("Payload not readable: {}", err);
        ApiError {
            code: ErrorCode::ValidationError,
            message: "The request body is invalid. Please check your inputs.".to_string(),
            details: Some(BTreeMap::from([("body".to_string(), err.to_string())])),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
