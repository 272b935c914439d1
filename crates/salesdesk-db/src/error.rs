//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError → ApiError (salesdesk-api) ← Envelope for the caller     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use salesdesk_core::CoreError;
use thiserror::Error;

/// Everything that can go wrong between a repository and SQLite.
#[derive(Debug, Error)]
pub enum DbError {
    /// An id or number matched no row, or an UPDATE by id touched nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected a write. For documents this means another
    /// writer on the same file took the number between scan and insert.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A line item pointed at a document that is not there.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A stored value does not read back: a money column that is not a
    /// decimal, or a document number that does not fit `PREFIX-NNNNN`.
    #[error("Corrupt value in {column}: '{value}'")]
    CorruptValue { column: String, value: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn corrupt(column: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::CorruptValue {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Last column named in a SQLite constraint message, without its table.
///
/// `"UNIQUE constraint failed: sales_documents.kind, sales_documents.document_number"`
/// gives `"document_number"`.
fn constrained_column(message: &str) -> String {
    message
        .rsplit(", ")
        .next()
        .and_then(|qualified| qualified.rsplit(['.', ' ']).next())
        .filter(|column| !column.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// ## Mapping
/// ```text
/// RowNotFound                    → NotFound
/// Database "UNIQUE ..."          → UniqueViolation (column from the message)
/// Database "FOREIGN KEY ..."     → ForeignKeyViolation
/// Database (anything else)       → QueryFailed
/// ColumnDecode                   → CorruptValue
/// PoolTimedOut / PoolClosed      → PoolExhausted / ConnectionFailed
/// Other                          → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("SalesDocument", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.starts_with("UNIQUE constraint failed") {
                    DbError::duplicate(constrained_column(message), "unknown")
                } else if message.starts_with("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: message.to_string(),
                    }
                } else {
                    DbError::QueryFailed(message.to_string())
                }
            }

            sqlx::Error::ColumnDecode { index, source } => DbError::corrupt(index, source.to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Stored numbers that no longer parse are a data-integrity failure here,
/// not a caller mistake.
impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedDocumentNumber { number, .. } => {
                DbError::corrupt("document_number", number)
            }
            other => DbError::Internal(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use salesdesk_core::DocumentKind;

    #[test]
    fn test_malformed_number_becomes_corrupt_value() {
        let err: DbError = CoreError::MalformedDocumentNumber {
            kind: DocumentKind::Invoice,
            number: "INV-0x01".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            DbError::CorruptValue { ref column, ref value }
                if column == "document_number" && value == "INV-0x01"
        ));
    }

    #[test]
    fn test_constrained_column() {
        assert_eq!(
            constrained_column(
                "UNIQUE constraint failed: sales_documents.kind, sales_documents.document_number"
            ),
            "document_number"
        );
        assert_eq!(constrained_column("UNIQUE constraint failed: line_items.id"), "id");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
