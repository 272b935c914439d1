//! # Repository Module
//!
//! Database repository implementations for SalesDesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DocumentService                                                       │
//! │       │                                                                 │
//! │       │  db.documents().find_by_status(kind, status, &page)            │
//! │       ▼                                                                 │
//! │  DocumentRepository ──────────► LineItemRepository                     │
//! │  ├── create / update               ├── for_document                    │
//! │  ├── get_by_id / get_by_number     └── (insert/replace inside the      │
//! │  ├── listings (Page<T>)                 document's transaction)        │
//! │  └── ledger + cursor writes                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite: sales_documents, line_items                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money columns are TEXT. Values are written with their full scale and
//! parsed back with [`parse_decimal`]; anything unparseable is a
//! [`DbError::CorruptValue`].

pub mod document;
pub mod line_item;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{DbError, DbResult};

pub(crate) fn parse_decimal(column: &str, value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value).map_err(|_| DbError::corrupt(column, value))
}

pub(crate) fn parse_optional_decimal(column: &str, value: Option<&str>) -> DbResult<Option<Decimal>> {
    value.map(|v| parse_decimal(column, v)).transpose()
}

pub(crate) fn decimal_text(value: Decimal) -> String {
    value.to_string()
}

pub(crate) fn optional_decimal_text(value: Option<Decimal>) -> Option<String> {
    value.map(decimal_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_text_keeps_scale() {
        let text = decimal_text(dec!(180.0000));
        assert_eq!(text, "180.0000");
        assert_eq!(parse_decimal("total", &text).unwrap(), dec!(180.0000));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let err = parse_decimal("total", "12,50").unwrap_err();
        assert!(matches!(err, DbError::CorruptValue { ref column, .. } if column == "total"));
        assert_eq!(parse_optional_decimal("rate", None).unwrap(), None);
    }
}
