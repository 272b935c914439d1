//! # Document Status
//!
//! One status vocabulary shared by every document kind.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Quote / SalesOrder / DeliveryChallan / Invoice start in DRAFT          │
//! │  RecurringInvoice starts in ACTIVE                                      │
//! │                                                                         │
//! │  update_status(any) ─────► any        (no transition graph)             │
//! │  pause()            ─────► STOPPED    (recurring profiles)              │
//! │  resume()           ─────► ACTIVE     (recurring profiles)              │
//! │  record_payment()   ─────► PAID       (only once balanceDue <= 0)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Not every status is meaningful for every kind, but any status is accepted
//! for any document in any current state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// Lifecycle status of a sales document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Draft,
    Pending,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Confirmed,
    Shipped,
    Delivered,
    Invoiced,
    PartiallyInvoiced,
    Cancelled,
    Paid,
    PartiallyPaid,
    Overdue,
    Active,
    Stopped,
}

impl DocumentStatus {
    /// Every status, in declaration order.
    pub const ALL: [DocumentStatus; 17] = [
        DocumentStatus::Draft,
        DocumentStatus::Pending,
        DocumentStatus::Sent,
        DocumentStatus::Accepted,
        DocumentStatus::Rejected,
        DocumentStatus::Expired,
        DocumentStatus::Confirmed,
        DocumentStatus::Shipped,
        DocumentStatus::Delivered,
        DocumentStatus::Invoiced,
        DocumentStatus::PartiallyInvoiced,
        DocumentStatus::Cancelled,
        DocumentStatus::Paid,
        DocumentStatus::PartiallyPaid,
        DocumentStatus::Overdue,
        DocumentStatus::Active,
        DocumentStatus::Stopped,
    ];

    /// Stored / wire name, e.g. `PARTIALLY_PAID`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "DRAFT",
            DocumentStatus::Pending => "PENDING",
            DocumentStatus::Sent => "SENT",
            DocumentStatus::Accepted => "ACCEPTED",
            DocumentStatus::Rejected => "REJECTED",
            DocumentStatus::Expired => "EXPIRED",
            DocumentStatus::Confirmed => "CONFIRMED",
            DocumentStatus::Shipped => "SHIPPED",
            DocumentStatus::Delivered => "DELIVERED",
            DocumentStatus::Invoiced => "INVOICED",
            DocumentStatus::PartiallyInvoiced => "PARTIALLY_INVOICED",
            DocumentStatus::Cancelled => "CANCELLED",
            DocumentStatus::Paid => "PAID",
            DocumentStatus::PartiallyPaid => "PARTIALLY_PAID",
            DocumentStatus::Overdue => "OVERDUE",
            DocumentStatus::Active => "ACTIVE",
            DocumentStatus::Stopped => "STOPPED",
        }
    }
}

impl Default for DocumentStatus {
    fn default() -> Self {
        DocumentStatus::Draft
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = ValidationError;

    /// Case-insensitive; accepts `paid`, `Paid`, `partially_paid`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        DocumentStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown status '{}'", s),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("paid".parse::<DocumentStatus>().unwrap(), DocumentStatus::Paid);
        assert_eq!(
            " Partially_Invoiced ".parse::<DocumentStatus>().unwrap(),
            DocumentStatus::PartiallyInvoiced
        );
    }

    #[test]
    fn test_parse_unknown_status() {
        let err = "ARCHIVED".parse::<DocumentStatus>().unwrap_err();
        assert_eq!(err.field(), "status");
    }

    #[test]
    fn test_wire_names_round_trip() {
        for status in DocumentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_default_is_draft() {
        assert_eq!(DocumentStatus::default(), DocumentStatus::Draft);
    }
}
