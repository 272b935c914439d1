//! # salesdesk-core: Pure Business Logic for SalesDesk
//!
//! This crate holds the sales-document engine: the arithmetic that turns
//! line items into document totals, the document number sequence, the
//! status vocabulary and the recurring-invoice schedule. Nothing in here
//! performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SalesDesk Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               salesdesk-api (DocumentService)                   │   │
//! │  │    create, update, record_payment, pause, statistics, ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ salesdesk-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌───────────┐ ┌──────────┐ ┌───────────┐ ┌────────────────┐   │   │
//! │  │  │ line_item │ │  totals  │ │ numbering │ │   recurrence   │   │   │
//! │  │  │  amount   │ │ subTotal │ │ INV-00001 │ │ WEEK/MONTH/YR  │   │   │
//! │  │  └───────────┘ │  total   │ └───────────┘ └────────────────┘   │   │
//! │  │                │ balance  │                                     │   │
//! │  │  ┌──────────┐  └──────────┘  ┌──────────┐  ┌──────────────┐    │   │
//! │  │  │ document │                │  status  │  │  validation  │    │   │
//! │  │  └──────────┘                └──────────┘  └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 salesdesk-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Decimal scales and rounding helpers
//! - [`line_item`] - Line item and its amount calculation
//! - [`totals`] - The single totals engine shared by every document kind
//! - [`numbering`] - Document number format, parse and sequence
//! - [`status`] - Document status vocabulary
//! - [`recurrence`] - Recurring-invoice schedule
//! - [`document`] - The generic sales document and its request payload
//! - [`identity`] - Acting principal for audit fields
//! - [`validation`] - Request validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use salesdesk_core::line_item::{LineItem, LineItemInput};
//!
//! let input = LineItemInput {
//!     quantity: Some(Decimal::from(2)),
//!     rate: Some(Decimal::from(100)),
//!     discount_percent: Some(Decimal::from(10)),
//!     ..LineItemInput::default()
//! };
//! let item = LineItem::from_input(&input, 0);
//! assert_eq!(item.amount, Some(Decimal::from(180)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod identity;
pub mod line_item;
pub mod money;
pub mod numbering;
pub mod recurrence;
pub mod status;
pub mod totals;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use document::{
    DetailsRequest, DocumentDetails, DocumentKind, DocumentRequest, SalesDocument,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use identity::Identity;
pub use line_item::{LineItem, LineItemInput};
pub use recurrence::{RecurrenceSchedule, RepeatUnit};
pub use status::DocumentStatus;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency stamped on new documents when the request names none.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Audit name used when no authenticated principal is available.
pub const SYSTEM_USER: &str = "system";
