//! # salesdesk-db: Database Layer for SalesDesk
//!
//! SQLite storage for sales documents through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SalesDesk Data Flow                              │
//! │                                                                         │
//! │  DocumentService (salesdesk-api)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   salesdesk-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ DocumentRepo   │   │ 001_sales_   │   │   │
//! │  │   │ SqlitePool    │◄───│ LineItemRepo   │   │ documents.sql│   │   │
//! │  │   │ NumberLocks   │    │                │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (SALESDESK_DB_PATH)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`page`] - Page requests and results
//! - [`repository`] - Document and line item repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use salesdesk_db::{Database, DbConfig, PageRequest};
//!
//! let db = Database::new(DbConfig::new("salesdesk.db")).await?;
//! let quotes = db.documents().list_active(DocumentKind::Quote, &PageRequest::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod locks;
pub mod migrations;
pub mod page;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use page::{Page, PageRequest, SortDirection, SortField};
pub use pool::{Database, DbConfig};

pub use repository::document::DocumentRepository;
pub use repository::line_item::LineItemRepository;
