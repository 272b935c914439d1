//! # Services
//!
//! Application services. Each one owns a [`salesdesk_db::Database`] handle
//! and returns [`crate::error::ServiceResult`].

pub mod document;

pub use document::{DocumentService, DocumentStatistics};
