//! # salesdesk-api: Sales Document Services
//!
//! The orchestration layer over `salesdesk-core` and `salesdesk-db`.
//!
//! ## Module Organization
//!
//! - [`services`] - `DocumentService`, one entry point per operation
//! - [`error`] - `ServiceError`, `ApiError` and the error envelope
//! - [`config`] - `AppConfig` from `SALESDESK_*` environment variables
//! - [`telemetry`] - tracing subscriber setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use salesdesk_api::{AppConfig, DocumentService};
//! use salesdesk_core::Identity;
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::new(config.db_config()).await?;
//! let service = DocumentService::new(db, config);
//!
//! let quote = service.create(request, &Identity::from_principal(Some("asha"))).await?;
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod telemetry;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ErrorCode, ErrorEnvelope, ServiceError, ServiceResult};
pub use services::{DocumentService, DocumentStatistics};
