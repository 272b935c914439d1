//! # Document Service
//!
//! Every operation a caller can perform on a sales document, for all five
//! kinds.
//!
//! ## Call Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  caller ──(request, &Identity)──► DocumentService                      │
//! │                                      │                                  │
//! │                                      ├── validate_request              │
//! │                                      └── DocumentRepository::modify    │
//! │                                            ├── load (or NotFound)      │
//! │                                            ├── mutate (core)           │
//! │                                            └── write, one transaction  │
//! │                                                                         │
//! │  Err(ServiceError) ──► ApiError::from ──► ErrorEnvelope                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Kind-specific operations (`record_payment`, `pause`, `resume`,
//! `advance_recurrence`) reject other kinds with `CoreError::WrongKind`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument};

use salesdesk_core::validation::validate_request;
use salesdesk_core::{
    CoreError, DocumentKind, DocumentRequest, DocumentStatus, Identity, SalesDocument,
};
use salesdesk_db::{Database, Page, PageRequest};

use crate::config::AppConfig;
use crate::error::{ApiError, ServiceError, ServiceResult};

/// Active count plus per-status counts for one document kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatistics {
    pub kind: DocumentKind,
    pub total_active: i64,
    pub by_status: BTreeMap<DocumentStatus, i64>,
}

impl DocumentStatistics {
    pub fn count(&self, status: DocumentStatus) -> i64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Sales document operations over a [`Database`].
#[derive(Debug, Clone)]
pub struct DocumentService {
    db: Database,
    config: AppConfig,
}

impl DocumentService {
    pub fn new(db: Database, config: AppConfig) -> Self {
        DocumentService { db, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// First-sorted page `page` at the configured page size.
    pub fn page_request(&self, page: u32) -> PageRequest {
        PageRequest::new(page, self.config.page_size)
    }

    /// Reads a create/update request body.
    pub fn parse_request(body: &str) -> Result<DocumentRequest, ApiError> {
        Ok(serde_json::from_str(body)?)
    }

    // =========================================================================
    // Create / Update
    // =========================================================================

    /// Validates the request and stores a new document under the next number
    /// of its kind.
    #[instrument(skip(self, request, identity), fields(kind = %request.kind(), user = identity.display_name()))]
    pub async fn create(
        &self,
        mut request: DocumentRequest,
        identity: &Identity,
    ) -> ServiceResult<SalesDocument> {
        validate_request(&request).map_err(CoreError::InvalidRequest)?;

        if request.currency.is_none() {
            request.currency = Some(self.config.default_currency.clone());
        }

        let document = SalesDocument::from_request(&request, identity, Utc::now());
        let document = self.db.documents().create(document).await?;

        info!(
            id = %document.id,
            number = %document.document_number,
            total = %document.total,
            "Sales document created"
        );
        Ok(document)
    }

    /// Rewrites an existing document. The request must be for the stored
    /// document's kind.
    #[instrument(skip(self, request, identity), fields(kind = %request.kind()))]
    pub async fn update(
        &self,
        id: &str,
        request: DocumentRequest,
        identity: &Identity,
    ) -> ServiceResult<SalesDocument> {
        validate_request(&request).map_err(CoreError::InvalidRequest)?;

        let (document, ()) = self
            .db
            .documents()
            .modify(id, |document| -> ServiceResult<()> {
                document.apply_update(&request, identity, Utc::now())?;
                Ok(())
            })
            .await?;

        info!(number = %document.document_number, total = %document.total, "Sales document updated");
        Ok(document)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a document by id. Soft-deleted documents are still returned.
    pub async fn get(&self, id: &str) -> ServiceResult<SalesDocument> {
        self.load(id).await
    }

    pub async fn get_by_number(
        &self,
        kind: DocumentKind,
        number: &str,
    ) -> ServiceResult<SalesDocument> {
        self.db
            .documents()
            .get_by_number(kind, number)
            .await?
            .ok_or_else(|| ServiceError::not_found(number))
    }

    pub async fn list(
        &self,
        kind: DocumentKind,
        page: &PageRequest,
    ) -> ServiceResult<Page<SalesDocument>> {
        Ok(self.db.documents().list_active(kind, page).await?)
    }

    /// Case-insensitive search over number, customer name and profile name.
    /// A blank term lists everything.
    #[instrument(skip(self, page))]
    pub async fn search(
        &self,
        kind: DocumentKind,
        term: &str,
        page: &PageRequest,
    ) -> ServiceResult<Page<SalesDocument>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list(kind, page).await;
        }
        Ok(self.db.documents().search(kind, term, page).await?)
    }

    pub async fn find_by_status(
        &self,
        kind: DocumentKind,
        status: DocumentStatus,
        page: &PageRequest,
    ) -> ServiceResult<Page<SalesDocument>> {
        Ok(self.db.documents().find_by_status(kind, status, page).await?)
    }

    pub async fn find_by_customer(
        &self,
        kind: DocumentKind,
        customer_id: &str,
        page: &PageRequest,
    ) -> ServiceResult<Page<SalesDocument>> {
        Ok(self.db.documents().find_by_customer(kind, customer_id, page).await?)
    }

    pub async fn find_by_challan_type(
        &self,
        challan_type: &str,
        page: &PageRequest,
    ) -> ServiceResult<Page<SalesDocument>> {
        Ok(self.db.documents().find_by_challan_type(challan_type, page).await?)
    }

    // =========================================================================
    // State Changes
    // =========================================================================

    /// Sets any status on any document.
    #[instrument(skip(self, identity))]
    pub async fn update_status(
        &self,
        id: &str,
        status: DocumentStatus,
        identity: &Identity,
    ) -> ServiceResult<SalesDocument> {
        let (document, previous) = self
            .db
            .documents()
            .modify(id, |document| -> ServiceResult<DocumentStatus> {
                let previous = document.status;
                document.set_status(status, identity, Utc::now());
                Ok(previous)
            })
            .await?;

        info!(number = %document.document_number, from = %previous, to = %status, "Status changed");
        Ok(document)
    }

    /// Hides a document from listings. Its number stays taken.
    #[instrument(skip(self, identity))]
    pub async fn soft_delete(&self, id: &str, identity: &Identity) -> ServiceResult<()> {
        let (document, ()) = self
            .db
            .documents()
            .modify(id, |document| -> ServiceResult<()> {
                document.soft_delete(identity, Utc::now());
                Ok(())
            })
            .await?;

        info!(number = %document.document_number, "Sales document deleted");
        Ok(())
    }

    /// Adds a payment to an invoice. The invoice becomes PAID once nothing
    /// is left to pay.
    ///
    /// Concurrent payments on one invoice are applied one after another;
    /// none is lost.
    #[instrument(skip(self, identity))]
    pub async fn record_payment(
        &self,
        id: &str,
        amount: Decimal,
        identity: &Identity,
    ) -> ServiceResult<SalesDocument> {
        let (invoice, ()) = self
            .db
            .documents()
            .modify(id, |invoice| -> ServiceResult<()> {
                invoice.record_payment(amount, identity, Utc::now())?;
                Ok(())
            })
            .await?;

        info!(
            number = %invoice.document_number,
            amount = %amount,
            balance_due = ?invoice.balance_due(),
            status = %invoice.status,
            "Payment recorded"
        );
        Ok(invoice)
    }

    /// Stops a recurring profile.
    #[instrument(skip(self, identity))]
    pub async fn pause(&self, id: &str, identity: &Identity) -> ServiceResult<SalesDocument> {
        let (profile, ()) = self
            .db
            .documents()
            .modify(id, |profile| -> ServiceResult<()> {
                profile.pause(identity, Utc::now())?;
                Ok(())
            })
            .await?;

        info!(number = %profile.document_number, "Recurring profile paused");
        Ok(profile)
    }

    /// Reactivates a recurring profile.
    #[instrument(skip(self, identity))]
    pub async fn resume(&self, id: &str, identity: &Identity) -> ServiceResult<SalesDocument> {
        let (profile, ()) = self
            .db
            .documents()
            .modify(id, |profile| -> ServiceResult<()> {
                profile.resume(identity, Utc::now())?;
                Ok(())
            })
            .await?;

        info!(number = %profile.document_number, "Recurring profile resumed");
        Ok(profile)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    pub async fn statistics(&self, kind: DocumentKind) -> ServiceResult<DocumentStatistics> {
        let documents = self.db.documents();
        let total_active = documents.count_active(kind).await?;

        let mut by_status = BTreeMap::new();
        for status in kind.tracked_statuses() {
            by_status.insert(*status, documents.count_by_status(kind, *status).await?);
        }

        debug!(kind = %kind, total_active, "Statistics computed");
        Ok(DocumentStatistics {
            kind,
            total_active,
            by_status,
        })
    }

    // =========================================================================
    // Recurring Profiles
    // =========================================================================

    /// Profiles with an invoice due on or before `today`.
    pub async fn due_recurring_profiles(&self, today: NaiveDate) -> ServiceResult<Vec<SalesDocument>> {
        Ok(self.db.documents().find_due_recurring(today).await?)
    }

    /// Records that a profile's current occurrence has been invoiced and
    /// moves its cursor to the next one.
    #[instrument(skip(self, identity))]
    pub async fn advance_recurrence(
        &self,
        id: &str,
        identity: &Identity,
    ) -> ServiceResult<SalesDocument> {
        let (profile, next) = self
            .db
            .documents()
            .modify(id, |profile| -> ServiceResult<Option<NaiveDate>> {
                Ok(profile.advance_recurrence(identity, Utc::now())?)
            })
            .await?;

        match next {
            Some(next) => info!(number = %profile.document_number, next = %next, "Recurrence advanced"),
            None => info!(number = %profile.document_number, "Recurrence schedule finished"),
        }
        Ok(profile)
    }

    // =========================================================================
    // Scheduled Queries
    // =========================================================================

    pub async fn expired_quotes(&self, today: NaiveDate) -> ServiceResult<Vec<SalesDocument>> {
        Ok(self.db.documents().find_expired_quotes(today).await?)
    }

    pub async fn overdue_invoices(&self, today: NaiveDate) -> ServiceResult<Vec<SalesDocument>> {
        Ok(self.db.documents().find_overdue_invoices(today).await?)
    }

    pub async fn unpaid_invoices(&self) -> ServiceResult<Vec<SalesDocument>> {
        Ok(self.db.documents().find_unpaid_invoices().await?)
    }

    async fn load(&self, id: &str) -> ServiceResult<SalesDocument> {
        self.db
            .documents()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(id))
    }
}
