//! # Document Repository
//!
//! Database operations for sales documents of every kind.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     create(document)                                    │
//! │                                                                         │
//! │  1. NumberLocks::acquire(kind)      ← serializes creates of one kind   │
//! │  2. BEGIN                                                              │
//! │  3. SELECT document_number ... WHERE kind = ?                          │
//! │     └── numbering::next_number (fails on a malformed stored number)    │
//! │  4. recalculate_totals()                                               │
//! │  5. INSERT sales_documents + INSERT line_items                         │
//! │  6. COMMIT                          ← UNIQUE(kind, document_number)    │
//! │  7. release lock                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Change Flow
//! ```text
//! modify(id, change)
//!   BEGIN IMMEDIATE                   ← write lock before the read
//!   SELECT header + line items
//!   change(&mut document)?            ← core mutation; Err rolls back
//!   recalculate_totals()
//!   UPDATE header, replace line items
//!   COMMIT
//! ```
//!
//! Reads take the header and its line items from one transaction, so a
//! reader never sees new totals next to old items.
//!
//! Every listing and count sees active rows only. `get_by_id` and
//! `get_by_number` also return soft-deleted rows.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::locks::NumberLocks;
use crate::page::{Page, PageRequest};
use crate::repository::line_item;
use crate::repository::{decimal_text, parse_decimal, parse_optional_decimal};
use salesdesk_core::document::{
    DeliveryChallanDetails, InvoiceDetails, QuoteDetails, RecurringInvoiceDetails,
    SalesOrderDetails,
};
use salesdesk_core::numbering;
use salesdesk_core::{
    DocumentDetails, DocumentKind, DocumentStatus, LineItem, RepeatUnit, SalesDocument,
};

/// Columns fixed at insert time.
const IMMUTABLE_COLUMNS: [&str; 5] = ["id", "kind", "document_number", "created_at", "created_by"];

/// Columns rewritten by `update`, in bind order.
const MUTABLE_COLUMNS: [&str; 42] = [
    "customer_id",
    "customer_name",
    "reference_number",
    "document_date",
    "salesperson",
    "subject",
    "currency",
    "sub_total",
    "discount_total",
    "tax_total",
    "shipping_charges",
    "adjustment",
    "adjustment_label",
    "round_off",
    "total",
    "status",
    "customer_notes",
    "terms_and_conditions",
    "attachment_url",
    "is_active",
    "expiry_date",
    "project_name",
    "quote_id",
    "expected_shipment_date",
    "delivery_method",
    "challan_type",
    "sales_order_id",
    "payment_terms",
    "order_number",
    "due_date",
    "amount_paid",
    "balance_due",
    "profile_name",
    "repeat_every",
    "repeat_unit",
    "start_on",
    "ends_on",
    "never_expires",
    "next_invoice_date",
    "last_invoice_date",
    "updated_at",
    "updated_by",
];

/// Listing filters on top of `kind = ? AND is_active = 1`.
#[derive(Debug, Clone, Copy)]
enum Filter<'a> {
    All,
    Status(DocumentStatus),
    Customer(&'a str),
    ChallanType(&'a str),
    Search(&'a str),
}

/// Repository for sales document database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.documents();
///
/// let quote = repo.create(SalesDocument::from_request(&request, &identity, Utc::now())).await?;
/// assert_eq!(quote.document_number, "QT-00001");
///
/// let sent = repo.find_by_status(DocumentKind::Quote, DocumentStatus::Sent, &PageRequest::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
    locks: Arc<NumberLocks>,
}

impl DocumentRepository {
    /// Creates a new DocumentRepository.
    pub fn new(pool: SqlitePool, locks: Arc<NumberLocks>) -> Self {
        DocumentRepository { pool, locks }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new document, assigning the next number of its kind.
    ///
    /// ## Returns
    /// The stored document, with `document_number` set and totals
    /// recalculated.
    ///
    /// ## Errors
    /// - `CorruptValue` when an existing number of this kind can't be parsed
    /// - `UniqueViolation` when another writer took the same number
    pub async fn create(&self, mut document: SalesDocument) -> DbResult<SalesDocument> {
        let kind = document.kind();
        let _guard = self.locks.acquire(kind).await;

        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        let existing = existing_numbers_in(&mut *tx, kind).await?;
        document.document_number = numbering::next_number(kind, existing.iter().map(String::as_str))?;
        document.recalculate_totals();

        debug!(
            id = %document.id,
            kind = %kind,
            number = %document.document_number,
            "Inserting document"
        );

        let row = DocumentRow::from_document(&document);
        let sql = insert_sql();
        let query = sqlx::query(&sql)
            .bind(&row.id)
            .bind(row.kind)
            .bind(&row.document_number)
            .bind(row.created_at)
            .bind(&row.created_by);
        bind_mutable(query, &row).execute(&mut *tx).await.map_err(|e| {
            let err = DbError::from(e);
            if matches!(err, DbError::UniqueViolation { .. }) {
                warn!(kind = %kind, number = %row.document_number, "Document number already taken");
                return DbError::duplicate("document_number", row.document_number.clone());
            }
            err
        })?;

        line_item::insert_all(&mut *tx, &document.id, &document.items).await?;

        tx.commit().await?;

        info!(
            id = %document.id,
            number = %document.document_number,
            total = %document.total,
            "Document created"
        );
        Ok(document)
    }

    /// Loads a document, applies `change` to it and writes it back, all in
    /// one write transaction.
    ///
    /// The write lock is taken before the read, so concurrent changes to the
    /// same document queue up behind each other instead of overwriting one
    /// another. Totals are recalculated before the write. When `change`
    /// fails nothing is written.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let (invoice, ()) = repo
    ///     .modify(&id, |invoice| {
    ///         invoice.record_payment(amount, &identity, now).map_err(DbError::from)
    ///     })
    ///     .await?;
    /// ```
    ///
    /// ## Errors
    /// - `NotFound` when no document has this id
    /// - whatever `change` returns
    pub async fn modify<T, E, F>(&self, id: &str, change: F) -> Result<(SalesDocument, T), E>
    where
        F: FnOnce(&mut SalesDocument) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await.map_err(DbError::from)?;

        let Some(mut document) = fetch_by_id(&mut *tx, id).await? else {
            return Err(DbError::not_found("SalesDocument", id).into());
        };

        let outcome = change(&mut document)?;
        document.recalculate_totals();

        debug!(id = %document.id, items = document.items.len(), "Writing document");
        write_document(&mut *tx, &document).await?;

        tx.commit().await.map_err(DbError::from)?;
        Ok((document, outcome))
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Gets a document by id, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SalesDocument>> {
        let mut tx = self.pool.begin().await?;
        let document = fetch_by_id(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(document)
    }

    /// Gets a document by its kind and number, active or not.
    pub async fn get_by_number(
        &self,
        kind: DocumentKind,
        number: &str,
    ) -> DbResult<Option<SalesDocument>> {
        let sql = format!(
            "SELECT {} FROM sales_documents WHERE kind = ?1 AND document_number = ?2",
            select_columns()
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(kind)
            .bind(number)
            .fetch_optional(&mut *tx)
            .await?;
        let document = hydrate(&mut *tx, row.into_iter().collect()).await?.pop();
        tx.commit().await?;

        Ok(document)
    }

    pub async fn exists_by_number(&self, kind: DocumentKind, number: &str) -> DbResult<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sales_documents WHERE kind = ?1 AND document_number = ?2)",
        )
        .bind(kind)
        .bind(number)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }

    /// Every number ever assigned to `kind`, including soft-deleted rows.
    pub async fn existing_numbers(&self, kind: DocumentKind) -> DbResult<Vec<String>> {
        let mut conn = self.pool.acquire().await?;
        existing_numbers_in(&mut *conn, kind).await
    }

    // =========================================================================
    // Listings
    // =========================================================================

    pub async fn list_active(
        &self,
        kind: DocumentKind,
        request: &PageRequest,
    ) -> DbResult<Page<SalesDocument>> {
        self.page(kind, Filter::All, request).await
    }

    /// Case-insensitive substring search.
    ///
    /// Matches the document number, the customer name, or (for recurring
    /// profiles) the profile name.
    pub async fn search(
        &self,
        kind: DocumentKind,
        term: &str,
        request: &PageRequest,
    ) -> DbResult<Page<SalesDocument>> {
        self.page(kind, Filter::Search(term), request).await
    }

    pub async fn find_by_status(
        &self,
        kind: DocumentKind,
        status: DocumentStatus,
        request: &PageRequest,
    ) -> DbResult<Page<SalesDocument>> {
        self.page(kind, Filter::Status(status), request).await
    }

    pub async fn find_by_customer(
        &self,
        kind: DocumentKind,
        customer_id: &str,
        request: &PageRequest,
    ) -> DbResult<Page<SalesDocument>> {
        self.page(kind, Filter::Customer(customer_id), request).await
    }

    /// Delivery challans of one challan type.
    pub async fn find_by_challan_type(
        &self,
        challan_type: &str,
        request: &PageRequest,
    ) -> DbResult<Page<SalesDocument>> {
        self.page(DocumentKind::DeliveryChallan, Filter::ChallanType(challan_type), request)
            .await
    }

    // =========================================================================
    // Counts
    // =========================================================================

    pub async fn count_active(&self, kind: DocumentKind) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        count_in(&mut *conn, kind, Filter::All).await
    }

    pub async fn count_by_status(&self, kind: DocumentKind, status: DocumentStatus) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        count_in(&mut *conn, kind, Filter::Status(status)).await
    }

    // =========================================================================
    // Scheduled Queries
    // =========================================================================

    /// Active recurring profiles in ACTIVE status whose next invoice date is
    /// on or before `today`, oldest first.
    pub async fn find_due_recurring(&self, today: NaiveDate) -> DbResult<Vec<SalesDocument>> {
        let sql = format!(
            r#"
            SELECT {} FROM sales_documents
            WHERE kind = 'RECURRING_INVOICE'
              AND is_active = 1
              AND status = 'ACTIVE'
              AND next_invoice_date IS NOT NULL
              AND next_invoice_date <= ?1
            ORDER BY next_invoice_date, created_at, id
            "#,
            select_columns()
        );
        self.fetch_all(&sql, Some(today)).await
    }

    /// Active SENT quotes whose expiry date is before `today`.
    pub async fn find_expired_quotes(&self, today: NaiveDate) -> DbResult<Vec<SalesDocument>> {
        let sql = format!(
            r#"
            SELECT {} FROM sales_documents
            WHERE kind = 'QUOTE'
              AND is_active = 1
              AND status = 'SENT'
              AND expiry_date IS NOT NULL
              AND expiry_date < ?1
            ORDER BY expiry_date, created_at, id
            "#,
            select_columns()
        );
        self.fetch_all(&sql, Some(today)).await
    }

    /// Active invoices past their due date with a positive balance.
    pub async fn find_overdue_invoices(&self, today: NaiveDate) -> DbResult<Vec<SalesDocument>> {
        let sql = format!(
            r#"
            SELECT {} FROM sales_documents
            WHERE kind = 'INVOICE'
              AND is_active = 1
              AND due_date IS NOT NULL
              AND due_date < ?1
              AND CAST(balance_due AS REAL) > 0
            ORDER BY due_date, created_at, id
            "#,
            select_columns()
        );
        self.fetch_all(&sql, Some(today)).await
    }

    /// Active invoices with a positive balance.
    pub async fn find_unpaid_invoices(&self) -> DbResult<Vec<SalesDocument>> {
        let sql = format!(
            r#"
            SELECT {} FROM sales_documents
            WHERE kind = 'INVOICE'
              AND is_active = 1
              AND CAST(balance_due AS REAL) > 0
            ORDER BY created_at, id
            "#,
            select_columns()
        );
        self.fetch_all(&sql, None).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Count, header page and line items come from one read transaction.
    async fn page(
        &self,
        kind: DocumentKind,
        filter: Filter<'_>,
        request: &PageRequest,
    ) -> DbResult<Page<SalesDocument>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        qb.push(select_columns());
        qb.push(" FROM sales_documents");
        push_where(&mut qb, kind, filter);
        qb.push(" ORDER BY ");
        qb.push(request.order_by());
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(request.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(request.offset() as i64);

        debug!(kind = %kind, ?filter, page = request.page, size = request.limit(), "Listing documents");

        let mut tx = self.pool.begin().await?;
        let total = count_in(&mut *tx, kind, filter).await?;
        let rows = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&mut *tx)
            .await?;
        let content = hydrate(&mut *tx, rows).await?;
        tx.commit().await?;

        Ok(Page::new(content, request, total as u64))
    }

    /// Runs a header query (with an optional `?1` date) and hydrates the rows
    /// in the same read transaction.
    async fn fetch_all(&self, sql: &str, date: Option<NaiveDate>) -> DbResult<Vec<SalesDocument>> {
        let mut tx = self.pool.begin().await?;

        let mut query = sqlx::query_as::<_, DocumentRow>(sql);
        if let Some(date) = date {
            query = query.bind(date);
        }
        let rows = query.fetch_all(&mut *tx).await?;
        let documents = hydrate(&mut *tx, rows).await?;

        tx.commit().await?;
        Ok(documents)
    }
}

/// Opens a write transaction that holds SQLite's write lock from the start.
///
/// A plain deferred `BEGIN` that reads first and writes later cannot wait for
/// a concurrent writer; it fails with `SQLITE_BUSY` instead.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

// =============================================================================
// SQL Helpers
// =============================================================================

async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<SalesDocument>> {
    let sql = format!("SELECT {} FROM sales_documents WHERE id = ?1", select_columns());
    let row = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(hydrate(conn, row.into_iter().collect()).await?.pop())
}

/// Attaches line items to header rows, keeping row order. Must run on the
/// connection (and transaction) the rows were read from.
async fn hydrate(conn: &mut SqliteConnection, rows: Vec<DocumentRow>) -> DbResult<Vec<SalesDocument>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut items: HashMap<String, Vec<LineItem>> = line_item::load_for_documents(conn, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let own = items.remove(&row.id).unwrap_or_default();
            row.into_document(own)
        })
        .collect()
}

async fn count_in(conn: &mut SqliteConnection, kind: DocumentKind, filter: Filter<'_>) -> DbResult<i64> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM sales_documents");
    push_where(&mut qb, kind, filter);

    let count = qb.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;
    Ok(count)
}

/// Rewrites every mutable column and replaces the line items. Number, kind
/// and creation audit fields are never written.
async fn write_document(conn: &mut SqliteConnection, document: &SalesDocument) -> DbResult<()> {
    let row = DocumentRow::from_document(document);
    let sql = update_sql();
    let query = sqlx::query(&sql).bind(&row.id).bind(row.kind);
    let result = bind_mutable(query, &row).execute(&mut *conn).await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("SalesDocument", &document.id));
    }

    line_item::replace_all(conn, &document.id, &document.items).await
}

async fn existing_numbers_in(conn: &mut SqliteConnection, kind: DocumentKind) -> DbResult<Vec<String>> {
    let numbers: Vec<String> =
        sqlx::query_scalar("SELECT document_number FROM sales_documents WHERE kind = ?1")
            .bind(kind)
            .fetch_all(&mut *conn)
            .await?;

    Ok(numbers)
}

fn select_columns() -> String {
    IMMUTABLE_COLUMNS
        .iter()
        .chain(MUTABLE_COLUMNS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_sql() -> String {
    let count = IMMUTABLE_COLUMNS.len() + MUTABLE_COLUMNS.len();
    let placeholders: Vec<String> = (1..=count).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO sales_documents ({}) VALUES ({})",
        select_columns(),
        placeholders.join(", ")
    )
}

/// `?1` is the id and `?2` the kind; SET placeholders start at `?3`.
fn update_sql() -> String {
    let assignments: Vec<String> = MUTABLE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ?{}", column, i + 3))
        .collect();
    format!(
        "UPDATE sales_documents SET {} WHERE id = ?1 AND kind = ?2",
        assignments.join(", ")
    )
}

fn push_where<'a>(qb: &mut QueryBuilder<'a, Sqlite>, kind: DocumentKind, filter: Filter<'a>) {
    qb.push(" WHERE kind = ");
    qb.push_bind(kind);
    qb.push(" AND is_active = 1");

    match filter {
        Filter::All => {}
        Filter::Status(status) => {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        Filter::Customer(customer_id) => {
            qb.push(" AND customer_id = ");
            qb.push_bind(customer_id);
        }
        Filter::ChallanType(challan_type) => {
            qb.push(" AND challan_type = ");
            qb.push_bind(challan_type);
        }
        Filter::Search(term) => {
            let pattern = format!("%{}%", escape_like(&term.trim().to_lowercase()));
            qb.push(" AND (LOWER(document_number) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR LOWER(COALESCE(customer_name, '')) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR LOWER(COALESCE(profile_name, '')) LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\')");
        }
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Binds [`MUTABLE_COLUMNS`] in order.
fn bind_mutable<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    row: &'q DocumentRow,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&row.customer_id)
        .bind(&row.customer_name)
        .bind(&row.reference_number)
        .bind(row.document_date)
        .bind(&row.salesperson)
        .bind(&row.subject)
        .bind(&row.currency)
        .bind(&row.sub_total)
        .bind(&row.discount_total)
        .bind(&row.tax_total)
        .bind(&row.shipping_charges)
        .bind(&row.adjustment)
        .bind(&row.adjustment_label)
        .bind(&row.round_off)
        .bind(&row.total)
        .bind(row.status)
        .bind(&row.customer_notes)
        .bind(&row.terms_and_conditions)
        .bind(&row.attachment_url)
        .bind(row.is_active)
        .bind(row.expiry_date)
        .bind(&row.project_name)
        .bind(&row.quote_id)
        .bind(row.expected_shipment_date)
        .bind(&row.delivery_method)
        .bind(&row.challan_type)
        .bind(&row.sales_order_id)
        .bind(&row.payment_terms)
        .bind(&row.order_number)
        .bind(row.due_date)
        .bind(&row.amount_paid)
        .bind(&row.balance_due)
        .bind(&row.profile_name)
        .bind(row.repeat_every)
        .bind(row.repeat_unit)
        .bind(row.start_on)
        .bind(row.ends_on)
        .bind(row.never_expires)
        .bind(row.next_invoice_date)
        .bind(row.last_invoice_date)
        .bind(row.updated_at)
        .bind(&row.updated_by)
}

// =============================================================================
// Row Type
// =============================================================================

/// Flat image of one `sales_documents` row. Money is TEXT.
#[derive(Debug, Clone, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    kind: DocumentKind,
    document_number: String,
    created_at: DateTime<Utc>,
    created_by: String,

    customer_id: String,
    customer_name: Option<String>,
    reference_number: Option<String>,
    document_date: NaiveDate,
    salesperson: Option<String>,
    subject: Option<String>,
    currency: String,
    sub_total: String,
    discount_total: String,
    tax_total: String,
    shipping_charges: String,
    adjustment: String,
    adjustment_label: Option<String>,
    round_off: String,
    total: String,
    status: DocumentStatus,
    customer_notes: Option<String>,
    terms_and_conditions: Option<String>,
    attachment_url: Option<String>,
    is_active: bool,

    expiry_date: Option<NaiveDate>,
    project_name: Option<String>,
    quote_id: Option<String>,
    expected_shipment_date: Option<NaiveDate>,
    delivery_method: Option<String>,
    challan_type: Option<String>,
    sales_order_id: Option<String>,
    payment_terms: Option<String>,
    order_number: Option<String>,
    due_date: Option<NaiveDate>,
    amount_paid: Option<String>,
    balance_due: Option<String>,
    profile_name: Option<String>,
    repeat_every: Option<i64>,
    repeat_unit: Option<RepeatUnit>,
    start_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
    never_expires: bool,
    next_invoice_date: Option<NaiveDate>,
    last_invoice_date: Option<NaiveDate>,

    updated_at: DateTime<Utc>,
    updated_by: Option<String>,
}

impl DocumentRow {
    fn from_document(doc: &SalesDocument) -> Self {
        let mut row = DocumentRow {
            id: doc.id.clone(),
            kind: doc.kind(),
            document_number: doc.document_number.clone(),
            created_at: doc.created_at,
            created_by: doc.created_by.clone(),
            customer_id: doc.customer_id.clone(),
            customer_name: doc.customer_name.clone(),
            reference_number: doc.reference_number.clone(),
            document_date: doc.document_date,
            salesperson: doc.salesperson.clone(),
            subject: doc.subject.clone(),
            currency: doc.currency.clone(),
            sub_total: decimal_text(doc.sub_total),
            discount_total: decimal_text(doc.discount_total),
            tax_total: decimal_text(doc.tax_total),
            shipping_charges: decimal_text(doc.shipping_charges),
            adjustment: decimal_text(doc.adjustment),
            adjustment_label: doc.adjustment_label.clone(),
            round_off: "0".to_string(),
            total: decimal_text(doc.total),
            status: doc.status,
            customer_notes: doc.customer_notes.clone(),
            terms_and_conditions: doc.terms_and_conditions.clone(),
            attachment_url: doc.attachment_url.clone(),
            is_active: doc.active,
            expiry_date: None,
            project_name: None,
            quote_id: None,
            expected_shipment_date: None,
            delivery_method: None,
            challan_type: None,
            sales_order_id: None,
            payment_terms: None,
            order_number: None,
            due_date: None,
            amount_paid: None,
            balance_due: None,
            profile_name: None,
            repeat_every: None,
            repeat_unit: None,
            start_on: None,
            ends_on: None,
            never_expires: false,
            next_invoice_date: None,
            last_invoice_date: None,
            updated_at: doc.updated_at,
            updated_by: doc.updated_by.clone(),
        };

        match &doc.details {
            DocumentDetails::Quote(d) => {
                row.expiry_date = d.expiry_date;
                row.project_name = d.project_name.clone();
            }
            DocumentDetails::SalesOrder(d) => {
                row.quote_id = d.quote_id.clone();
                row.expected_shipment_date = d.expected_shipment_date;
                row.payment_terms = d.payment_terms.clone();
                row.delivery_method = d.delivery_method.clone();
            }
            DocumentDetails::DeliveryChallan(d) => {
                row.sales_order_id = d.sales_order_id.clone();
                row.challan_type = d.challan_type.clone();
            }
            DocumentDetails::Invoice(d) => {
                row.sales_order_id = d.sales_order_id.clone();
                row.order_number = d.order_number.clone();
                row.due_date = d.due_date;
                row.payment_terms = d.payment_terms.clone();
                row.amount_paid = Some(decimal_text(d.amount_paid));
                row.balance_due = Some(decimal_text(d.balance_due));
            }
            DocumentDetails::RecurringInvoice(d) => {
                row.profile_name = Some(d.profile_name.clone());
                row.repeat_every = d.repeat_every.map(i64::from);
                row.repeat_unit = d.repeat_unit;
                row.start_on = d.start_on;
                row.ends_on = d.ends_on;
                row.never_expires = d.never_expires;
                row.next_invoice_date = d.next_invoice_date;
                row.last_invoice_date = d.last_invoice_date;
                row.payment_terms = d.payment_terms.clone();
                row.round_off = decimal_text(d.round_off);
            }
        }

        row
    }

    fn into_document(self, items: Vec<LineItem>) -> DbResult<SalesDocument> {
        let details = match self.kind {
            DocumentKind::Quote => DocumentDetails::Quote(QuoteDetails {
                expiry_date: self.expiry_date,
                project_name: self.project_name,
            }),
            DocumentKind::SalesOrder => DocumentDetails::SalesOrder(SalesOrderDetails {
                quote_id: self.quote_id,
                expected_shipment_date: self.expected_shipment_date,
                payment_terms: self.payment_terms,
                delivery_method: self.delivery_method,
            }),
            DocumentKind::DeliveryChallan => DocumentDetails::DeliveryChallan(DeliveryChallanDetails {
                sales_order_id: self.sales_order_id,
                challan_type: self.challan_type,
            }),
            DocumentKind::Invoice => DocumentDetails::Invoice(InvoiceDetails {
                sales_order_id: self.sales_order_id,
                order_number: self.order_number,
                due_date: self.due_date,
                payment_terms: self.payment_terms,
                amount_paid: parse_optional_decimal("amount_paid", self.amount_paid.as_deref())?
                    .unwrap_or_default(),
                balance_due: parse_optional_decimal("balance_due", self.balance_due.as_deref())?
                    .unwrap_or_default(),
            }),
            DocumentKind::RecurringInvoice => {
                let repeat_every = self
                    .repeat_every
                    .map(|n| u32::try_from(n).map_err(|_| DbError::corrupt("repeat_every", n.to_string())))
                    .transpose()?;
                DocumentDetails::RecurringInvoice(RecurringInvoiceDetails {
                    profile_name: self.profile_name.unwrap_or_default(),
                    repeat_every,
                    repeat_unit: self.repeat_unit,
                    start_on: self.start_on,
                    ends_on: self.ends_on,
                    never_expires: self.never_expires,
                    next_invoice_date: self.next_invoice_date,
                    last_invoice_date: self.last_invoice_date,
                    payment_terms: self.payment_terms,
                    round_off: parse_decimal("round_off", &self.round_off)?,
                })
            }
        };

        Ok(SalesDocument {
            sub_total: parse_decimal("sub_total", &self.sub_total)?,
            discount_total: parse_decimal("discount_total", &self.discount_total)?,
            tax_total: parse_decimal("tax_total", &self.tax_total)?,
            shipping_charges: parse_decimal("shipping_charges", &self.shipping_charges)?,
            adjustment: parse_decimal("adjustment", &self.adjustment)?,
            total: parse_decimal("total", &self.total)?,
            id: self.id,
            document_number: self.document_number,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            reference_number: self.reference_number,
            document_date: self.document_date,
            salesperson: self.salesperson,
            subject: self.subject,
            currency: self.currency,
            items,
            adjustment_label: self.adjustment_label,
            status: self.status,
            customer_notes: self.customer_notes,
            terms_and_conditions: self.terms_and_conditions,
            attachment_url: self.attachment_url,
            active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
            details,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
