//! # Line Item Repository
//!
//! Line items have no lifecycle of their own. They are written and replaced
//! only inside their document's transaction, through the connection-level
//! helpers below, and read back in `sort_order`.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{optional_decimal_text, parse_optional_decimal};
use salesdesk_core::LineItem;

const LINE_ITEM_COLUMNS: &str = "id, document_id, item_id, item_name, item_description, unit, \
     item_details, quantity, rate, discount, discount_percent, discount_amount, amount, \
     tax_percent, tax_amount, sort_order";

/// Repository for reading line items outside a document load.
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    pool: SqlitePool,
}

impl LineItemRepository {
    /// Creates a new LineItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LineItemRepository { pool }
    }

    /// Items of one document, in sort order.
    pub async fn for_document(&self, document_id: &str) -> DbResult<Vec<LineItem>> {
        let mut conn = self.pool.acquire().await?;
        let mut grouped = load_for_documents(&mut *conn, &[document_id.to_string()]).await?;
        Ok(grouped.remove(document_id).unwrap_or_default())
    }

    /// Number of items stored for a document.
    pub async fn count_for_document(&self, document_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM line_items WHERE document_id = ?1")
            .bind(document_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-Level Helpers (used inside document transactions)
// =============================================================================

/// Loads the items of several documents in one query, grouped by document id.
pub(crate) async fn load_for_documents(
    conn: &mut SqliteConnection,
    document_ids: &[String],
) -> DbResult<HashMap<String, Vec<LineItem>>> {
    let mut grouped: HashMap<String, Vec<LineItem>> = HashMap::new();
    if document_ids.is_empty() {
        return Ok(grouped);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    qb.push(LINE_ITEM_COLUMNS);
    qb.push(" FROM line_items WHERE document_id IN (");
    let mut ids = qb.separated(", ");
    for id in document_ids {
        ids.push_bind(id.as_str());
    }
    ids.push_unseparated(") ORDER BY document_id, sort_order, id");

    let rows = qb
        .build_query_as::<LineItemRow>()
        .fetch_all(&mut *conn)
        .await?;
    for row in rows {
        let document_id = row.document_id.clone();
        grouped.entry(document_id).or_default().push(row.into_line_item()?);
    }

    Ok(grouped)
}

/// Inserts every item of a document.
pub(crate) async fn insert_all(
    conn: &mut SqliteConnection,
    document_id: &str,
    items: &[LineItem],
) -> DbResult<()> {
    debug!(document_id = %document_id, count = items.len(), "Inserting line items");

    for item in items {
        sqlx::query(
            r#"
            INSERT INTO line_items (
                id, document_id, item_id, item_name, item_description, unit, item_details,
                quantity, rate, discount, discount_percent, discount_amount, amount,
                tax_percent, tax_amount, sort_order
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16
            )
            "#,
        )
        .bind(&item.id)
        .bind(document_id)
        .bind(&item.item_id)
        .bind(&item.item_name)
        .bind(&item.item_description)
        .bind(&item.unit)
        .bind(&item.item_details)
        .bind(optional_decimal_text(item.quantity))
        .bind(optional_decimal_text(item.rate))
        .bind(optional_decimal_text(item.discount))
        .bind(optional_decimal_text(item.discount_percent))
        .bind(optional_decimal_text(item.discount_amount))
        .bind(optional_decimal_text(item.amount))
        .bind(optional_decimal_text(item.tax_percent))
        .bind(optional_decimal_text(item.tax_amount))
        .bind(item.sort_order)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Deletes every item of a document and inserts `items` in their place.
pub(crate) async fn replace_all(
    conn: &mut SqliteConnection,
    document_id: &str,
    items: &[LineItem],
) -> DbResult<()> {
    let removed = sqlx::query("DELETE FROM line_items WHERE document_id = ?1")
        .bind(document_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    debug!(document_id = %document_id, removed, "Replacing line items");

    insert_all(conn, document_id, items).await
}

// =============================================================================
// Row Type
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct LineItemRow {
    id: String,
    document_id: String,
    item_id: Option<String>,
    item_name: Option<String>,
    item_description: Option<String>,
    unit: Option<String>,
    item_details: Option<String>,
    quantity: Option<String>,
    rate: Option<String>,
    discount: Option<String>,
    discount_percent: Option<String>,
    discount_amount: Option<String>,
    amount: Option<String>,
    tax_percent: Option<String>,
    tax_amount: Option<String>,
    sort_order: i32,
}

impl LineItemRow {
    fn into_line_item(self) -> DbResult<LineItem> {
        Ok(LineItem {
            quantity: parse_optional_decimal("line_items.quantity", self.quantity.as_deref())?,
            rate: parse_optional_decimal("line_items.rate", self.rate.as_deref())?,
            discount: parse_optional_decimal("line_items.discount", self.discount.as_deref())?,
            discount_percent: parse_optional_decimal(
                "line_items.discount_percent",
                self.discount_percent.as_deref(),
            )?,
            discount_amount: parse_optional_decimal(
                "line_items.discount_amount",
                self.discount_amount.as_deref(),
            )?,
            amount: parse_optional_decimal("line_items.amount", self.amount.as_deref())?,
            tax_percent: parse_optional_decimal("line_items.tax_percent", self.tax_percent.as_deref())?,
            tax_amount: parse_optional_decimal("line_items.tax_amount", self.tax_amount.as_deref())?,
            id: self.id,
            item_id: self.item_id,
            item_name: self.item_name,
            item_description: self.item_description,
            unit: self.unit,
            item_details: self.item_details,
            sort_order: self.sort_order,
        })
    }
}
