//! # Pagination
//!
//! Page requests and page results for every listing query.
//!
//! Sort keys arrive as caller-facing names (`createdAt`, `total`, ...) and are
//! mapped onto a fixed set of columns. Unknown keys fall back to
//! `createdAt`, so no caller text ever reaches the ORDER BY clause.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Whitelisted sort columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DocumentDate,
    DocumentNumber,
    CustomerName,
    Total,
    Status,
    NextInvoiceDate,
}

impl SortField {
    /// Maps a caller-facing key. Unknown keys give `CreatedAt`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "createdAt" | "created_at" => SortField::CreatedAt,
            "updatedAt" | "updated_at" => SortField::UpdatedAt,
            "documentDate" | "document_date" | "quoteDate" | "orderDate" | "challanDate"
            | "invoiceDate" => SortField::DocumentDate,
            "documentNumber" | "document_number" | "quoteNumber" | "salesOrderNumber"
            | "challanNumber" | "invoiceNumber" => SortField::DocumentNumber,
            "customerName" | "customer_name" => SortField::CustomerName,
            "total" => SortField::Total,
            "status" => SortField::Status,
            "nextInvoiceDate" | "next_invoice_date" => SortField::NextInvoiceDate,
            _ => SortField::CreatedAt,
        }
    }

    /// SQL expressions to order by, most significant first.
    pub(crate) fn columns(&self) -> &'static [&'static str] {
        match self {
            SortField::CreatedAt => &["created_at"],
            SortField::UpdatedAt => &["updated_at"],
            SortField::DocumentDate => &["document_date"],
            // numbers share a prefix per kind, so a shorter one is a smaller
            // one once the sequence outgrows its five digits
            SortField::DocumentNumber => &["LENGTH(document_number)", "document_number"],
            SortField::CustomerName => &["customer_name"],
            // money is TEXT; order numerically
            SortField::Total => &["CAST(total AS REAL)"],
            SortField::Status => &["status"],
            SortField::NextInvoiceDate => &["next_invoice_date"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Which slice of a listing to return.
///
/// ## Defaults
/// page 0, size 20, sorted by `createdAt` descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Clamped to 1..=100 when used.
    pub size: u32,
    pub sort_by: String,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: "createdAt".to_string(),
            direction: SortDirection::Desc,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        PageRequest {
            page,
            size,
            ..PageRequest::default()
        }
    }

    pub fn sorted_by(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = key.into();
        self.direction = direction;
        self
    }

    pub fn limit(&self) -> u32 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.limit())
    }

    pub fn sort_field(&self) -> SortField {
        SortField::from_key(&self.sort_by)
    }

    /// `ORDER BY` body. `id` breaks ties so pages never overlap.
    pub(crate) fn order_by(&self) -> String {
        let direction = self.direction.keyword();
        self.sort_field()
            .columns()
            .iter()
            .chain(std::iter::once(&"id"))
            .map(|column| format!("{} {}", column, direction))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = request.limit();
        Page {
            content,
            page: request.page,
            size,
            total_elements,
            total_pages: total_elements.div_ceil(u64::from(size)),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page, 0);
        assert_eq!(request.limit(), 20);
        assert_eq!(request.sort_field(), SortField::CreatedAt);
        assert_eq!(request.direction, SortDirection::Desc);
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(PageRequest::new(0, 0).limit(), 1);
        assert_eq!(PageRequest::new(0, 500).limit(), 100);
        assert_eq!(PageRequest::new(3, 25).offset(), 75);
    }

    #[test]
    fn test_unknown_sort_key_falls_back() {
        let request = PageRequest::default().sorted_by("1; DROP TABLE x", SortDirection::Asc);
        assert_eq!(request.order_by(), "created_at ASC, id ASC");

        let request = PageRequest::default().sorted_by("invoiceNumber", SortDirection::Asc);
        assert_eq!(request.sort_field(), SortField::DocumentNumber);
    }

    #[test]
    fn test_document_number_orders_by_length_first() {
        let request = PageRequest::default().sorted_by("documentNumber", SortDirection::Desc);
        assert_eq!(
            request.order_by(),
            "LENGTH(document_number) DESC, document_number DESC, id DESC"
        );
    }

    #[test]
    fn test_total_pages() {
        let page: Page<u8> = Page::new(vec![], &PageRequest::new(0, 20), 41);
        assert_eq!(page.total_pages, 3);

        let empty: Page<u8> = Page::new(vec![], &PageRequest::new(0, 20), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let request: PageRequest = serde_json::from_str(r#"{"page": 2, "direction": "asc"}"#).unwrap();
        assert_eq!(request.page, 2);
        assert_eq!(request.size, 20);
        assert_eq!(request.direction, SortDirection::Asc);
    }
}
