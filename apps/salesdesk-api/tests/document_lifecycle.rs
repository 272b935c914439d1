//! End-to-end document scenarios through `DocumentService` against an
//! in-memory database.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use salesdesk_api::{ApiError, AppConfig, DocumentService, ErrorCode};
use salesdesk_core::document::{InvoiceTerms, QuoteDetails, RecurringProfileRequest};
use salesdesk_core::{
    DetailsRequest, DocumentDetails, DocumentKind, DocumentRequest, DocumentStatus, Identity,
    LineItemInput, RepeatUnit,
};
use salesdesk_db::{Database, DbConfig, PageRequest};

async fn service() -> DocumentService {
    service_with(AppConfig::default()).await
}

async fn service_with(config: AppConfig) -> DocumentService {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    DocumentService::new(db, config)
}

fn asha() -> Identity {
    Identity::from_principal(Some("asha"))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two lines worth 180 and 50, adjustment 5, shipping 20.
fn priced_request(details: DetailsRequest) -> DocumentRequest {
    DocumentRequest {
        customer_name: Some("Acme Traders".to_string()),
        line_items: Some(vec![
            LineItemInput {
                item_name: Some("Cable".to_string()),
                quantity: Some(dec!(2)),
                rate: Some(dec!(100)),
                discount_percent: Some(dec!(10)),
                ..LineItemInput::default()
            },
            LineItemInput {
                item_name: Some("Connector".to_string()),
                quantity: Some(dec!(1)),
                rate: Some(dec!(50)),
                discount_percent: Some(dec!(0)),
                ..LineItemInput::default()
            },
        ]),
        adjustment: Some(dec!(5)),
        shipping_charges: Some(dec!(20)),
        ..DocumentRequest::new("cust-acme", details)
    }
}

fn weekly_profile(start: NaiveDate) -> DocumentRequest {
    DocumentRequest::new(
        "cust-acme",
        DetailsRequest::RecurringInvoice(RecurringProfileRequest {
            profile_name: Some("Weekly maintenance".to_string()),
            repeat_every: Some(1),
            repeat_unit: Some(RepeatUnit::Week),
            start_on: Some(start),
            never_expires: Some(true),
            ..RecurringProfileRequest::default()
        }),
    )
}

#[tokio::test]
async fn test_quote_totals() {
    let service = service().await;

    let quote = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Quote)), &asha())
        .await
        .unwrap();

    assert_eq!(quote.document_number, "QT-00001");
    assert_eq!(quote.status, DocumentStatus::Draft);
    assert_eq!(quote.items[0].amount, Some(dec!(180)));
    assert_eq!(quote.items[1].amount, Some(dec!(50)));
    assert_eq!(quote.sub_total, dec!(230));
    assert_eq!(quote.shipping_charges, dec!(20));
    assert_eq!(quote.total, dec!(235));
    assert_eq!(quote.created_by, "asha");
    assert_eq!(quote.currency, "INR");

    let loaded = service.get(&quote.id).await.unwrap();
    assert_eq!(loaded.total, dec!(235));
    assert_eq!(loaded.items.len(), 2);
}

#[tokio::test]
async fn test_invoice_payments_until_paid() {
    let service = service().await;
    let ravi = Identity::from_principal(Some("ravi"));

    let invoice = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Invoice)), &asha())
        .await
        .unwrap();
    assert_eq!(invoice.balance_due(), Some(dec!(235)));

    let partial = service.record_payment(&invoice.id, dec!(100), &ravi).await.unwrap();
    assert_eq!(partial.balance_due(), Some(dec!(135)));
    assert_eq!(partial.status, DocumentStatus::Draft);

    let paid = service.record_payment(&invoice.id, dec!(135), &ravi).await.unwrap();
    assert_eq!(paid.balance_due(), Some(dec!(0)));
    assert_eq!(paid.status, DocumentStatus::Paid);

    let stored = service.get(&invoice.id).await.unwrap();
    assert_eq!(stored.status, DocumentStatus::Paid);
    assert_eq!(stored.updated_by.as_deref(), Some("ravi"));
    match stored.details {
        DocumentDetails::Invoice(ledger) => {
            assert_eq!(ledger.amount_paid, dec!(235));
            assert_eq!(ledger.balance_due, dec!(0));
        }
        other => panic!("expected invoice details, got {:?}", other),
    }
}

#[tokio::test]
async fn test_payment_must_be_positive() {
    let service = service().await;
    let invoice = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Invoice)), &asha())
        .await
        .unwrap();

    let err: ApiError = service
        .record_payment(&invoice.id, dec!(0), &asha())
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_invoice_numbers_are_sequential() {
    let service = service().await;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let invoice = service
            .create(
                DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::Invoice)),
                &asha(),
            )
            .await
            .unwrap();
        numbers.push(invoice.document_number);
    }

    assert_eq!(numbers, vec!["INV-00001", "INV-00002", "INV-00003"]);
}

#[tokio::test]
async fn test_soft_deleted_quote_is_fetchable_but_not_listed() {
    let service = service().await;
    let page = service.page_request(0);

    let kept = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Quote)), &asha())
        .await
        .unwrap();
    let deleted = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Quote)), &asha())
        .await
        .unwrap();

    service.soft_delete(&deleted.id, &asha()).await.unwrap();

    let fetched = service.get(&deleted.id).await.unwrap();
    assert!(!fetched.active);
    assert_eq!(fetched.document_number, "QT-00002");

    let listed = service.list(DocumentKind::Quote, &page).await.unwrap();
    assert_eq!(listed.total_elements, 1);
    assert_eq!(listed.content[0].id, kept.id);

    let searched = service.search(DocumentKind::Quote, "qt-0000", &page).await.unwrap();
    assert_eq!(searched.total_elements, 1);

    // the deleted number is never handed out again
    let next = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Quote)), &asha())
        .await
        .unwrap();
    assert_eq!(next.document_number, "QT-00003");
}

#[tokio::test]
async fn test_statistics_count_active_documents() {
    let service = service().await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let quote = service
            .create(priced_request(DetailsRequest::empty(DocumentKind::Quote)), &asha())
            .await
            .unwrap();
        ids.push(quote.id);
    }
    service
        .update_status(&ids[0], DocumentStatus::Sent, &asha())
        .await
        .unwrap();
    service.soft_delete(&ids[2], &asha()).await.unwrap();

    let stats = service.statistics(DocumentKind::Quote).await.unwrap();
    assert_eq!(stats.kind, DocumentKind::Quote);
    assert_eq!(stats.total_active, 2);
    assert_eq!(stats.count(DocumentStatus::Sent), 1);
    assert_eq!(stats.count(DocumentStatus::Draft), 1);
    assert_eq!(stats.count(DocumentStatus::Accepted), 0);
    assert_eq!(stats.by_status.len(), DocumentKind::Quote.tracked_statuses().len());
}

#[tokio::test]
async fn test_status_setter_is_unchecked() {
    let service = service().await;
    let order = service
        .create(
            DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::SalesOrder)),
            &asha(),
        )
        .await
        .unwrap();

    service
        .update_status(&order.id, DocumentStatus::Shipped, &asha())
        .await
        .unwrap();
    let back = service
        .update_status(&order.id, DocumentStatus::Draft, &asha())
        .await
        .unwrap();

    assert_eq!(back.status, DocumentStatus::Draft);
    assert_eq!(service.get(&order.id).await.unwrap().status, DocumentStatus::Draft);
}

#[tokio::test]
async fn test_recurring_profile_pause_resume_and_advance() {
    let service = service().await;
    let start = date(2026, 1, 5);

    let profile = service.create(weekly_profile(start), &asha()).await.unwrap();
    assert_eq!(profile.document_number, "RI-00001");
    assert_eq!(profile.status, DocumentStatus::Active);

    let due = service.due_recurring_profiles(start).await.unwrap();
    assert_eq!(due.len(), 1);

    service.pause(&profile.id, &asha()).await.unwrap();
    assert!(service.due_recurring_profiles(start).await.unwrap().is_empty());
    assert_eq!(
        service.get(&profile.id).await.unwrap().status,
        DocumentStatus::Stopped
    );

    service.resume(&profile.id, &asha()).await.unwrap();
    assert_eq!(service.due_recurring_profiles(start).await.unwrap().len(), 1);

    let advanced = service.advance_recurrence(&profile.id, &asha()).await.unwrap();
    match &advanced.details {
        DocumentDetails::RecurringInvoice(p) => {
            assert_eq!(p.last_invoice_date, Some(start));
            assert_eq!(p.next_invoice_date, Some(date(2026, 1, 12)));
        }
        other => panic!("expected recurring details, got {:?}", other),
    }

    assert!(service
        .due_recurring_profiles(date(2026, 1, 10))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        service
            .due_recurring_profiles(date(2026, 1, 12))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_kind_specific_operations_reject_other_kinds() {
    let service = service().await;
    let quote = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Quote)), &asha())
        .await
        .unwrap();

    let payment: ApiError = service
        .record_payment(&quote.id, dec!(10), &asha())
        .await
        .unwrap_err()
        .into();
    assert_eq!(payment.code, ErrorCode::ValidationError);

    let pause: ApiError = service.pause(&quote.id, &asha()).await.unwrap_err().into();
    assert_eq!(pause.code, ErrorCode::ValidationError);

    let update: ApiError = service
        .update(
            &quote.id,
            DocumentRequest::new("cust-acme", DetailsRequest::empty(DocumentKind::Invoice)),
            &asha(),
        )
        .await
        .unwrap_err()
        .into();
    assert_eq!(update.code, ErrorCode::ValidationError);
    assert_eq!(update.http_status(), 400);
}

#[tokio::test]
async fn test_update_replaces_line_items() {
    let service = service().await;
    let quote = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Quote)), &asha())
        .await
        .unwrap();

    let request = DocumentRequest {
        line_items: Some(vec![LineItemInput {
            item_name: Some("Install".to_string()),
            quantity: Some(dec!(3)),
            rate: Some(dec!(40)),
            ..LineItemInput::default()
        }]),
        ..DocumentRequest::new(
            "cust-acme",
            DetailsRequest::Quote(QuoteDetails {
                expiry_date: Some(date(2026, 3, 1)),
                ..QuoteDetails::default()
            }),
        )
    };
    let updated = service.update(&quote.id, request, &asha()).await.unwrap();

    assert_eq!(updated.document_number, quote.document_number);
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.total, dec!(120));

    let stored = service.get(&quote.id).await.unwrap();
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.sub_total, dec!(120));
}

#[tokio::test]
async fn test_invalid_request_reports_every_field() {
    let service = service().await;

    let request = DocumentRequest {
        customer_id: None,
        line_items: Some(vec![LineItemInput {
            rate: Some(dec!(-1)),
            discount_percent: Some(dec!(150)),
            ..LineItemInput::default()
        }]),
        ..DocumentRequest::new("", DetailsRequest::empty(DocumentKind::Quote))
    };

    let err: ApiError = service.create(request, &asha()).await.unwrap_err().into();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(err.message, "Validation failed");

    let envelope = serde_json::to_value(err.envelope(chrono::Utc::now())).unwrap();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"], "Validation failed");
    let details = envelope["details"].as_object().unwrap();
    assert!(details.contains_key("customerId"));
    assert!(details.contains_key("lineItems[0].rate"));
    assert!(details.contains_key("lineItems[0].discountPercent"));

    // nothing was written
    let page = PageRequest::default();
    assert_eq!(
        service.list(DocumentKind::Quote, &page).await.unwrap().total_elements,
        0
    );
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let service = service().await;

    let err: ApiError = service.get("no-such-id").await.unwrap_err().into();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.http_status(), 404);

    let err: ApiError = service
        .soft_delete("no-such-id", &asha())
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_overdue_and_expired_queries() {
    let service = service().await;
    let today = date(2026, 2, 15);

    let invoice = service
        .create(
            priced_request(DetailsRequest::Invoice(InvoiceTerms {
                due_date: Some(date(2026, 1, 31)),
                ..InvoiceTerms::default()
            })),
            &asha(),
        )
        .await
        .unwrap();
    assert_eq!(service.overdue_invoices(today).await.unwrap().len(), 1);
    assert_eq!(service.unpaid_invoices().await.unwrap().len(), 1);

    service.record_payment(&invoice.id, dec!(235), &asha()).await.unwrap();
    assert!(service.overdue_invoices(today).await.unwrap().is_empty());
    assert!(service.unpaid_invoices().await.unwrap().is_empty());

    let quote = service
        .create(
            priced_request(DetailsRequest::Quote(QuoteDetails {
                expiry_date: Some(date(2026, 2, 1)),
                ..QuoteDetails::default()
            })),
            &asha(),
        )
        .await
        .unwrap();
    // only SENT quotes expire
    assert!(service.expired_quotes(today).await.unwrap().is_empty());

    service
        .update_status(&quote.id, DocumentStatus::Sent, &asha())
        .await
        .unwrap();
    let expired = service.expired_quotes(today).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, quote.id);
}

#[tokio::test]
async fn test_configured_defaults_apply() {
    let config = AppConfig {
        default_currency: "USD".to_string(),
        page_size: 2,
        ..AppConfig::default()
    };
    let service = service_with(config).await;

    for _ in 0..3 {
        service
            .create(
                DocumentRequest::new("cust-1", DetailsRequest::empty(DocumentKind::SalesOrder)),
                &asha(),
            )
            .await
            .unwrap();
    }

    let first = service
        .list(DocumentKind::SalesOrder, &service.page_request(0))
        .await
        .unwrap();
    assert_eq!(first.content.len(), 2);
    assert_eq!(first.total_elements, 3);
    assert_eq!(first.total_pages, 2);
    assert!(first.content.iter().all(|order| order.currency == "USD"));
}

#[tokio::test]
async fn test_parse_request_body() {
    let body = r#"{
        "customerId": "cust-9",
        "customerName": "Globex",
        "lineItems": [{ "itemName": "Audit", "quantity": "1", "rate": "900" }],
        "details": { "kind": "QUOTE", "expiryDate": "2026-04-30" }
    }"#;
    let request = DocumentService::parse_request(body).unwrap();
    assert_eq!(request.kind(), DocumentKind::Quote);
    assert_eq!(request.customer_id.as_deref(), Some("cust-9"));

    let service = service().await;
    let quote = service.create(request, &Identity::system()).await.unwrap();
    assert_eq!(quote.total, dec!(900));
    assert_eq!(quote.created_by, "system");

    let err = DocumentService::parse_request("{\"customerId\": ").unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

/// A file database behind an eight-connection pool, so concurrent calls run
/// on separate connections.
async fn file_service(dir: &tempfile::TempDir) -> DocumentService {
    let config = AppConfig {
        db_path: dir.path().join("salesdesk.db"),
        db_max_connections: 8,
        ..AppConfig::default()
    };
    let db = Database::new(config.db_config()).await.unwrap();
    DocumentService::new(db, config)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_payments_and_updates_keep_every_payment() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir).await;

    let request = DocumentRequest {
        line_items: Some(vec![LineItemInput {
            item_name: Some("Retainer".to_string()),
            quantity: Some(dec!(1)),
            rate: Some(dec!(1000)),
            ..LineItemInput::default()
        }]),
        ..DocumentRequest::new("cust-acme", DetailsRequest::empty(DocumentKind::Invoice))
    };
    let invoice = service.create(request.clone(), &asha()).await.unwrap();
    assert_eq!(invoice.total, dec!(1000));

    let mut handles = Vec::new();
    for i in 0..40 {
        let service = service.clone();
        let id = invoice.id.clone();
        let request = request.clone();
        handles.push(tokio::spawn(async move {
            // a full rewrite of the invoice must not undo a payment
            if i % 5 == 0 {
                service.update(&id, request, &asha()).await.map(|_| ())?;
            }
            service.record_payment(&id, dec!(1), &asha()).await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = service.get(&invoice.id).await.unwrap();
    match stored.details {
        DocumentDetails::Invoice(ledger) => {
            assert_eq!(ledger.amount_paid, dec!(40));
            assert_eq!(ledger.balance_due, dec!(960));
        }
        other => panic!("expected invoice details, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_are_numbered_once_each() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir).await;

    let mut handles = Vec::new();
    for _ in 0..12 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let request = priced_request(DetailsRequest::empty(DocumentKind::Quote));
            service.create(request, &asha()).await.map(|quote| quote.document_number)
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap().unwrap());
    }
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 12);
    assert_eq!(numbers.last().map(String::as_str), Some("QT-00012"));
}

#[tokio::test]
async fn test_oversized_line_values_are_a_validation_error() {
    let service = service().await;

    let request = DocumentRequest {
        line_items: Some(vec![LineItemInput {
            item_name: Some("Bulk".to_string()),
            quantity: Some(rust_decimal::Decimal::MAX),
            rate: Some(dec!(2)),
            ..LineItemInput::default()
        }]),
        ..DocumentRequest::new("cust-acme", DetailsRequest::empty(DocumentKind::Quote))
    };

    let err: ApiError = service.create(request, &asha()).await.unwrap_err().into();
    assert_eq!(err.code, ErrorCode::ValidationError);
    let details = err.details.as_ref().unwrap();
    assert!(details.contains_key("lineItems[0].quantity"));

    let invoice = service
        .create(priced_request(DetailsRequest::empty(DocumentKind::Invoice)), &asha())
        .await
        .unwrap();
    let err: ApiError = service
        .record_payment(&invoice.id, rust_decimal::Decimal::MAX, &asha())
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(service.get(&invoice.id).await.unwrap().balance_due(), Some(dec!(235)));
}
