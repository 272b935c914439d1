//! SalesDesk report: per-kind statistics, recurring profiles due for
//! invoicing, and overdue invoices as of a given date.

use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::{error, info};

use salesdesk_api::telemetry::init_tracing;
use salesdesk_api::{ApiError, AppConfig, DocumentService};
use salesdesk_core::{DocumentDetails, DocumentKind};
use salesdesk_db::Database;

#[derive(Parser, Debug)]
#[command(name = "salesdesk", version)]
#[command(about = "Sales document statistics and due work")]
struct Cli {
    /// Report date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("salesdesk: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let today = cli.date.unwrap_or_else(|| Utc::now().date_naive());

    info!(db = %config.db_path.display(), date = %today, "Starting SalesDesk report");

    let db = Database::new(config.db_config()).await.map_err(ApiError::from)?;
    let service = DocumentService::new(db.clone(), config);

    println!("SalesDesk report for {}", today);
    println!();

    for kind in DocumentKind::ALL {
        let stats = service.statistics(kind).await.map_err(ApiError::from)?;
        let breakdown = stats
            .by_status
            .iter()
            .map(|(status, count)| format!("{}={}", status, count))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<18} active={:<6} {}", kind, stats.total_active, breakdown);
    }

    let due = service
        .due_recurring_profiles(today)
        .await
        .map_err(ApiError::from)?;
    println!();
    println!("Recurring profiles due: {}", due.len());
    for profile in &due {
        let name = match &profile.details {
            DocumentDetails::RecurringInvoice(p) => p.profile_name.as_str(),
            _ => "",
        };
        println!("  {}  {}  {}", profile.document_number, name, profile.customer_id);
    }

    let overdue = service.overdue_invoices(today).await.map_err(ApiError::from)?;
    println!();
    println!("Overdue invoices: {}", overdue.len());
    for invoice in &overdue {
        let balance = invoice.balance_due().unwrap_or_default();
        println!(
            "  {}  {}  balance {} {}",
            invoice.document_number, invoice.customer_id, balance, invoice.currency
        );
    }

    db.close().await;
    Ok(())
}
