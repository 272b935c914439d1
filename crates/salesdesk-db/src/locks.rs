//! Per-kind number assignment locks.
//!
//! `next number = max + 1` is a read-then-write. Holding the kind's lock from
//! the scan until the insert commits keeps two creates in this process from
//! reading the same max. Writers in other processes are still caught by
//! `UNIQUE(kind, document_number)`.

use salesdesk_core::DocumentKind;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct NumberLocks {
    locks: [Mutex<()>; 5],
}

impl NumberLocks {
    /// Waits for and takes the lock of `kind`.
    pub async fn acquire(&self, kind: DocumentKind) -> MutexGuard<'_, ()> {
        self.locks[slot(kind)].lock().await
    }
}

fn slot(kind: DocumentKind) -> usize {
    match kind {
        DocumentKind::Quote => 0,
        DocumentKind::SalesOrder => 1,
        DocumentKind::DeliveryChallan => 2,
        DocumentKind::Invoice => 3,
        DocumentKind::RecurringInvoice => 4,
    }
}
