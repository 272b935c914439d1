//! # Document Numbers
//!
//! Human-readable, kind-prefixed sequence numbers: `QT-00001`, `INV-00042`.
//!
//! ## Next Number
//! ```text
//! existing: INV-00001, INV-00007, INV-00003
//!              │           │          │
//!              ▼           ▼          ▼
//!   strip "INV-" and parse: 1, 7, 3   ──► max = 7 ──► INV-00008
//!
//!   no rows           ──► INV-00001
//!   "INV-00x9" found  ──► MalformedDocumentNumber (never skipped)
//! ```
//!
//! These functions only do the arithmetic. Two writers reading the same
//! maximum would pick the same number; the repository serialises creates per
//! kind and the `UNIQUE(kind, document_number)` index backs that up.

use crate::document::DocumentKind;
use crate::error::{CoreError, CoreResult};

/// Zero-padded width of the numeric suffix.
pub const NUMBER_WIDTH: usize = 5;

/// Renders `sequence` with the kind's prefix, e.g. `INV-00007`.
///
/// Sequences past 99999 keep all their digits (`INV-100000`).
pub fn format_number(kind: DocumentKind, sequence: u64) -> String {
    format!(
        "{}{:0width$}",
        kind.number_prefix(),
        sequence,
        width = NUMBER_WIDTH
    )
}

/// Parses the numeric suffix back out of a stored number.
pub fn parse_number(kind: DocumentKind, number: &str) -> CoreResult<u64> {
    let malformed = || CoreError::MalformedDocumentNumber {
        kind,
        number: number.to_string(),
    };

    let suffix = number.strip_prefix(kind.number_prefix()).ok_or_else(malformed)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    suffix.parse::<u64>().map_err(|_| malformed())
}

/// Highest sequence among `existing`, or 0 when there are none.
pub fn max_sequence<'a, I>(kind: DocumentKind, existing: I) -> CoreResult<u64>
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .map(|number| parse_number(kind, number))
        .try_fold(0, |max, sequence| sequence.map(|n| max.max(n)))
}

/// The number that follows every number in `existing`.
///
/// ## Example
/// ```rust
/// use salesdesk_core::numbering::next_number;
/// use salesdesk_core::DocumentKind;
///
/// let next = next_number(DocumentKind::Invoice, ["INV-00001", "INV-00002"]).unwrap();
/// assert_eq!(next, "INV-00003");
/// ```
pub fn next_number<'a, I>(kind: DocumentKind, existing: I) -> CoreResult<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let max = max_sequence(kind, existing)?;
    Ok(format_number(kind, max + 1))
}
