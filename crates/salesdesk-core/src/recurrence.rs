//! # Recurrence Schedule
//!
//! Schedule fields of a recurring-invoice profile and the date arithmetic
//! over them.
//!
//! ## Cursor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create profile        nextInvoiceDate = startOn                        │
//! │                                                                         │
//! │  external job (daily)  find ACTIVE profiles with                        │
//! │                        nextInvoiceDate <= today                         │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                        spawn invoice (not part of this crate)           │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                        lastInvoiceDate = nextInvoiceDate                │
//! │                        nextInvoiceDate = next_after(nextInvoiceDate)    │
//! │                        (None once past endsOn)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Occurrences are anchored on `start_on`: a profile starting on Jan 31 that
//! repeats monthly runs on Feb 28/29, Mar 31, Apr 30, ... rather than
//! sticking to the 28th after February.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// Unit of a recurring-invoice interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepeatUnit {
    Week,
    Month,
    Year,
}

impl RepeatUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatUnit::Week => "WEEK",
            RepeatUnit::Month => "MONTH",
            RepeatUnit::Year => "YEAR",
        }
    }
}

impl fmt::Display for RepeatUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEEK" => Ok(RepeatUnit::Week),
            "MONTH" => Ok(RepeatUnit::Month),
            "YEAR" => Ok(RepeatUnit::Year),
            _ => Err(ValidationError::InvalidFormat {
                field: "repeatUnit".to_string(),
                reason: format!("expected WEEK, MONTH or YEAR, got '{}'", s),
            }),
        }
    }
}

/// A complete, usable schedule.
///
/// Profiles may be stored with incomplete schedule fields; those simply do
/// not produce a `RecurrenceSchedule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceSchedule {
    pub repeat_every: u32,
    pub repeat_unit: RepeatUnit,
    pub start_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub never_expires: bool,
}

impl RecurrenceSchedule {
    /// First value of `nextInvoiceDate` for a new profile.
    pub fn initial_cursor(&self) -> NaiveDate {
        self.start_on
    }

    /// `from` moved forward by one interval. `None` on calendar overflow.
    pub fn step(&self, from: NaiveDate) -> Option<NaiveDate> {
        shift(from, self.repeat_unit, self.repeat_every)
    }

    /// The `n`-th occurrence counted from `start_on` (0 is `start_on`).
    pub fn occurrence(&self, n: u32) -> Option<NaiveDate> {
        shift(self.start_on, self.repeat_unit, self.repeat_every.checked_mul(n)?)
    }

    /// First occurrence strictly after `after`, bounded by `ends_on`.
    ///
    /// Returns `None` once the schedule is exhausted. `ends_on` is ignored
    /// for profiles that never expire.
    pub fn next_after(&self, after: NaiveDate) -> Option<NaiveDate> {
        if self.repeat_every == 0 {
            return None;
        }

        let mut n = 0;
        let next = loop {
            let candidate = self.occurrence(n)?;
            if candidate > after {
                break candidate;
            }
            n += 1;
        };

        match self.ends_on {
            Some(end) if !self.never_expires && next > end => None,
            _ => Some(next),
        }
    }
}

fn shift(from: NaiveDate, unit: RepeatUnit, count: u32) -> Option<NaiveDate> {
    match unit {
        RepeatUnit::Week => from.checked_add_days(Days::new(u64::from(count) * 7)),
        RepeatUnit::Month => from.checked_add_months(Months::new(count)),
        RepeatUnit::Year => from.checked_add_months(Months::new(count.checked_mul(12)?)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
