use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// YearMonth – a calendar month, the unit every window is expressed in
// ---------------------------------------------------------------------------

/// A calendar month written as `YYYY-MM`.
///
/// Ordering is (year, month), which for four-digit years is the same as
/// comparing the `YYYY-MM` strings lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid period '{0}', expected YYYY-MM")]
pub struct PeriodParseError(pub String);

impl YearMonth {
    /// `None` unless `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month a timestamp falls in.
    pub fn of(ts: &NaiveDateTime) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = PeriodParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// BookingRecord – one row of the source sheet
// ---------------------------------------------------------------------------

/// Opaque person identifier as found in the `Id_Person` column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// `None` for a blank id; surrounding whitespace is dropped.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single booking (one row of the uploaded spreadsheet).
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub person_id: PersonId,
    /// Display name from `FirstName`; may differ between rows of one person.
    pub person_name: String,
    pub class_name: Option<String>,
    /// `None` when `Start_Date_time` could not be parsed.
    pub start_time: Option<NaiveDateTime>,
}

impl BookingRecord {
    pub fn period(&self) -> Option<YearMonth> {
        self.start_time.as_ref().map(YearMonth::of)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded sheet
// ---------------------------------------------------------------------------

/// The parsed booking sheet plus a few indices computed once at load time.
///
/// Never mutated after loading; every analysis run borrows it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All usable rows, in sheet order.
    pub records: Vec<BookingRecord>,
    /// Sorted set of months that at least one booking falls in.
    pub periods: BTreeSet<YearMonth>,
    /// Rows kept with an unparsable `Start_Date_time`.
    pub invalid_timestamps: usize,
    /// Rows dropped because `Id_Person` was blank.
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn from_records(records: Vec<BookingRecord>, skipped_rows: usize) -> Self {
        let mut periods = BTreeSet::new();
        let mut invalid_timestamps = 0;
        for rec in &records {
            match rec.period() {
                Some(p) => {
                    periods.insert(p);
                }
                None => invalid_timestamps += 1,
            }
        }
        Dataset {
            records,
            periods,
            invalid_timestamps,
            skipped_rows,
        }
    }

    /// Number of bookings.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_period(&self) -> Option<YearMonth> {
        self.periods.first().copied()
    }

    pub fn last_period(&self) -> Option<YearMonth> {
        self.periods.last().copied()
    }
}
