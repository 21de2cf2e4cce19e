use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::{Serialize, Serializer};

use super::guarded;
use super::stats::Summary;
use crate::data::filter::{matching_records, AnalysisWindow, ClassExclusion};
use crate::data::model::{Dataset, PersonId};
use crate::error::AnalysisError;

/// Upper bound used when nothing else is configured.
pub const DEFAULT_MAX_UPPER: u32 = 15;

/// Largest accepted `max_upper`; keeps the table a size a person can read.
pub const MAX_UPPER_LIMIT: u32 = 10_000;

// ---------------------------------------------------------------------------
// Bucket – exact count or overflow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    /// People with exactly this many bookings.
    Count(u32),
    /// People with more than `above` bookings.
    Overflow { above: u32 },
}

impl Bucket {
    /// Numeric value the bucket stands for in the summary sample.
    pub fn floor(&self) -> u32 {
        match *self {
            Bucket::Count(n) => n,
            Bucket::Overflow { above } => above + 1,
        }
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, Bucket::Overflow { .. })
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Count(n) => write!(f, "{n}"),
            Bucket::Overflow { above } => write!(f, ">{above}"),
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Output table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.id)
    }
}

/// One row of the frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyBucket {
    pub bucket: Bucket,
    pub student_count: usize,
    /// People with at most this many bookings (everyone, for overflow).
    pub cumulative_from_start: usize,
    /// People with more bookings than this bucket (the overflow row counts itself).
    pub cumulative_to_end: usize,
    /// In order of first appearance in the filtered bookings.
    pub people: Vec<Person>,
}

impl FrequencyBucket {
    /// `"name : id"` entries joined with `", "`.
    pub fn details(&self) -> String {
        self.people
            .iter()
            .map(Person::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Buckets `1..=max_upper` in ascending order, then the overflow row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    pub max_upper: u32,
    /// Distinct people with at least one matching booking.
    pub total_persons: usize,
    pub buckets: Vec<FrequencyBucket>,
}

impl FrequencyTable {
    fn build(max_upper: u32, tallies: &[PersonTally<'_>]) -> Self {
        let slots = max_upper as usize + 1;
        let mut members: Vec<Vec<Person>> = vec![Vec::new(); slots];
        for tally in tallies {
            // bookings >= 1; everything past max_upper shares the last slot
            members[tally.bookings.min(slots) - 1].push(Person {
                id: tally.id.clone(),
                name: tally.name.to_string(),
            });
        }

        let total = tallies.len();
        let mut running = 0;
        let buckets = members
            .into_iter()
            .zip(1..)
            .map(|(people, n)| {
                let count = people.len();
                if n <= max_upper {
                    running += count;
                    FrequencyBucket {
                        bucket: Bucket::Count(n),
                        student_count: count,
                        cumulative_from_start: running,
                        cumulative_to_end: total - running,
                        people,
                    }
                } else {
                    FrequencyBucket {
                        bucket: Bucket::Overflow { above: max_upper },
                        student_count: count,
                        cumulative_from_start: total,
                        cumulative_to_end: count,
                        people,
                    }
                }
            })
            .collect();

        FrequencyTable {
            max_upper,
            total_persons: total,
            buckets,
        }
    }

    /// The exact-count rows, without overflow.
    pub fn numeric(&self) -> &[FrequencyBucket] {
        &self.buckets[..self.buckets.len() - 1]
    }

    pub fn overflow(&self) -> &FrequencyBucket {
        &self.buckets[self.buckets.len() - 1]
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyReport {
    pub window: AnalysisWindow,
    pub table: FrequencyTable,
    /// `None` when no booking matched.
    pub summary: Option<Summary>,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Per-person booking count, borrowing from the dataset.
struct PersonTally<'a> {
    id: &'a PersonId,
    /// First name seen for this person in the filtered rows.
    name: &'a str,
    bookings: usize,
}

fn tally_bookings<'a>(
    dataset: &'a Dataset,
    window: &'a AnalysisWindow,
    exclusion: &'a ClassExclusion,
) -> Vec<PersonTally<'a>> {
    let mut index: HashMap<&PersonId, usize> = HashMap::new();
    let mut tallies: Vec<PersonTally<'a>> = Vec::new();
    for rec in matching_records(dataset, window, exclusion) {
        match index.entry(&rec.person_id) {
            Entry::Occupied(e) => tallies[*e.get()].bookings += 1,
            Entry::Vacant(e) => {
                e.insert(tallies.len());
                tallies.push(PersonTally {
                    id: &rec.person_id,
                    name: &rec.person_name,
                    bookings: 1,
                });
            }
        }
    }
    tallies
}

/// Stateless; the same analyzer may be shared by any number of runs.
#[derive(Debug, Clone, Default)]
pub struct FrequencyAnalyzer {
    exclusion: ClassExclusion,
}

impl FrequencyAnalyzer {
    /// Analyzer excluding classes that contain `excluded_class`
    /// (case-insensitive). An empty pattern excludes nothing.
    pub fn new(excluded_class: &str) -> Self {
        FrequencyAnalyzer {
            exclusion: ClassExclusion::new(excluded_class),
        }
    }

    /// Compute the frequency table for `window`.
    ///
    /// Returns `Ok(None)` when no window is selected yet.
    pub fn analyze(
        &self,
        dataset: &Dataset,
        window: Option<&AnalysisWindow>,
        max_upper: u32,
    ) -> Result<Option<FrequencyReport>, AnalysisError> {
        let Some(window) = window else {
            return Ok(None);
        };
        if !(1..=MAX_UPPER_LIMIT).contains(&max_upper) {
            return Err(AnalysisError::InvalidConfiguration {
                max_upper,
                limit: MAX_UPPER_LIMIT,
            });
        }

        let tallies = tally_bookings(dataset, window, &self.exclusion);
        let table = FrequencyTable::build(max_upper, &tallies);
        let summary = Summary::from_buckets(&table.buckets);
        debug!(
            "Window {window}: {} people in {} bucket(s), overflow {}",
            table.total_persons,
            table.buckets.len(),
            table.overflow().student_count
        );

        Ok(Some(FrequencyReport {
            window: *window,
            table,
            summary,
        }))
    }

    /// [`analyze`](Self::analyze) for the run boundary: a panic inside the
    /// computation comes back as [`AnalysisError::Compute`].
    pub fn run_guarded(
        &self,
        dataset: &Dataset,
        window: Option<&AnalysisWindow>,
        max_upper: u32,
    ) -> Result<Option<FrequencyReport>, AnalysisError> {
        guarded(|| self.analyze(dataset, window, max_upper))
    }
}

/// Analyze with the default "Self Practice" exclusion.
pub fn analyze(
    dataset: &Dataset,
    window: Option<&AnalysisWindow>,
    max_upper: u32,
) -> Result<Option<FrequencyReport>, AnalysisError> {
    FrequencyAnalyzer::default().analyze(dataset, window, max_upper)
}
