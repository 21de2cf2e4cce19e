use std::collections::HashMap;

use booking_freq::data::model::{BookingRecord, PersonId};
use booking_freq::{analyze, AnalysisWindow, Dataset, YearMonth};
use chrono::NaiveDate;
use proptest::prelude::*;

const CLASSES: [&str; 4] = ["Vinyasa", "Yin", "Self Practice", "SELF PRACTICE lab"];

/// (person, month or none, class index)
type Row = (u8, Option<u32>, usize);

fn record((person, month, class): Row) -> BookingRecord {
    BookingRecord {
        person_id: PersonId::new(format!("P{person}")).unwrap(),
        person_name: format!("Person {person}"),
        class_name: Some(CLASSES[class].to_string()),
        start_time: month.map(|m| {
            NaiveDate::from_ymd_opt(2024, m, 1 + u32::from(person % 28))
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        }),
    }
}

fn rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((0u8..12, prop::option::weighted(0.9, 1u32..=6), 0usize..CLASSES.len()), 0..80)
}

fn window() -> impl Strategy<Value = AnalysisWindow> {
    prop_oneof![
        (1u32..=6).prop_map(|m| AnalysisWindow::month(YearMonth::new(2024, m).unwrap())),
        (1u32..=6, 1u32..=6).prop_map(|(a, b)| {
            let (a, b) = (a.min(b), a.max(b));
            AnalysisWindow::range(YearMonth::new(2024, a).unwrap(), YearMonth::new(2024, b).unwrap())
                .unwrap()
        }),
    ]
}

/// Bookings per person computed without the analyzer.
fn expected_counts(rows: &[Row], window: &AnalysisWindow) -> HashMap<u8, usize> {
    let mut counts = HashMap::new();
    for &(person, month, class) in rows {
        let Some(m) = month else { continue };
        if class >= 2 || !window.contains(YearMonth::new(2024, m).unwrap()) {
            continue;
        }
        *counts.entry(person).or_insert(0) += 1;
    }
    counts
}

proptest! {
    #[test]
    fn counts_partition_the_people(rows in rows(), window in window(), max_upper in 1u32..8) {
        let ds = Dataset::from_records(rows.iter().copied().map(record).collect(), 0);
        let report = analyze(&ds, Some(&window), max_upper).unwrap().unwrap();
        let table = &report.table;
        let expected = expected_counts(&rows, &window);

        prop_assert_eq!(table.buckets.len(), max_upper as usize + 1);
        prop_assert_eq!(table.total_persons, expected.len());
        let sum: usize = table.buckets.iter().map(|b| b.student_count).sum();
        prop_assert_eq!(sum, expected.len());

        for b in table.numeric() {
            let n = b.bucket.floor() as usize;
            let want = expected.values().filter(|&&c| c == n).count();
            prop_assert_eq!(b.student_count, want);
            prop_assert_eq!(b.people.len(), b.student_count);
        }
        let over = table.overflow();
        let want = expected.values().filter(|&&c| c > max_upper as usize).count();
        prop_assert_eq!(over.student_count, want);
    }

    #[test]
    fn cumulative_columns_are_consistent(rows in rows(), window in window(), max_upper in 1u32..8) {
        let ds = Dataset::from_records(rows.into_iter().map(record).collect(), 0);
        let table = analyze(&ds, Some(&window), max_upper).unwrap().unwrap().table;
        let total = table.total_persons;

        let mut prev = 0;
        for b in table.numeric() {
            prop_assert!(b.cumulative_from_start >= prev);
            prop_assert_eq!(b.cumulative_from_start + b.cumulative_to_end, total);
            prev = b.cumulative_from_start;
        }
        let over = table.overflow();
        prop_assert_eq!(over.cumulative_from_start, total);
        prop_assert_eq!(over.cumulative_to_end, over.student_count);
    }

    #[test]
    fn analysis_is_idempotent(rows in rows(), window in window(), max_upper in 1u32..8) {
        let ds = Dataset::from_records(rows.into_iter().map(record).collect(), 0);
        let first = analyze(&ds, Some(&window), max_upper).unwrap();
        let second = analyze(&ds, Some(&window), max_upper).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn summary_tracks_the_population(rows in rows(), window in window(), max_upper in 1u32..8) {
        let ds = Dataset::from_records(rows.into_iter().map(record).collect(), 0);
        let report = analyze(&ds, Some(&window), max_upper).unwrap().unwrap();
        match report.summary {
            None => prop_assert_eq!(report.table.total_persons, 0),
            Some(s) => {
                prop_assert_eq!(s.sample_size, report.table.total_persons);
                let hi = f64::from(max_upper + 1);
                prop_assert!((1.0..=hi).contains(&s.mean));
                prop_assert!((1.0..=hi).contains(&s.median));
            }
        }
    }

    #[test]
    fn undated_and_self_practice_rows_never_count(
        persons in prop::collection::vec(0u8..12, 1..30),
        window in window(),
    ) {
        let rows: Vec<Row> = persons
            .iter()
            .enumerate()
            .map(|(i, &p)| if i % 2 == 0 { (p, None, 0) } else { (p, Some(3), 2 + i % 2) })
            .collect();
        let ds = Dataset::from_records(rows.into_iter().map(record).collect(), 0);
        let report = analyze(&ds, Some(&window), 5).unwrap().unwrap();
        prop_assert_eq!(report.table.total_persons, 0);
        prop_assert!(report.summary.is_none());
    }
}
