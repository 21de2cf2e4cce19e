use serde::Serialize;

use super::model::{BookingRecord, Dataset, YearMonth};

/// Class name (case-insensitive substring) excluded from every analysis.
pub const DEFAULT_EXCLUDED_CLASS: &str = "Self Practice";

// ---------------------------------------------------------------------------
// Analysis window
// ---------------------------------------------------------------------------

/// The month filter applied before bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWindow {
    Month { period: YearMonth },
    /// Inclusive on both ends, `start <= end`.
    Range { start: YearMonth, end: YearMonth },
}

impl AnalysisWindow {
    pub fn month(period: YearMonth) -> Self {
        AnalysisWindow::Month { period }
    }

    /// `None` when `start` is after `end`.
    pub fn range(start: YearMonth, end: YearMonth) -> Option<Self> {
        (start <= end).then_some(AnalysisWindow::Range { start, end })
    }

    pub fn contains(&self, period: YearMonth) -> bool {
        match *self {
            AnalysisWindow::Month { period: p } => period == p,
            AnalysisWindow::Range { start, end } => start <= period && period <= end,
        }
    }

    /// Records without a parsable timestamp never match.
    pub fn matches(&self, record: &BookingRecord) -> bool {
        record.period().is_some_and(|p| self.contains(p))
    }
}

impl std::fmt::Display for AnalysisWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisWindow::Month { period } => write!(f, "{period}"),
            AnalysisWindow::Range { start, end } => write!(f, "{start} to {end}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Window selection as picked in the UI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    #[default]
    Monthly,
    Range,
}

/// Raw picker state for both the monthly and the range pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSelection {
    pub mode: WindowMode,
    pub period: Option<YearMonth>,
    pub start: Option<YearMonth>,
    pub end: Option<YearMonth>,
}

impl WindowSelection {
    /// Latest month for the monthly picker, first..last for the range.
    pub fn defaults_for(mode: WindowMode, dataset: &Dataset) -> Self {
        WindowSelection {
            mode,
            period: dataset.last_period(),
            start: dataset.first_period(),
            end: dataset.last_period(),
        }
    }

    /// `None` while the selection is incomplete or the range is inverted.
    pub fn resolve(&self) -> Option<AnalysisWindow> {
        match self.mode {
            WindowMode::Monthly => self.period.map(AnalysisWindow::month),
            WindowMode::Range => AnalysisWindow::range(self.start?, self.end?),
        }
    }
}

// ---------------------------------------------------------------------------
// Class exclusion
// ---------------------------------------------------------------------------

/// Case-insensitive substring match against `Class_Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassExclusion {
    needle: String,
}

impl ClassExclusion {
    /// An empty pattern excludes nothing.
    pub fn new(pattern: &str) -> Self {
        ClassExclusion {
            needle: pattern.trim().to_lowercase(),
        }
    }

    pub fn excludes(&self, record: &BookingRecord) -> bool {
        if self.needle.is_empty() {
            return false;
        }
        record
            .class_name
            .as_deref()
            .is_some_and(|class| class.to_lowercase().contains(&self.needle))
    }
}

impl Default for ClassExclusion {
    fn default() -> Self {
        ClassExclusion::new(DEFAULT_EXCLUDED_CLASS)
    }
}

/// Records inside `window` that are not excluded, in sheet order.
pub fn matching_records<'a>(
    dataset: &'a Dataset,
    window: &'a AnalysisWindow,
    exclusion: &'a ClassExclusion,
) -> impl Iterator<Item = &'a BookingRecord> + 'a {
    dataset
        .records
        .iter()
        .filter(move |rec| window.matches(rec))
        .filter(move |rec| !exclusion.excludes(rec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PersonId;
    use chrono::NaiveDate;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn booking(day: Option<(i32, u32, u32)>, class: Option<&str>) -> BookingRecord {
        BookingRecord {
            person_id: PersonId::new("7").unwrap(),
            person_name: "Bea".into(),
            class_name: class.map(String::from),
            start_time: day.map(|(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(18, 0, 0)
                    .unwrap()
            }),
        }
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let w = AnalysisWindow::range(ym("2024-01"), ym("2024-03")).unwrap();
        assert!(w.matches(&booking(Some((2024, 1, 1)), None)));
        assert!(w.matches(&booking(Some((2024, 2, 15)), None)));
        assert!(w.matches(&booking(Some((2024, 3, 31)), None)));
        assert!(!w.matches(&booking(Some((2024, 4, 1)), None)));
        assert!(!w.matches(&booking(Some((2023, 12, 31)), None)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(AnalysisWindow::range(ym("2024-05"), ym("2024-01")).is_none());
        assert!(AnalysisWindow::range(ym("2024-05"), ym("2024-05")).is_some());
    }

    #[test]
    fn missing_timestamp_never_matches() {
        let rec = booking(None, Some("Yoga"));
        assert!(!AnalysisWindow::month(ym("2024-01")).matches(&rec));
        assert!(!AnalysisWindow::range(ym("0001-01"), ym("9999-12"))
            .unwrap()
            .matches(&rec));
    }

    #[test]
    fn self_practice_is_excluded_in_any_case() {
        let ex = ClassExclusion::default();
        for class in ["Self Practice", "self practice", "SELF PRACTICE", "Evening Self Practice (open)"] {
            assert!(ex.excludes(&booking(None, Some(class))), "{class}");
        }
        assert!(!ex.excludes(&booking(None, Some("Vinyasa"))));
        assert!(!ex.excludes(&booking(None, None)));
    }

    #[test]
    fn empty_pattern_excludes_nothing() {
        let ex = ClassExclusion::new("  ");
        assert!(!ex.excludes(&booking(None, Some("Self Practice"))));
    }

    #[test]
    fn selection_resolves_by_mode() {
        let mut sel = WindowSelection {
            mode: WindowMode::Monthly,
            period: None,
            start: Some(ym("2024-01")),
            end: Some(ym("2024-02")),
        };
        assert_eq!(sel.resolve(), None);

        sel.period = Some(ym("2024-02"));
        assert_eq!(sel.resolve(), Some(AnalysisWindow::month(ym("2024-02"))));

        sel.mode = WindowMode::Range;
        assert_eq!(
            sel.resolve(),
            AnalysisWindow::range(ym("2024-01"), ym("2024-02"))
        );

        sel.end = None;
        assert_eq!(sel.resolve(), None);

        sel.end = Some(ym("2023-06"));
        assert_eq!(sel.resolve(), None);
    }

    #[test]
    fn defaults_pick_latest_month_and_full_range() {
        let ds = Dataset::from_records(
            vec![
                booking(Some((2024, 3, 2)), None),
                booking(Some((2023, 11, 2)), None),
                booking(Some((2024, 1, 9)), None),
            ],
            0,
        );
        let sel = WindowSelection::defaults_for(WindowMode::Range, &ds);
        assert_eq!(sel.mode, WindowMode::Range);
        assert_eq!(sel.period, Some(ym("2024-03")));
        assert_eq!(sel.start, Some(ym("2023-11")));
        assert_eq!(sel.end, Some(ym("2024-03")));
    }
}
